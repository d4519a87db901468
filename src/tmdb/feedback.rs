use serde_json::Value;

use crate::{
    codec,
    error::{DBResult, DbError},
    models::{FEEDBACK_FIELDS, FeedbackForm, OPTIONAL_FEEDBACK_FIELD},
    query,
    tmdb::TuneDb,
};

/////*============== FEEDBACK QUERIES ==============*/
/// Flattens a submitted form and checks its required answers.
///
/// With `enforce` off, missing answers are only logged and stored as NULL.
fn prepare_form(payload: &Value, enforce: bool) -> DBResult<FeedbackForm> {
    let Value::Object(form) = payload else {
        return Err(DbError::TypeMismatch(String::from("feedback form object not passed")));
    };
    let encoded = codec::encode(form);

    let missing = FEEDBACK_FIELDS
        .iter()
        .filter(|field| **field != OPTIONAL_FEEDBACK_FIELD)
        .find(|field| encoded.get(**field).is_none_or(Value::is_null));

    match missing {
        Some(field) if enforce => Err(DbError::TypeMismatch(format!(
            "required field `{field}` was null"
        ))),
        Some(field) => {
            log::warn!("[prepare_form] Storing form with missing field `{field}`");
            Ok(encoded)
        }
        None => Ok(encoded),
    }
}

impl TuneDb {
    /// Stores one feedback form. Nested answers are kept as JSON text.
    pub async fn insert_feedback_form(&self, payload: &Value) -> DBResult<()> {
        let form = prepare_form(payload, self.enforce_feedback_fields)
            .inspect_err(|err| log::info!("[insert_feedback_form] Rejected form: {err}"))?;
        let stmt = query::insert_feedback_form(&form);

        self.pool
            .run(move |conn| {
                stmt.execute(conn)?;
                Ok(())
            })
            .await
            .inspect(|_| log::info!("[insert_feedback_form] Feedback form stored."))
            .inspect_err(|err| log::error!("[insert_feedback_form] Could not store form: {err}"))
    }

    /// Stores a consent signature.
    pub async fn insert_irb_name(&self, name: &str) -> DBResult<()> {
        let stmt = query::insert_irb_name(name)?;

        self.pool
            .run(move |conn| {
                stmt.execute(conn)?;
                Ok(())
            })
            .await
            .inspect_err(|err| log::error!("[insert_irb_name] Could not store name: {err}"))
    }

    /// Stores a feedback form and the signer's `name` from the same payload.
    ///
    /// Both rows are written in one transaction.
    pub async fn submit_feedback(&self, payload: &Value) -> DBResult<()> {
        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| DbError::TypeMismatch(String::from("no name passed")))?;
        let name_stmt = query::insert_irb_name(name)?;
        let form = prepare_form(payload, self.enforce_feedback_fields)?;
        let form_stmt = query::insert_feedback_form(&form);

        self.pool
            .run(move |conn| {
                let tx = conn.transaction()?;
                form_stmt.execute(&tx)?;
                name_stmt.execute(&tx)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .inspect(|_| log::info!("[submit_feedback] Feedback and signature stored."))
            .inspect_err(|err| log::error!("[submit_feedback] Could not store feedback: {err}"))
    }

    /// Every stored form, with encoded answers parsed back into objects.
    pub async fn fetch_all_feedback_forms(&self) -> DBResult<Vec<FeedbackForm>> {
        let stmt = query::select_feedback_forms();

        self.pool
            .run(move |conn| {
                let rows = stmt.query_map(conn, query::row_to_map)?;
                Ok(rows.iter().map(codec::decode).collect())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_form() -> Value {
        json!({
            "songID": "6rqhFgbbKwnb9MLmUQDhG6",
            "q1": 5, "q2": 4, "q3": { "hardest": "jumps" }, "q4": 3, "q5": 2, "q6": 1,
            "q7": true, "q8": false, "q9": "fun", "q10": 3, "q11": 4, "q12": 5, "q13": 1,
        })
    }

    #[test]
    fn complete_forms_are_encoded() {
        let form = prepare_form(&complete_form(), true).unwrap();
        assert_eq!(form["q3"], json!(r#"{"hardest":"jumps"}"#));
        assert!(!form.contains_key("q14"));
    }

    #[test]
    fn missing_required_field_is_rejected_when_enforced() {
        let mut payload = complete_form();
        payload["q6"] = Value::Null;

        let err = prepare_form(&payload, true).unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch(ref msg) if msg.contains("q6")));
    }

    #[test]
    fn missing_required_field_passes_when_lenient() {
        let mut payload = complete_form();
        payload.as_object_mut().unwrap().remove("songID");

        assert!(prepare_form(&payload, false).is_ok());
    }

    #[test]
    fn non_object_forms_are_rejected() {
        assert!(prepare_form(&json!(null), false).is_err());
        assert!(prepare_form(&json!([1, 2]), true).is_err());
    }
}
