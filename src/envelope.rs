//! The `{status, ...}` shapes handed back across the service boundary.
//!
//! Successes flatten their payload next to `status`; failures carry only a code and a
//! human-readable description, never the underlying storage error.

use serde::Serialize;

use crate::error::{DBResult, DbError};

pub const SUCCESS: &str = "success";
pub const FAILURE: &str = "failure";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Success<T> {
    pub status: &'static str,
    #[serde(flatten)]
    pub payload: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub status: String,
    #[serde(rename = "errorCode")]
    pub error_code: i32,
    pub details: String,
}

impl Failure {
    /// Builds a failure from a storage error. `status` is a short label such as
    /// "failure inserting session".
    pub fn new(status: impl Into<String>, err: &DbError) -> Self {
        Self { status: status.into(), error_code: err.error_code(), details: err.details() }
    }
}

impl From<DbError> for Failure {
    fn from(err: DbError) -> Self {
        Failure::new(FAILURE, &err)
    }
}

pub type Reply<T> = Result<Success<T>, Failure>;

/// Wraps an operation's result in the boundary shape.
pub fn reply<T: Serialize>(result: DBResult<T>, failure_status: &str) -> Reply<T> {
    result
        .map(|payload| Success { status: SUCCESS, payload })
        .map_err(|err| {
            log::debug!("[reply] {failure_status}: {err}");
            Failure::new(failure_status, &err)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Session, SessionList};
    use serde_json::json;

    #[test]
    fn success_flattens_payload() {
        let list = SessionList {
            user_id: Some(String::from("u1")),
            sessions: vec![Session {
                session_id: 1,
                score: 900.0,
                song_id: String::from("song"),
                user_id: String::from("u1"),
                game_version: String::from("1.2.0"),
            }],
        };

        let body = serde_json::to_value(reply(Ok(list), FAILURE).unwrap()).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["userID"], "u1");
        assert_eq!(body["sessions"][0]["sessionID"], 1);
    }

    #[test]
    fn wrapped_json_payloads_keep_their_key() {
        let body = serde_json::to_value(reply(Ok(json!({ "body": {} })), FAILURE).unwrap()).unwrap();
        assert_eq!(body, json!({ "status": "success", "body": {} }));
    }

    #[test]
    fn not_found_reports_code_one() {
        let failure = reply::<()>(Err(DbError::NotFound), "failure fetching session info").unwrap_err();
        assert_eq!(
            serde_json::to_value(failure).unwrap(),
            json!({ "status": "failure fetching session info", "errorCode": 1, "details": "No data found." })
        );
    }

    #[test]
    fn storage_errors_become_plain_failures() {
        let failure = Failure::from(DbError::Storage { code: 8, message: String::from("attempt to write a readonly database") });
        assert_eq!(failure.status, FAILURE);
        assert_eq!(failure.error_code, 8);
        assert_eq!(failure.details, "Database error.");
    }
}
