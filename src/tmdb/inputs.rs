use serde_json::Value;

use crate::{
    error::DBResult,
    models::{self, InputBatch},
    query,
    tmdb::TuneDb,
};

/////*============== INPUT QUERIES ==============*/
impl<'a> TryFrom<&'a rusqlite::Row<'a>> for models::Input {
    type Error = rusqlite::Error;

    fn try_from(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            session_id: row.get("sessionID")?,
            action: row.get("action")?,
            timestamp: row.get("timestamp")?,
            kind: row.get("type")?,
        })
    }
}

impl TuneDb {
    /// Inserts a batch of inputs for one session. Either every input is stored or none is.
    ///
    /// Returns the batch along with the session it belongs to.
    pub async fn insert_inputs(&self, payload: &Value) -> DBResult<InputBatch> {
        let (inputs, stmts) = query::insert_inputs(payload)
            .inspect_err(|err| log::info!("[insert_inputs] Rejected input batch: {err}"))?;

        // Validation guarantees a non-empty, single-session batch.
        let session_id = inputs[0].session_id;
        log::trace!("[insert_inputs] Inserting {} input(s) for session {session_id}", inputs.len());

        self.pool
            .run(move |conn| {
                let tx = conn.transaction()?;
                query::execute_all(&stmts, &tx)?;
                tx.commit()?;
                Ok(InputBatch { session_id, inputs_added: inputs })
            })
            .await
            .inspect(|batch| {
                log::info!(
                    "[insert_inputs] Added {} input(s) to session {}",
                    batch.inputs_added.len(),
                    batch.session_id
                )
            })
            .inspect_err(|err| log::error!("[insert_inputs] Could not insert inputs: {err}"))
    }
}
