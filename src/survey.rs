//! Storage for the campus building survey and the A3 chart-reading exercise.

mod buildings;

pub use buildings::CAMPUS_BUILDINGS;

use serde_json::{Map, Value};

use crate::{
    aggregate::{Aggregator, Averages},
    config::Config,
    error::{DBResult, swallow_constraint_violation},
    models::{self, A3Answer, Building, SurveyReceipt, SurveySubmission},
    pool::Pool,
    query,
};

impl<'a> TryFrom<&'a rusqlite::Row<'a>> for models::A3Answer {
    type Error = rusqlite::Error;

    fn try_from(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            ans_radar: row.get("ansRadar")?,
            user_ans_radar: row.get("userAnsRadar")?,
            ans_ring: row.get("ansRing")?,
            user_ans_ring: row.get("userAnsRing")?,
            ans_bar: row.get("ansBar")?,
            user_ans_bar: row.get("userAnsBar")?,
        })
    }
}

/// Typed access to the survey tables.
#[derive(Clone)]
pub struct SurveyDb {
    pool: Pool,
    aggregator: Aggregator,
}

impl SurveyDb {
    pub fn new(pool: Pool, config: &Config) -> Self {
        Self { pool, aggregator: Aggregator::new(config.choice_questions.iter().cloned()) }
    }

    /////*============== BUILDING QUERIES ==============*/
    /// Inserts buildings, skipping any that are already stored.
    ///
    /// Returns how many were newly added.
    pub async fn insert_buildings(&self, buildings: &[Building]) -> DBResult<usize> {
        let stmts: Vec<_> = buildings.iter().map(query::insert_building).collect();

        self.pool
            .run(move |conn| {
                let tx = conn.transaction()?;
                let mut added = 0;
                for stmt in &stmts {
                    let is_new = stmt
                        .execute(&tx)
                        .map_or_else(swallow_constraint_violation, |_| Ok(true))?;
                    added += usize::from(is_new);
                }
                tx.commit()?;
                Ok(added)
            })
            .await
            .inspect(|added| log::info!("[insert_buildings] {added} new building(s) stored."))
    }

    /// Stores the fixed list of campus buildings. Safe to call on every startup.
    pub async fn seed_buildings(&self) -> DBResult<usize> {
        let buildings: Vec<Building> = CAMPUS_BUILDINGS
            .iter()
            .map(|(name, category)| Building { name: name.to_string(), category: category.to_string() })
            .collect();

        self.insert_buildings(&buildings).await
    }

    /////*============== RESPONSE QUERIES ==============*/
    /// Stores a respondent's profile, then their responses keyed by the new profile ID.
    ///
    /// Both steps run in one transaction, so a rejected response batch leaves no profile behind.
    pub async fn insert_survey_response(&self, payload: &Value) -> DBResult<SurveyReceipt> {
        let submission: SurveySubmission = query::parse(payload)
            .inspect_err(|err| log::info!("[insert_survey_response] Rejected submission: {err}"))?;
        let profile_stmt = query::insert_profile(&submission.profile);
        // Validate the batch before touching storage; the real ID is bound below.
        query::insert_responses(&submission.responses, 0)?;

        self.pool
            .run(move |conn| {
                let tx = conn.transaction()?;
                profile_stmt.execute(&tx)?;
                let response_id = tx.last_insert_rowid();

                let (responses_added, stmts) =
                    query::insert_responses(&submission.responses, response_id)?;
                query::execute_all(&stmts, &tx)?;
                tx.commit()?;

                Ok(SurveyReceipt { response_id, responses_added })
            })
            .await
            .inspect(|receipt| {
                log::info!(
                    "[insert_survey_response] Stored {} response(s) under profile {}",
                    receipt.responses_added,
                    receipt.response_id
                )
            })
            .inspect_err(|err| log::error!("[insert_survey_response] Could not store: {err}"))
    }

    pub async fn fetch_all_responses(&self) -> DBResult<Vec<Map<String, Value>>> {
        let stmt = query::select_all_responses();
        self.pool.run(move |conn| stmt.query_map(conn, query::row_to_map)).await
    }

    /// Per-building statistics over every stored response.
    pub async fn fetch_response_averages(&self) -> DBResult<Averages> {
        let rows = self.fetch_all_responses().await?;
        log::trace!("[fetch_response_averages] Aggregating {} response row(s)", rows.len());
        Ok(self.aggregator.aggregate(&rows))
    }

    /////*============== A3 QUERIES ==============*/
    pub async fn insert_a3_answer(&self, payload: &Value) -> DBResult<A3Answer> {
        let (answer, stmt) = query::insert_a3_answer(payload)?;

        self.pool
            .run(move |conn| {
                stmt.execute(conn)?;
                Ok(answer)
            })
            .await
            .inspect_err(|err| log::error!("[insert_a3_answer] Could not store answer: {err}"))
    }

    pub async fn fetch_a3_answers(&self) -> DBResult<Vec<A3Answer>> {
        let stmt = query::select_a3_answers();
        self.pool
            .run(move |conn| stmt.query_map(conn, |row| A3Answer::try_from(row)))
            .await
    }
}
