use serde_json::Value;

use crate::{
    error::{DBResult, DbError},
    leaderboard::LeaderboardQuery,
    models::{self, SessionDetail, SessionList},
    query,
    tmdb::TuneDb,
};

/////*============== SESSION QUERIES ==============*/
impl<'a> TryFrom<&'a rusqlite::Row<'a>> for models::Session {
    type Error = rusqlite::Error;

    fn try_from(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            session_id: row.get("sessionID")?,
            score: row.get("score")?,
            song_id: row.get("songID")?,
            user_id: row.get("userID")?,
            game_version: row.get("gameVersion")?,
        })
    }
}

impl TuneDb {
    /// Inserts a session, then returns every session belonging to its user.
    ///
    /// The two steps are not atomic: if the re-fetch fails, the session stays inserted and
    /// the fetch error is returned.
    pub async fn insert_session(&self, payload: &Value) -> DBResult<SessionList> {
        let (session, insert) = query::insert_session(payload)
            .inspect_err(|err| log::info!("[insert_session] Rejected session payload: {err}"))?;
        let select = query::select_sessions_of_user(&session.user_id);
        let user_id = session.user_id;

        log::trace!("[insert_session] Inserting session for {user_id}...");
        self.pool
            .run(move |conn| {
                insert.execute(conn).inspect_err(|err| {
                    log::error!("[insert_session] Could not insert session for {user_id}: {err}")
                })?;

                let sessions = select
                    .query_map(conn, |row| models::Session::try_from(row))
                    .inspect_err(|err| {
                        log::error!("[insert_session] Session stored, but re-fetch failed: {err}")
                    })?;

                log::info!("[insert_session] {user_id} now has {} session(s)", sessions.len());
                Ok(SessionList { user_id: Some(user_id), sessions })
            })
            .await
    }

    pub async fn fetch_sessions_for_user(&self, user_id: &str) -> DBResult<SessionList> {
        log::trace!("[fetch_sessions_for_user] Querying sessions of {user_id}");
        let stmt = query::select_sessions_of_user(user_id);
        let user_id = user_id.to_string();

        self.pool
            .run(move |conn| {
                let sessions = stmt.query_map(conn, |row| models::Session::try_from(row))?;
                Ok(SessionList { user_id: Some(user_id), sessions })
            })
            .await
    }

    /// The session row alone, without its inputs.
    pub async fn fetch_session_info(&self, session_id: i64) -> DBResult<models::Session> {
        let stmt = query::select_session(session_id);

        self.pool
            .run(move |conn| {
                stmt.query_optional(conn, |row| models::Session::try_from(row))?
                    .ok_or(DbError::NotFound)
            })
            .await
    }

    /// The session row plus all of its inputs in the order they were recorded.
    pub async fn fetch_session_by_id(&self, session_id: i64) -> DBResult<SessionDetail> {
        log::trace!("[fetch_session_by_id] Querying session {session_id} with inputs");
        let select_session = query::select_session(session_id);
        let select_inputs = query::select_inputs_of_session(session_id);

        self.pool
            .run(move |conn| {
                let session_info = select_session
                    .query_optional(conn, |row| models::Session::try_from(row))?
                    .ok_or(DbError::NotFound)?;
                let inputs = select_inputs.query_map(conn, |row| models::Input::try_from(row))?;

                Ok(SessionDetail { session_info, inputs })
            })
            .await
    }

    /// Highest-scoring sessions, at most twenty, optionally for a single user.
    ///
    /// An empty table yields an empty list.
    pub async fn fetch_top_sessions(&self, leaderboard: &LeaderboardQuery) -> DBResult<SessionList> {
        log::trace!(
            "[fetch_top_sessions] Ranking {} session(s) for {}",
            leaderboard.limit(),
            leaderboard.user_id.as_deref().unwrap_or("all users")
        );
        let stmt = query::top_sessions(leaderboard);
        let user_id = leaderboard.user_id.clone();

        self.pool
            .run(move |conn| {
                let sessions = stmt.query_map(conn, |row| models::Session::try_from(row))?;
                Ok(SessionList { user_id, sessions })
            })
            .await
            .inspect_err(|err| log::error!("[fetch_top_sessions] Could not rank sessions: {err}"))
    }
}
