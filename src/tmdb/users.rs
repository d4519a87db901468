use serde_json::Value;

use crate::{
    error::{DBResult, DbError},
    models, query,
    tmdb::TuneDb,
};

/////*============== USER QUERIES ==============*/
impl<'a> TryFrom<&'a rusqlite::Row<'a>> for models::User {
    type Error = rusqlite::Error;

    fn try_from(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            spotify_id: row.get("spotifyID")?,
            display_name: row.get("displayName")?,
            image_url: row.get("imageUrl")?,
        })
    }
}

impl TuneDb {
    /// Inserts a user and echoes it back.
    ///
    /// Fails with `ConstraintViolation` if the Spotify ID is already registered.
    pub async fn insert_user(&self, payload: &Value) -> DBResult<models::User> {
        let (user, stmt) = query::insert_user(payload)
            .inspect_err(|err| log::info!("[insert_user] Rejected user payload: {err}"))?;

        log::trace!("[insert_user] Inserting user {} into users...", user.spotify_id);
        self.pool
            .run(move |conn| {
                stmt.execute(conn)?;
                Ok(user)
            })
            .await
            .inspect(|user| log::info!("User {} has been added to the database.", user.spotify_id))
            .inspect_err(|err| log::error!("[insert_user] Could not insert user: {err}"))
    }

    /// Returns the user with `spotify_id`, or `NotFound`.
    pub async fn fetch_user_by_id(&self, spotify_id: &str) -> DBResult<models::User> {
        log::trace!("[fetch_user_by_id] Querying user {spotify_id}");
        let stmt = query::select_user(spotify_id);

        self.pool
            .run(move |conn| {
                stmt.query_optional(conn, |row| models::User::try_from(row))?
                    .ok_or(DbError::NotFound)
            })
            .await
    }
}
