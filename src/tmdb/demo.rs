use crate::{
    error::DBResult,
    models::{self, Category, CategoryRows},
    query,
    tmdb::TuneDb,
};

impl TuneDb {
    /// Every row of one table, for the database visualizer.
    // TODO: gate behind an access token once the visualizer has one to send.
    pub async fn fetch_all(&self, category: Category) -> DBResult<CategoryRows> {
        log::trace!("[fetch_all] Dumping {}", category.as_str());
        let stmt = query::select_all(category);

        self.pool
            .run(move |conn| {
                Ok(match category {
                    Category::Users => {
                        CategoryRows::Users(stmt.query_map(conn, |row| models::User::try_from(row))?)
                    }
                    Category::Sessions => CategoryRows::Sessions(
                        stmt.query_map(conn, |row| models::Session::try_from(row))?,
                    ),
                    Category::Inputs => {
                        CategoryRows::Inputs(stmt.query_map(conn, |row| models::Input::try_from(row))?)
                    }
                })
            })
            .await
            .inspect_err(|err| {
                log::error!("[fetch_all] Could not fetch {}: {err}", category.as_str())
            })
    }
}
