use serde_json::{Value, json};
use tempfile::TempDir;

use tunedb::{Config, Pool, SurveyDb, TuneDb, schema};

/// A fresh database file with every table created. Keep the `TempDir` alive for the test.
pub struct Fixture {
    pub _dir: TempDir,
    pub config: Config,
    pub pool: Pool,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_path(dir.path().join("tune-mountain.db"));
        tweak(&mut config);

        let pool = Pool::open(&config).unwrap();
        schema::initialize_db(&pool).await.unwrap();
        Self { _dir: dir, config, pool }
    }

    #[allow(dead_code)]
    pub fn tune(&self) -> TuneDb {
        TuneDb::new(self.pool.clone(), &self.config)
    }

    #[allow(dead_code)]
    pub fn survey(&self) -> SurveyDb {
        SurveyDb::new(self.pool.clone(), &self.config)
    }
}

#[allow(dead_code)]
pub fn user(spotify_id: &str) -> Value {
    json!({
        "spotifyID": spotify_id,
        "displayName": format!("Player {spotify_id}"),
        "imageUrl": format!("https://i.scdn.co/image/{spotify_id}"),
    })
}

#[allow(dead_code)]
pub fn session(user_id: &str, score: f64) -> Value {
    json!({
        "score": score,
        "songID": "7GhIk7Il098yCjg4BQjzvb",
        "userID": user_id,
        "gameVersion": "1.0.0",
    })
}
