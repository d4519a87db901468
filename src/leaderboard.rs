use serde::Deserialize;

pub const DEFAULT_MAX_RESULTS: i64 = 10;
pub const MAX_RESULTS_CAP: i64 = 20;

/// Parameters for a top-sessions ranking.
///
/// Oversized requests are clamped to [`MAX_RESULTS_CAP`], never rejected. A request for zero
/// or fewer results yields an empty leaderboard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(rename = "maxResults", default)]
    pub max_results: Option<i64>,
    #[serde(rename = "userID", default)]
    pub user_id: Option<String>,
    #[serde(rename = "gameVersion", default)]
    pub game_version: Option<String>,
}

impl LeaderboardQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_results(mut self, max_results: i64) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Ranks only this user's sessions.
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn game_version(mut self, game_version: impl Into<String>) -> Self {
        self.game_version = Some(game_version.into());
        self
    }

    /// The row limit actually handed to storage.
    ///
    /// Non-positive requests map to 0 because SQLite treats a negative LIMIT as unbounded.
    pub fn limit(&self) -> i64 {
        self.max_results
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(0, MAX_RESULTS_CAP)
    }
}
