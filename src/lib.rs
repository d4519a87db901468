pub mod aggregate;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod leaderboard;
pub mod models;
pub mod pool;
pub mod query;
pub mod schema;
pub mod survey;
pub mod tmdb;

pub use config::Config;
pub use error::{DBResult, DbError};
pub use pool::Pool;
pub use survey::SurveyDb;
pub use tmdb::TuneDb;
