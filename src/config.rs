use anyhow::{Context, Result};
use dotenv::dotenv;

use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use crate::aggregate;

pub const DEFAULT_DB_PATH: &str = "./sql/tune-mountain.db";
pub const DEFAULT_POOL_SIZE: usize = 4;
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Runtime settings for the storage layer.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub pool_size: usize,
    /// Deadline applied to every storage operation, including the wait for a connection.
    pub timeout: Duration,
    pub foreign_keys: bool,
    /// Reject feedback forms with a missing required answer.
    pub enforce_feedback_fields: bool,
    /// Survey questions aggregated by sum rather than mean.
    pub choice_questions: Vec<String>,
}

impl Config {
    /// Default settings pointed at a specific database file.
    pub fn with_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            pool_size: DEFAULT_POOL_SIZE,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            foreign_keys: true,
            enforce_feedback_fields: true,
            choice_questions: aggregate::default_choice_questions(),
        }
    }

    /// Reads settings from the environment (and `.env` in the project root, if present).
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("TUNEDB_PATH").unwrap_or_else(|| String::from(DEFAULT_DB_PATH));
        let pool_size: usize = parse_var(&lookup, "TUNEDB_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            anyhow::bail!("TUNEDB_POOL_SIZE must be at least 1.");
        }

        let choice_questions = match lookup("TUNEDB_CHOICE_QUESTIONS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(String::from)
                .collect(),
            None => aggregate::default_choice_questions(),
        };

        Ok(Self {
            db_path: PathBuf::from(db_path),
            pool_size,
            timeout: Duration::from_millis(parse_var(&lookup, "TUNEDB_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?),
            foreign_keys: parse_var(&lookup, "TUNEDB_FOREIGN_KEYS", true)?,
            enforce_feedback_fields: parse_var(&lookup, "TUNEDB_ENFORCE_FEEDBACK_FIELDS", true)?,
            choice_questions,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{err}"))
            .with_context(|| format!("Could not parse ${key}='{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert!(config.foreign_keys);
        assert!(config.enforce_feedback_fields);
        assert_eq!(config.choice_questions, aggregate::default_choice_questions());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("TUNEDB_PATH", "/tmp/tm.db"),
            ("TUNEDB_POOL_SIZE", "8"),
            ("TUNEDB_TIMEOUT_MS", "250"),
            ("TUNEDB_ENFORCE_FEEDBACK_FIELDS", "false"),
            ("TUNEDB_CHOICE_QUESTIONS", "MISC_0, MISC_1,"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/tm.db"));
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert!(!config.enforce_feedback_fields);
        assert_eq!(config.choice_questions, vec!["MISC_0", "MISC_1"]);
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(Config::from_lookup(lookup_from(&[("TUNEDB_POOL_SIZE", "lots")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("TUNEDB_POOL_SIZE", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("TUNEDB_FOREIGN_KEYS", "yes")])).is_err());
    }
}
