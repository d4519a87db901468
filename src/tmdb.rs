//! Tune Mountain storage: users, sessions, inputs and post-game feedback.
//!
//! Each table's operations live in their own submodule as `impl TuneDb` blocks.

mod demo;
mod feedback;
mod inputs;
mod sessions;
mod users;

use crate::{config::Config, pool::Pool};

/// Typed access to the Tune Mountain tables.
///
/// Cheap to clone; clones share the same pool.
#[derive(Clone)]
pub struct TuneDb {
    pool: Pool,
    enforce_feedback_fields: bool,
}

impl TuneDb {
    pub fn new(pool: Pool, config: &Config) -> Self {
        Self { pool, enforce_feedback_fields: config.enforce_feedback_fields }
    }
}
