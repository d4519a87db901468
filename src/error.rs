use rusqlite::ErrorCode;
use thiserror::Error;

/////*============== ERROR TRANSLATION ==============*/
// Human-readable descriptions for the storage error categories.
pub const CONSTRAINT_DETAILS: &str = "Data does not fit required constraints!";
pub const MISMATCH_DETAILS: &str = "Wrong data type used!";
pub const NONE_FOUND_DETAILS: &str = "No data found.";
pub const TIMEOUT_DETAILS: &str = "Request exceeded its deadline.";
pub const STORAGE_DETAILS: &str = "Database error.";

// Codes reported in failure envelopes. The SQLite primary codes are reused where one fits.
pub const NOT_FOUND_CODE: i32 = 1;
pub const BUSY_CODE: i32 = 5;
pub const CONSTRAINT_CODE: i32 = 19;
pub const MISMATCH_CODE: i32 = 20;
pub const POOL_CODE: i32 = -1;

/// Every way a storage operation can fail.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input validation failed before anything reached the database.
    #[error("Wrong data type used! {0}")]
    TypeMismatch(String),

    /// SQLite rejected a write because of a uniqueness or foreign-key rule.
    #[error("Data does not fit required constraints! {0}")]
    ConstraintViolation(String),

    /// A query that should have matched one row matched none.
    #[error("No data found.")]
    NotFound,

    /// Any other backend failure. `message` stays server-side; clients only see the code.
    #[error("storage failure (code {code}): {message}")]
    Storage { code: i32, message: String },

    /// A bulk operation received something that isn't a non-empty sequence.
    #[error("malformed batch: {0}")]
    MalformedBatch(String),

    #[error("Request exceeded its deadline.")]
    Timeout,

    #[error("connection pool error: {0}")]
    Pool(String),
}

pub type DBResult<T> = Result<T, DbError>;

impl DbError {
    /// The numeric code reported to callers alongside `details`.
    pub fn error_code(&self) -> i32 {
        match self {
            DbError::TypeMismatch(_) | DbError::MalformedBatch(_) => MISMATCH_CODE,
            DbError::ConstraintViolation(_) => CONSTRAINT_CODE,
            DbError::NotFound => NOT_FOUND_CODE,
            DbError::Storage { code, .. } => *code,
            DbError::Timeout => BUSY_CODE,
            DbError::Pool(_) => POOL_CODE,
        }
    }

    /// A short description of the failure category, safe to show to clients.
    pub fn details(&self) -> String {
        match self {
            DbError::TypeMismatch(_) => String::from(MISMATCH_DETAILS),
            DbError::ConstraintViolation(_) => String::from(CONSTRAINT_DETAILS),
            DbError::NotFound => String::from(NONE_FOUND_DETAILS),
            DbError::Storage { .. } => String::from(STORAGE_DETAILS),
            DbError::MalformedBatch(reason) => format!("{MISMATCH_DETAILS} {reason}"),
            DbError::Timeout => String::from(TIMEOUT_DETAILS),
            DbError::Pool(reason) => reason.clone(),
        }
    }
}

/// Sorts a SQLite result code into its category.
fn classify(failure: rusqlite::ffi::Error, message: String) -> DbError {
    match failure.code {
        ErrorCode::ConstraintViolation => DbError::ConstraintViolation(message),
        ErrorCode::TypeMismatch => DbError::TypeMismatch(message),
        _ => DbError::Storage { code: failure.extended_code, message },
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, message) => {
                let message = message.unwrap_or_else(|| failure.to_string());
                classify(failure, message)
            }
            // Raised while preparing. The offending SQL is only logged.
            rusqlite::Error::SqlInputError { error, msg, sql, offset } => {
                log::error!("[DbError::from] Statement rejected at offset {offset}: {msg}");
                log::trace!("[DbError::from] Rejected SQL: {sql}");
                classify(error, msg)
            }
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound,
            rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
                DbError::Storage { code: MISMATCH_CODE, message: err.to_string() }
            }
            other => DbError::Storage { code: POOL_CODE, message: other.to_string() },
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::TypeMismatch(err.to_string())
    }
}

/// Turns a constraint violation into `Ok(false)` for writes where an existing row is fine.
pub fn swallow_constraint_violation(err: rusqlite::Error) -> DBResult<bool> {
    match DbError::from(err) {
        DbError::ConstraintViolation(reason) => {
            log::trace!("[swallow_constraint_violation] Ignoring: {reason}");
            Ok(false)
        }
        other => Err(other),
    }
}
