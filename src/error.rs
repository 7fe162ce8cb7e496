use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Invalid CSV format: {0}")]
    Format(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("GUI error: {0}")]
    Gui(String),
}

impl From<reqwest::Error> for CollectionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CollectionError::Network(format!("timeout: {}", e))
        } else if e.is_connect() {
            CollectionError::Network(format!("connection failed: {}", e))
        } else {
            CollectionError::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CollectionError>;

/// A UNIQUE/PRIMARY KEY violation, which callers treat as "already exists".
/// Foreign key and NOT NULL violations are not included.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
                && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}
