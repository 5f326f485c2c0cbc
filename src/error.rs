use thiserror::Error;

#[derive(Error, Debug)]
pub enum PgExecError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Query error: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Scan error in column '{column}': {message}")]
    Scan { column: String, message: String },

    #[error("Commit error: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cancelled by user")]
    Cancelled,
}

impl PgExecError {
    pub(crate) fn scan(column: impl Into<String>, message: impl Into<String>) -> Self {
        PgExecError::Scan {
            column: column.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PgExecError>;
