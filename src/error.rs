use thiserror::Error;

use crate::column::ColumnType;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("cannot convert value '{value}' in column '{column}' to {target:?}")]
    TypeConversion {
        column: String,
        value: String,
        target: ColumnType,
    },

    #[error("materialization failed")]
    Materialization(#[source] Box<Error>),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid regex: {0}")]
    InvalidRegex(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),
}

impl Error {
    /// Wrap an evaluation failure as a materialization error, keeping the
    /// underlying cause reachable through `source()`.
    pub fn materialization(cause: Error) -> Self {
        Error::Materialization(Box::new(cause))
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidRegex(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
