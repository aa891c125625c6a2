use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid config {}: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Unknown contract '{0}'")]
    UnknownContract(String),

    #[error("Invalid billing period '{value}': {reason}")]
    InvalidPeriod { value: String, reason: String },

    #[error("Unexpected headers in readings CSV: {found:?}. Expected: {expected:?}")]
    UnexpectedHeaders {
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("Readings CSV line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: Box<BillingError>,
    },
}

pub type BillingResult<T> = Result<T, BillingError>;

impl BillingError {
    pub fn at_line(self, line: u64) -> Self {
        BillingError::Row {
            line,
            source: Box::new(self),
        }
    }
}
