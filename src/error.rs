// Error type for the file-facing side of the crate.
use thiserror::Error;

/// Failures of the file-facing parts of the crate. The KPI math itself
/// never fails.
#[derive(Error, Debug)]
pub enum KpiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, KpiError>;
