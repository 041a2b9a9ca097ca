//! Error types for the maintenance engine

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A health sample arrived with a timestamp older than the latest one
    /// already accepted for the unit. The sample is dropped.
    #[error("Out-of-order sample for {equipment_id}: {sample_at} precedes {latest_at}")]
    OutOfOrderSample {
        equipment_id: String,
        sample_at: DateTime<Utc>,
        latest_at: DateTime<Utc>,
    },

    #[error("Invalid sort key '{key}' for {kind}")]
    InvalidSortKey { kind: &'static str, key: String },

    #[error("Unknown filter field '{field}' for {kind}")]
    UnknownFilterField { kind: &'static str, field: String },

    /// Deleting the record would orphan dependent records. Callers turn this
    /// into a confirmation prompt and retry with cascade enabled.
    #[error("Equipment {id} is still referenced by {tasks} task(s), {logs} log(s) and {alerts} alert(s)")]
    ReferentialCascade {
        id: String,
        tasks: usize,
        logs: usize,
        alerts: usize,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Short machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            AppError::OutOfOrderSample { .. } => "OutOfOrderSample",
            AppError::InvalidSortKey { .. } => "InvalidSortKey",
            AppError::UnknownFilterField { .. } => "UnknownFilterField",
            AppError::ReferentialCascade { .. } => "ReferentialCascade",
            AppError::NotFound(_) => "NotFound",
            AppError::Validation(_) => "Validation",
            AppError::Authorization(_) => "Authorization",
            AppError::BadRequest(_) => "BadRequest",
        }
    }

    /// Whether the caller should ask the user to confirm and retry
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, AppError::ReferentialCascade { .. })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
