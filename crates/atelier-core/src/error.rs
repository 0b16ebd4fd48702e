//! Error types module
//!
//! All failures of the data-access layer are unified under `AppError`.
//! Backend failures keep the original error as their source so callers see
//! exactly what the store or storage reported; validation and ownership
//! failures are raised by this layer before or instead of any remote call.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;
use uuid::Uuid;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for ownership and lookup failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    /// Object storage failure; the backend error is kept as the source.
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Failed to create lineage for media asset {asset_id}: {source}")]
    LineageCreation {
        asset_id: Uuid,
        #[source]
        source: Box<AppError>,
    },

    #[error("Query cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AccessDenied(_) => "ACCESS_DENIED",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::LineageCreation { .. } => "LINEAGE_CREATION_FAILED",
            AppError::Cancelled(_) => "CANCELLED",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::Cancelled(_) | AppError::Unauthorized(_) => {
                LogLevel::Debug
            }
            AppError::NotFound(_) | AppError::AccessDenied(_) => LogLevel::Warn,
            AppError::Database(_)
            | AppError::Storage(_)
            | AppError::LineageCreation { .. }
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => LogLevel::Error,
        }
    }

    /// Whether the failure was raised locally, before any remote call.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::InvalidInput(_))
    }

    /// Emit this error through `tracing` at its log level.
    pub fn log(&self, operation: &str) {
        match self.log_level() {
            LogLevel::Debug => {
                tracing::debug!(error = %self, code = self.error_code(), operation, "Operation failed")
            }
            LogLevel::Warn => {
                tracing::warn!(error = %self, code = self.error_code(), operation, "Operation failed")
            }
            LogLevel::Error => {
                tracing::error!(error = %self, code = self.error_code(), operation, "Operation failed")
            }
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}
