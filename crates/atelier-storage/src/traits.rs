//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use atelier_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage path: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(Box::new(other)),
        }
    }
}

/// Storage abstraction trait
///
/// One instance serves one bucket. Services work against this trait so the
/// backend (S3-compatible or local filesystem) stays a configuration detail.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` at `path` and return the path.
    async fn upload(&self, path: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Download an object by path
    async fn download(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Remove a batch of objects. Missing objects are not an error.
    async fn delete(&self, paths: &[String]) -> StorageResult<()>;

    /// Public URL of an object. Pure derivation, no remote call.
    fn public_url(&self, path: &str) -> String;

    /// Time-limited URL for direct access (GET)
    async fn signed_url(&self, path: &str, expires_in: Duration) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Bucket this instance serves
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
