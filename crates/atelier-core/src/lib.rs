//! Atelier Core Library
//!
//! This crate provides the domain models, request validation, error types,
//! configuration and presentation state shared by every Atelier component.

pub mod config;
pub mod error;
pub mod models;
pub mod preferences;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, LogLevel};
pub use preferences::{AuthGate, Theme, ThemeContext};
pub use storage_types::{BucketKind, StorageBackend};
// Note: Storage, StorageError, StorageResult live in atelier-storage
