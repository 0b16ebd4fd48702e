//! Atelier Storage Library
//!
//! This crate provides the object storage abstraction and its S3 and local
//! filesystem implementations. One `Storage` instance serves one bucket;
//! `Buckets` groups the three buckets the product writes to.
//!
//! # Object path format
//!
//! Paths are user- and project-scoped: `{user_id}/{project_id}/{unique}-{file_name}`.
//! Paths must not contain `..` or a leading `/`. Path generation lives in the
//! `keys` module so every caller produces the same layout.
//!
//! Rows may also carry an absolute `http(s)://` URL instead of a bucket path
//! (files hosted by a generation provider). `resolve_display_url` passes those
//! through untouched.

pub mod buckets;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use atelier_core::{BucketKind, StorageBackend};
pub use buckets::Buckets;
pub use factory::{create_buckets, create_storage};
pub use keys::{is_absolute_url, object_path, resolve_display_url, sanitize_file_name};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
