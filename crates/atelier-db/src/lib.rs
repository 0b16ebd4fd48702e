//! Atelier Database Layer
//!
//! This crate provides one sqlx repository per table and the store traits
//! the service layer is written against. Every query on an owned table
//! filters on `user_id`; video sources are owned through their video.

// Module declarations
pub mod db;
pub mod traits;

// Re-exports: repositories
pub use db::{
    EditedImageRepository, GeneratedVideoRepository, LineageRepository, MediaAssetRepository,
    ProjectRepository, VideoSourceRepository,
};

// Re-exports: pool and migrations
pub use db::pool::{connect, run_migrations};

// Re-exports: store traits
pub use traits::{
    EditedImageStore, GeneratedVideoStore, LineageStore, MediaAssetStore, ProjectStore,
    VideoSourceStore,
};
