//! Atelier Services Layer
//!
//! This crate is the **business service layer**: entity services that
//! validate requests, check ownership and sequence storage and database
//! calls; the lineage timeline assembler; the query cache with its
//! optimistic mutation protocol; and the `StudioClient` that ties them
//! together for a front end. Keep query text in atelier-db and bucket
//! access in atelier-storage.

#[cfg(feature = "archive")]
pub mod archive;
pub mod cache;
pub mod client;
pub mod entities;
pub mod services;
pub mod timeline;

#[cfg(feature = "archive")]
pub use archive::{create_zip_archive, lineage_archive, lineage_entries, ArchiveEntry};
pub use cache::{run_optimistic, OptimisticUpdate, QueryCache, QueryKey, QueryKind, Snapshot};
pub use client::{NewUpload, StudioClient};
pub use entities::{
    EditedImageService, GeneratedVideoService, LineageService, MediaAssetService, MediaUpload,
    ProjectService, VideoSourceService,
};
pub use services::{Services, Stores};
pub use timeline::TimelineAssembler;
