//! Entity services
//!
//! One service per table. Services validate requests, enforce ownership and
//! sequence storage and database calls; the stores underneath only run queries.

pub mod edited_images;
pub mod generated_videos;
pub mod lineages;
pub mod media_assets;
pub mod projects;
pub mod video_sources;

pub use edited_images::EditedImageService;
pub use generated_videos::GeneratedVideoService;
pub use lineages::LineageService;
pub use media_assets::{MediaAssetService, MediaUpload};
pub use projects::ProjectService;
pub use video_sources::VideoSourceService;
