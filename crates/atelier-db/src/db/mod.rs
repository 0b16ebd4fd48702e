//! Database repositories for data access layer
//!
//! Each repository owns one table and provides the scoped CRUD queries the
//! services need. Ordering follows the product's listing rules: newest first,
//! except video sources which follow their `sort_order`.

pub mod edited_image;
pub mod generated_video;
pub mod lineage;
pub mod media_asset;
pub mod pool;
pub mod project;
pub mod video_source;

pub use edited_image::EditedImageRepository;
pub use generated_video::GeneratedVideoRepository;
pub use lineage::LineageRepository;
pub use media_asset::MediaAssetRepository;
pub use project::ProjectRepository;
pub use video_source::VideoSourceRepository;
