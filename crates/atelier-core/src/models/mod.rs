pub mod edited_image;
pub mod generated_video;
pub mod lineage;
pub mod media_asset;
pub mod project;
pub mod timeline;
pub mod video_source;

pub use edited_image::{CreateEditedImageRequest, EditedImage, NewEditedImage, UpdateEditedImage};
pub use generated_video::{
    CreateGeneratedVideoRequest, GeneratedVideo, NewGeneratedVideo, UpdateGeneratedVideo,
    VideoStatus,
};
pub use lineage::{empty_object, CreateLineageRequest, Lineage, NewLineage, UpdateLineage};
pub use media_asset::{CreateMediaAssetRequest, MediaAsset, NewMediaAsset, UpdateMediaAsset};
pub use project::{CreateProjectRequest, NewProject, Project, UpdateProject};
pub use timeline::{NodeData, NodeKind, TimelineData, TimelineEdge, TimelineNode};
pub use video_source::{CreateVideoSourceRequest, NewVideoSource, SourceType, VideoSource};
