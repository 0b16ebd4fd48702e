//! Service wiring
//!
//! `Stores` holds one store per table; `Services` builds every entity
//! service, the timeline assembler and the bucket set on top of it.

use std::sync::Arc;

use atelier_core::Config;
use atelier_db::{
    EditedImageRepository, EditedImageStore, GeneratedVideoRepository, GeneratedVideoStore,
    LineageRepository, LineageStore, MediaAssetRepository, MediaAssetStore, ProjectRepository,
    ProjectStore, VideoSourceRepository, VideoSourceStore,
};
use atelier_storage::Buckets;
use sqlx::PgPool;

use crate::entities::{
    EditedImageService, GeneratedVideoService, LineageService, MediaAssetService, ProjectService,
    VideoSourceService,
};
use crate::timeline::TimelineAssembler;

#[derive(Clone)]
pub struct Stores {
    pub projects: Arc<dyn ProjectStore>,
    pub media_assets: Arc<dyn MediaAssetStore>,
    pub edited_images: Arc<dyn EditedImageStore>,
    pub generated_videos: Arc<dyn GeneratedVideoStore>,
    pub video_sources: Arc<dyn VideoSourceStore>,
    pub lineages: Arc<dyn LineageStore>,
}

impl Stores {
    /// Postgres-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            projects: Arc::new(ProjectRepository::new(pool.clone())),
            media_assets: Arc::new(MediaAssetRepository::new(pool.clone())),
            edited_images: Arc::new(EditedImageRepository::new(pool.clone())),
            generated_videos: Arc::new(GeneratedVideoRepository::new(pool.clone())),
            video_sources: Arc::new(VideoSourceRepository::new(pool.clone())),
            lineages: Arc::new(LineageRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct Services {
    pub projects: ProjectService,
    pub media_assets: MediaAssetService,
    pub edited_images: EditedImageService,
    pub generated_videos: GeneratedVideoService,
    pub video_sources: VideoSourceService,
    pub lineages: LineageService,
    pub timeline: TimelineAssembler,
    pub buckets: Buckets,
}

impl Services {
    pub fn new(stores: Stores, buckets: Buckets, preview_limit: i64) -> Self {
        Self {
            projects: ProjectService::new(
                stores.projects.clone(),
                stores.media_assets.clone(),
                preview_limit,
            ),
            media_assets: MediaAssetService::new(
                stores.media_assets.clone(),
                stores.lineages.clone(),
                buckets.media_assets.clone(),
            ),
            edited_images: EditedImageService::new(
                stores.edited_images.clone(),
                buckets.edited_images.clone(),
            ),
            generated_videos: GeneratedVideoService::new(
                stores.generated_videos.clone(),
                buckets.generated_videos.clone(),
            ),
            video_sources: VideoSourceService::new(
                stores.video_sources.clone(),
                stores.generated_videos.clone(),
            ),
            lineages: LineageService::new(stores.lineages.clone()),
            timeline: TimelineAssembler::new(
                stores.lineages,
                stores.media_assets,
                stores.edited_images,
                stores.generated_videos,
                stores.video_sources,
                buckets.clone(),
            ),
            buckets,
        }
    }

    pub fn from_config(pool: PgPool, buckets: Buckets, config: &Config) -> Self {
        Self::new(Stores::postgres(pool), buckets, config.preview_image_limit)
    }
}
