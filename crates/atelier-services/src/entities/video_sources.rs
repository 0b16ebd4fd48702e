use std::sync::Arc;

use atelier_core::models::{CreateVideoSourceRequest, NewVideoSource, SourceType, VideoSource};
use atelier_core::AppError;
use atelier_db::{GeneratedVideoStore, VideoSourceStore};
use uuid::Uuid;

/// Links between generated videos and the images they were made from.
///
/// Source rows have no owner of their own. Every call first confirms that the
/// referenced video belongs to the acting user and fails with `AccessDenied`
/// otherwise, before any source row is read or written.
#[derive(Clone)]
pub struct VideoSourceService {
    sources: Arc<dyn VideoSourceStore>,
    videos: Arc<dyn GeneratedVideoStore>,
}

impl VideoSourceService {
    pub fn new(sources: Arc<dyn VideoSourceStore>, videos: Arc<dyn GeneratedVideoStore>) -> Self {
        Self { sources, videos }
    }

    async fn ensure_video_owned(&self, video_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        match self.videos.get(video_id, user_id).await? {
            Some(_) => Ok(()),
            None => {
                tracing::warn!(video_id = %video_id, user_id = %user_id, "Video source access denied");
                Err(AppError::AccessDenied(format!(
                    "Video {} does not belong to the current user",
                    video_id
                )))
            }
        }
    }

    pub async fn list(&self, video_id: Uuid, user_id: Uuid) -> Result<Vec<VideoSource>, AppError> {
        self.ensure_video_owned(video_id, user_id).await?;
        self.sources.list_by_video(video_id).await
    }

    pub async fn create(
        &self,
        request: CreateVideoSourceRequest,
        user_id: Uuid,
    ) -> Result<VideoSource, AppError> {
        let new = request.into_new()?;
        self.ensure_video_owned(new.video_id, user_id).await?;
        self.sources.create(&new).await
    }

    /// Link several sources at once, ordered as given.
    pub async fn create_many(
        &self,
        video_id: Uuid,
        user_id: Uuid,
        sources: &[(SourceType, Uuid)],
    ) -> Result<Vec<VideoSource>, AppError> {
        self.ensure_video_owned(video_id, user_id).await?;
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<NewVideoSource> = sources
            .iter()
            .enumerate()
            .map(|(index, (source_type, source_id))| NewVideoSource {
                video_id,
                source_type: *source_type,
                source_id: *source_id,
                sort_order: index as i32,
            })
            .collect();
        self.sources.create_many(&rows).await
    }

    pub async fn delete(&self, source_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let source = self.sources.get(source_id).await?.ok_or_else(|| {
            AppError::AccessDenied(format!("Video source {} is not accessible", source_id))
        })?;
        self.ensure_video_owned(source.video_id, user_id).await?;
        self.sources.delete(source_id).await?;
        Ok(())
    }
}
