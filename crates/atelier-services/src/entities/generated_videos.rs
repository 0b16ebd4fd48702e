use std::sync::Arc;

use atelier_core::models::{CreateGeneratedVideoRequest, GeneratedVideo, UpdateGeneratedVideo};
use atelier_core::AppError;
use atelier_db::GeneratedVideoStore;
use atelier_storage::{is_absolute_url, resolve_display_url, Storage};
use chrono::Utc;
use uuid::Uuid;

/// Generated videos. `storage_path` may be empty while the video is still
/// processing, or an absolute URL when the provider hosts the file.
#[derive(Clone)]
pub struct GeneratedVideoService {
    videos: Arc<dyn GeneratedVideoStore>,
    storage: Arc<dyn Storage>,
}

impl GeneratedVideoService {
    pub fn new(videos: Arc<dyn GeneratedVideoStore>, storage: Arc<dyn Storage>) -> Self {
        Self { videos, storage }
    }

    fn with_url(&self, mut video: GeneratedVideo) -> GeneratedVideo {
        video.video_url = video
            .storage_path
            .as_deref()
            .map(|path| resolve_display_url(self.storage.as_ref(), path));
        video
    }

    pub async fn list(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        let videos = self.videos.list_by_project(project_id, user_id).await?;
        Ok(videos.into_iter().map(|v| self.with_url(v)).collect())
    }

    pub async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        let videos = self.videos.list_by_lineage(lineage_id, user_id).await?;
        Ok(videos.into_iter().map(|v| self.with_url(v)).collect())
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<GeneratedVideo, AppError> {
        self.videos
            .get(id, user_id)
            .await?
            .map(|v| self.with_url(v))
            .ok_or_else(|| AppError::NotFound(format!("Generated video {} not found", id)))
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: CreateGeneratedVideoRequest,
    ) -> Result<GeneratedVideo, AppError> {
        let new = request.into_new()?;
        let video = self.videos.create(&new).await?;
        tracing::info!(video_id = %video.id, status = ?video.status, "Generated video recorded");
        Ok(self.with_url(video))
    }

    #[tracing::instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: UpdateGeneratedVideo,
    ) -> Result<GeneratedVideo, AppError> {
        let changes = changes.stamped(Utc::now());
        self.videos
            .update(id, user_id, &changes)
            .await?
            .map(|v| self.with_url(v))
            .ok_or_else(|| AppError::NotFound(format!("Generated video {} not found", id)))
    }

    /// Remove the stored file, then the row. Videos without a bucket path
    /// skip storage entirely.
    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    pub async fn delete(&self, video: &GeneratedVideo) -> Result<(), AppError> {
        match video.storage_path.as_deref() {
            Some(path) if !path.trim().is_empty() && !is_absolute_url(path) => {
                self.storage.delete(&[path.to_string()]).await?;
            }
            _ => {
                tracing::debug!("No bucket object to remove");
            }
        }
        self.videos.delete(video.id, video.user_id).await?;
        Ok(())
    }
}
