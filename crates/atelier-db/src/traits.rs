//! Store trait abstractions
//!
//! Services depend on these traits rather than on the concrete repositories,
//! so they can be exercised with in-memory stores in tests. Every owned
//! entity is addressed by `id + user_id`.

use async_trait::async_trait;
use atelier_core::error::AppError;
use atelier_core::models::{
    EditedImage, GeneratedVideo, Lineage, MediaAsset, NewEditedImage, NewGeneratedVideo,
    NewLineage, NewMediaAsset, NewProject, NewVideoSource, Project, UpdateEditedImage,
    UpdateGeneratedVideo, UpdateLineage, UpdateMediaAsset, UpdateProject, VideoSource,
};
use uuid::Uuid;

use crate::db::{
    EditedImageRepository, GeneratedVideoRepository, LineageRepository, MediaAssetRepository,
    ProjectRepository, VideoSourceRepository,
};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Project>, AppError>;
    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Project>, AppError>;
    async fn create(&self, new: &NewProject) -> Result<Project, AppError>;
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateProject,
    ) -> Result<Option<Project>, AppError>;
    /// Returns whether a row was removed
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait MediaAssetStore: Send + Sync {
    async fn list_by_project(&self, project_id: Uuid, user_id: Uuid)
        -> Result<Vec<MediaAsset>, AppError>;
    async fn list_by_lineage(&self, lineage_id: Uuid, user_id: Uuid)
        -> Result<Vec<MediaAsset>, AppError>;
    /// At most `limit` image assets per project, newest first
    async fn recent_images(
        &self,
        user_id: Uuid,
        project_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MediaAsset>, AppError>;
    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<MediaAsset>, AppError>;
    async fn create(&self, new: &NewMediaAsset) -> Result<MediaAsset, AppError>;
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateMediaAsset,
    ) -> Result<Option<MediaAsset>, AppError>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait EditedImageStore: Send + Sync {
    async fn list_by_project(&self, project_id: Uuid, user_id: Uuid)
        -> Result<Vec<EditedImage>, AppError>;
    async fn list_by_lineage(&self, lineage_id: Uuid, user_id: Uuid)
        -> Result<Vec<EditedImage>, AppError>;
    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<EditedImage>, AppError>;
    async fn create(&self, new: &NewEditedImage) -> Result<EditedImage, AppError>;
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateEditedImage,
    ) -> Result<Option<EditedImage>, AppError>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait GeneratedVideoStore: Send + Sync {
    async fn list_by_project(&self, project_id: Uuid, user_id: Uuid)
        -> Result<Vec<GeneratedVideo>, AppError>;
    async fn list_by_lineage(&self, lineage_id: Uuid, user_id: Uuid)
        -> Result<Vec<GeneratedVideo>, AppError>;
    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<GeneratedVideo>, AppError>;
    async fn create(&self, new: &NewGeneratedVideo) -> Result<GeneratedVideo, AppError>;
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateGeneratedVideo,
    ) -> Result<Option<GeneratedVideo>, AppError>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

/// Video sources carry no owner; ownership is checked through the video.
#[async_trait]
pub trait VideoSourceStore: Send + Sync {
    async fn list_by_video(&self, video_id: Uuid) -> Result<Vec<VideoSource>, AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<VideoSource>, AppError>;
    async fn create(&self, new: &NewVideoSource) -> Result<VideoSource, AppError>;
    async fn create_many(&self, sources: &[NewVideoSource]) -> Result<Vec<VideoSource>, AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait LineageStore: Send + Sync {
    async fn list_by_project(&self, project_id: Uuid, user_id: Uuid)
        -> Result<Vec<Lineage>, AppError>;
    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Lineage>, AppError>;
    async fn create(&self, new: &NewLineage) -> Result<Lineage, AppError>;
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateLineage,
    ) -> Result<Option<Lineage>, AppError>;
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

// Implementations for concrete repository types

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Project>, AppError> {
        self.list_projects(user_id).await
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Project>, AppError> {
        self.get_project(id, user_id).await
    }

    async fn create(&self, new: &NewProject) -> Result<Project, AppError> {
        self.create_project(new).await
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateProject,
    ) -> Result<Option<Project>, AppError> {
        self.update_project(id, user_id, changes).await
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.delete_project(id, user_id).await
    }
}

#[async_trait]
impl MediaAssetStore for MediaAssetRepository {
    async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MediaAsset>, AppError> {
        MediaAssetRepository::list_by_project(self, project_id, user_id).await
    }

    async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MediaAsset>, AppError> {
        MediaAssetRepository::list_by_lineage(self, lineage_id, user_id).await
    }

    async fn recent_images(
        &self,
        user_id: Uuid,
        project_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MediaAsset>, AppError> {
        MediaAssetRepository::recent_images(self, user_id, project_ids, limit).await
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<MediaAsset>, AppError> {
        self.get_asset(id, user_id).await
    }

    async fn create(&self, new: &NewMediaAsset) -> Result<MediaAsset, AppError> {
        self.create_asset(new).await
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateMediaAsset,
    ) -> Result<Option<MediaAsset>, AppError> {
        self.update_asset(id, user_id, changes).await
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.delete_asset(id, user_id).await
    }
}

#[async_trait]
impl EditedImageStore for EditedImageRepository {
    async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EditedImage>, AppError> {
        EditedImageRepository::list_by_project(self, project_id, user_id).await
    }

    async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EditedImage>, AppError> {
        EditedImageRepository::list_by_lineage(self, lineage_id, user_id).await
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<EditedImage>, AppError> {
        self.get_image(id, user_id).await
    }

    async fn create(&self, new: &NewEditedImage) -> Result<EditedImage, AppError> {
        self.create_image(new).await
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateEditedImage,
    ) -> Result<Option<EditedImage>, AppError> {
        self.update_image(id, user_id, changes).await
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.delete_image(id, user_id).await
    }
}

#[async_trait]
impl GeneratedVideoStore for GeneratedVideoRepository {
    async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        GeneratedVideoRepository::list_by_project(self, project_id, user_id).await
    }

    async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        GeneratedVideoRepository::list_by_lineage(self, lineage_id, user_id).await
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<GeneratedVideo>, AppError> {
        self.get_video(id, user_id).await
    }

    async fn create(&self, new: &NewGeneratedVideo) -> Result<GeneratedVideo, AppError> {
        self.create_video(new).await
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateGeneratedVideo,
    ) -> Result<Option<GeneratedVideo>, AppError> {
        self.update_video(id, user_id, changes).await
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.delete_video(id, user_id).await
    }
}

#[async_trait]
impl VideoSourceStore for VideoSourceRepository {
    async fn list_by_video(&self, video_id: Uuid) -> Result<Vec<VideoSource>, AppError> {
        VideoSourceRepository::list_by_video(self, video_id).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<VideoSource>, AppError> {
        self.get_source(id).await
    }

    async fn create(&self, new: &NewVideoSource) -> Result<VideoSource, AppError> {
        self.create_source(new).await
    }

    async fn create_many(&self, sources: &[NewVideoSource]) -> Result<Vec<VideoSource>, AppError> {
        self.create_sources(sources).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_source(id).await
    }
}

#[async_trait]
impl LineageStore for LineageRepository {
    async fn list_by_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Lineage>, AppError> {
        LineageRepository::list_by_project(self, project_id, user_id).await
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<Lineage>, AppError> {
        self.get_lineage(id, user_id).await
    }

    async fn create(&self, new: &NewLineage) -> Result<Lineage, AppError> {
        self.create_lineage(new).await
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateLineage,
    ) -> Result<Option<Lineage>, AppError> {
        self.update_lineage(id, user_id, changes).await
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        self.delete_lineage(id, user_id).await
    }
}
