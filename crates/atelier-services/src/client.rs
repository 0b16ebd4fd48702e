//! Cached client surface
//!
//! `StudioClient` is what a front end talks to: cached queries per entity and
//! mutations that keep those caches consistent. Deletes drop the item from
//! the cached list before the remote call and updates patch it in place;
//! creates only invalidate. A failed mutation restores the cached list.

use std::sync::Arc;

use atelier_core::models::{
    CreateEditedImageRequest, CreateGeneratedVideoRequest, CreateProjectRequest, EditedImage,
    GeneratedVideo, Lineage, MediaAsset, Project, SourceType, TimelineData, UpdateGeneratedVideo,
    UpdateLineage, UpdateProject,
};
use atelier_core::{AppError, AuthGate, Config, ThemeContext};
use chrono::Utc;
use uuid::Uuid;

use crate::cache::{run_optimistic, QueryCache, QueryKey, QueryKind};
use crate::entities::MediaUpload;
use crate::services::Services;

/// File to upload through [`StudioClient::upload_media_asset`]
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

#[derive(Clone)]
pub struct StudioClient {
    services: Services,
    cache: Arc<QueryCache>,
    auth: AuthGate,
    theme: ThemeContext,
    session_user: Option<Uuid>,
}

impl StudioClient {
    pub fn new(services: Services, cache: Arc<QueryCache>, auth: AuthGate) -> Self {
        Self {
            services,
            cache,
            auth,
            theme: ThemeContext::default(),
            session_user: None,
        }
    }

    /// Auth gate and initial theme taken from configuration
    pub fn from_config(services: Services, cache: Arc<QueryCache>, config: &Config) -> Self {
        Self::new(services, cache, AuthGate::from_config(config))
            .with_theme(ThemeContext::from_config(config))
    }

    /// Share a theme with other clients or views
    pub fn with_theme(mut self, theme: ThemeContext) -> Self {
        self.theme = theme;
        self
    }

    /// Act as a signed-in user
    pub fn with_session(mut self, user_id: Uuid) -> Self {
        self.session_user = Some(user_id);
        self
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn theme(&self) -> &ThemeContext {
        &self.theme
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn current_user(&self) -> Result<Uuid, AppError> {
        self.auth.resolve_user(self.session_user)
    }

    // Queries

    pub async fn projects(&self) -> Result<Vec<Project>, AppError> {
        let user = self.current_user()?;
        self.cache
            .fetch(QueryKey::projects(user), || self.services.projects.list(user))
            .await
    }

    pub async fn media_assets(&self, project_id: Uuid) -> Result<Vec<MediaAsset>, AppError> {
        let user = self.current_user()?;
        self.cache
            .fetch(QueryKey::media_assets(project_id, user), || {
                self.services.media_assets.list(project_id, user)
            })
            .await
    }

    pub async fn edited_images(&self, project_id: Uuid) -> Result<Vec<EditedImage>, AppError> {
        let user = self.current_user()?;
        self.cache
            .fetch(QueryKey::edited_images(project_id, user), || {
                self.services.edited_images.list(project_id, user)
            })
            .await
    }

    pub async fn generated_videos(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<GeneratedVideo>, AppError> {
        let user = self.current_user()?;
        self.cache
            .fetch(QueryKey::generated_videos(project_id, user), || {
                self.services.generated_videos.list(project_id, user)
            })
            .await
    }

    pub async fn lineages(&self, project_id: Uuid) -> Result<Vec<Lineage>, AppError> {
        let user = self.current_user()?;
        self.cache
            .fetch(QueryKey::lineages(project_id, user), || {
                self.services.lineages.list(project_id, user)
            })
            .await
    }

    pub async fn timeline(&self, lineage_id: Uuid) -> Result<TimelineData, AppError> {
        let user = self.current_user()?;
        self.cache
            .fetch(QueryKey::timeline(lineage_id, user), || {
                self.services.timeline.get_timeline_data(lineage_id, user)
            })
            .await
    }

    // Mutations

    pub async fn create_project(
        &self,
        name: &str,
        description: Option<String>,
    ) -> Result<Project, AppError> {
        let user = self.current_user()?;
        let request = CreateProjectRequest {
            user_id: user.to_string(),
            name: name.to_string(),
            description,
            thumbnail_url: None,
        };
        let result = self.services.projects.create(request).await;
        self.cache.invalidate(&QueryKey::projects(user)).await;
        result
    }

    pub async fn update_project(
        &self,
        project_id: Uuid,
        changes: UpdateProject,
    ) -> Result<Project, AppError> {
        let user = self.current_user()?;
        let patch = changes.clone();
        run_optimistic::<Vec<Project>, _, _, _, _>(
            &self.cache,
            QueryKey::projects(user),
            move |projects| {
                if let Some(project) = projects.iter_mut().find(|p| p.id == project_id) {
                    patch.apply_to(project);
                }
            },
            || self.services.projects.update(project_id, user, changes),
        )
        .await
    }

    pub async fn delete_project(&self, project_id: Uuid) -> Result<(), AppError> {
        let user = self.current_user()?;
        run_optimistic::<Vec<Project>, _, _, _, _>(
            &self.cache,
            QueryKey::projects(user),
            |projects| projects.retain(|p| p.id != project_id),
            || self.services.projects.delete(project_id, user),
        )
        .await
    }

    /// Upload a file into a project. Without `lineage_id` it roots a new lineage.
    pub async fn upload_media_asset(
        &self,
        project_id: Uuid,
        lineage_id: Option<Uuid>,
        file: NewUpload,
    ) -> Result<MediaAsset, AppError> {
        let user = self.current_user()?;
        let upload = MediaUpload {
            project_id: project_id.to_string(),
            user_id: user.to_string(),
            lineage_id: lineage_id.map(|id| id.to_string()),
            file_name: file.file_name,
            content_type: file.content_type,
            data: file.data,
            width: file.width,
            height: file.height,
        };

        let result = self.services.media_assets.upload(upload).await;
        self.cache
            .invalidate(&QueryKey::media_assets(project_id, user))
            .await;
        self.cache.invalidate(&QueryKey::lineages(project_id, user)).await;
        self.cache.invalidate(&QueryKey::projects(user)).await;
        result
    }

    pub async fn delete_media_asset(&self, asset: &MediaAsset) -> Result<(), AppError> {
        let user = self.owner_of(asset.user_id)?;
        let asset_id = asset.id;
        let result = run_optimistic::<Vec<MediaAsset>, _, _, _, _>(
            &self.cache,
            QueryKey::media_assets(asset.project_id, user),
            |assets| assets.retain(|a| a.id != asset_id),
            || self.services.media_assets.delete(asset),
        )
        .await;
        self.cache.invalidate(&QueryKey::projects(user)).await;
        self.cache.invalidate_kind(QueryKind::Timeline).await;
        result
    }

    pub async fn create_edited_image(
        &self,
        request: CreateEditedImageRequest,
    ) -> Result<EditedImage, AppError> {
        let result = self.services.edited_images.create(request).await;
        self.cache.invalidate_kind(QueryKind::EditedImages).await;
        self.cache.invalidate_kind(QueryKind::Timeline).await;
        result
    }

    pub async fn delete_edited_image(&self, image: &EditedImage) -> Result<(), AppError> {
        let user = self.owner_of(image.user_id)?;
        let image_id = image.id;
        let result = run_optimistic::<Vec<EditedImage>, _, _, _, _>(
            &self.cache,
            QueryKey::edited_images(image.project_id, user),
            |images| images.retain(|i| i.id != image_id),
            || self.services.edited_images.delete(image),
        )
        .await;
        self.cache.invalidate_kind(QueryKind::Timeline).await;
        result
    }

    /// Record a video and link the images it was generated from, in order.
    pub async fn create_generated_video(
        &self,
        request: CreateGeneratedVideoRequest,
        sources: &[(SourceType, Uuid)],
    ) -> Result<GeneratedVideo, AppError> {
        let result = async {
            let video = self.services.generated_videos.create(request).await?;
            if sources.is_empty() {
                return Ok::<_, AppError>(video);
            }
            let linked = self
                .services
                .video_sources
                .create_many(video.id, video.user_id, sources)
                .await;
            match linked {
                Ok(_) => Ok(video),
                Err(e) => {
                    tracing::error!(error = %e, video_id = %video.id, "Source linking failed, removing video");
                    if let Err(cleanup) = self.services.generated_videos.delete(&video).await {
                        tracing::error!(error = %cleanup, video_id = %video.id, "Failed to remove orphaned video");
                    }
                    Err(e)
                }
            }
        }
        .await;
        self.cache.invalidate_kind(QueryKind::GeneratedVideos).await;
        self.cache.invalidate_kind(QueryKind::Timeline).await;
        result
    }

    pub async fn update_generated_video(
        &self,
        video: &GeneratedVideo,
        changes: UpdateGeneratedVideo,
    ) -> Result<GeneratedVideo, AppError> {
        let user = self.owner_of(video.user_id)?;
        let video_id = video.id;
        let changes = changes.stamped(Utc::now());
        let patch = changes.clone();
        let result = run_optimistic::<Vec<GeneratedVideo>, _, _, _, _>(
            &self.cache,
            QueryKey::generated_videos(video.project_id, user),
            move |videos| {
                if let Some(video) = videos.iter_mut().find(|v| v.id == video_id) {
                    patch.apply_to(video);
                }
            },
            || self.services.generated_videos.update(video_id, user, changes),
        )
        .await;
        if let Some(lineage_id) = video.lineage_id {
            self.cache
                .invalidate(&QueryKey::timeline(lineage_id, user))
                .await;
        }
        result
    }

    pub async fn delete_generated_video(&self, video: &GeneratedVideo) -> Result<(), AppError> {
        let user = self.owner_of(video.user_id)?;
        let video_id = video.id;
        let result = run_optimistic::<Vec<GeneratedVideo>, _, _, _, _>(
            &self.cache,
            QueryKey::generated_videos(video.project_id, user),
            |videos| videos.retain(|v| v.id != video_id),
            || self.services.generated_videos.delete(video),
        )
        .await;
        self.cache.invalidate_kind(QueryKind::Timeline).await;
        result
    }

    pub async fn rename_lineage(
        &self,
        lineage: &Lineage,
        name: Option<String>,
    ) -> Result<Lineage, AppError> {
        let user = self.owner_of(lineage.user_id)?;
        let lineage_id = lineage.id;
        let patched_name = name.clone();
        run_optimistic::<Vec<Lineage>, _, _, _, _>(
            &self.cache,
            QueryKey::lineages(lineage.project_id, user),
            move |lineages| {
                if let Some(lineage) = lineages.iter_mut().find(|l| l.id == lineage_id) {
                    lineage.name = patched_name;
                }
            },
            || {
                self.services.lineages.update(
                    lineage_id,
                    user,
                    UpdateLineage {
                        name: Some(name),
                        metadata: None,
                    },
                )
            },
        )
        .await
    }

    /// The acting user, who must own the row about to be changed.
    fn owner_of(&self, row_user: Uuid) -> Result<Uuid, AppError> {
        let user = self.current_user()?;
        if user != row_user {
            return Err(AppError::AccessDenied(
                "Row belongs to another user".to_string(),
            ));
        }
        Ok(user)
    }
}
