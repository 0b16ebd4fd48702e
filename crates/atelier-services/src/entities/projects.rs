use std::collections::HashMap;
use std::sync::Arc;

use atelier_core::models::{CreateProjectRequest, Project, UpdateProject};
use atelier_core::AppError;
use atelier_db::{MediaAssetStore, ProjectStore};
use uuid::Uuid;
use validator::Validate;

/// Projects, listed with the paths of their most recent images
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectStore>,
    assets: Arc<dyn MediaAssetStore>,
    preview_limit: i64,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        assets: Arc<dyn MediaAssetStore>,
        preview_limit: i64,
    ) -> Self {
        Self {
            projects,
            assets,
            preview_limit,
        }
    }

    /// A user's projects, newest first. Each carries up to `preview_limit`
    /// storage paths of its most recent image assets, or an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Project>, AppError> {
        let mut projects = self.projects.list(user_id).await?;
        if projects.is_empty() || self.preview_limit <= 0 {
            return Ok(projects);
        }

        let ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();
        let mut images = self
            .assets
            .recent_images(user_id, &ids, self.preview_limit)
            .await?;
        images.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let limit = self.preview_limit as usize;
        let mut previews: HashMap<Uuid, Vec<String>> = HashMap::new();
        for image in images.into_iter().filter(|a| a.is_image()) {
            let paths = previews.entry(image.project_id).or_default();
            if paths.len() < limit {
                paths.push(image.storage_path);
            }
        }

        for project in &mut projects {
            project.preview_images = previews.remove(&project.id).unwrap_or_default();
        }

        Ok(projects)
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Project, AppError> {
        self.projects
            .get(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create(&self, request: CreateProjectRequest) -> Result<Project, AppError> {
        let new = request.into_new()?;
        let project = self.projects.create(&new).await?;
        tracing::info!(project_id = %project.id, user_id = %project.user_id, "Project created");
        Ok(project)
    }

    #[tracing::instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: UpdateProject,
    ) -> Result<Project, AppError> {
        changes.validate()?;
        if changes.is_empty() {
            return self.get(id, user_id).await;
        }
        self.projects
            .update(id, user_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        if !self.projects.delete(id, user_id).await? {
            tracing::debug!(project_id = %id, "Delete matched no project");
        }
        Ok(())
    }
}
