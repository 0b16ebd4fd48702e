use std::sync::Arc;

use atelier_core::models::{CreateLineageRequest, Lineage, UpdateLineage};
use atelier_core::AppError;
use atelier_db::LineageStore;
use uuid::Uuid;

#[derive(Clone)]
pub struct LineageService {
    lineages: Arc<dyn LineageStore>,
}

impl LineageService {
    pub fn new(lineages: Arc<dyn LineageStore>) -> Self {
        Self { lineages }
    }

    pub async fn list(&self, project_id: Uuid, user_id: Uuid) -> Result<Vec<Lineage>, AppError> {
        self.lineages.list_by_project(project_id, user_id).await
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Lineage, AppError> {
        self.lineages
            .get(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lineage {} not found", id)))
    }

    pub async fn create(&self, request: CreateLineageRequest) -> Result<Lineage, AppError> {
        let new = request.into_new()?;
        self.lineages.create(&new).await
    }

    /// Rename or re-tag a lineage. The root asset stays fixed.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: UpdateLineage,
    ) -> Result<Lineage, AppError> {
        self.lineages
            .update(id, user_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lineage {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        self.lineages.delete(id, user_id).await?;
        Ok(())
    }
}
