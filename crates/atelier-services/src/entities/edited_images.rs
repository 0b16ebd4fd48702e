use std::sync::Arc;
use std::time::Duration;

use atelier_core::models::{CreateEditedImageRequest, EditedImage, UpdateEditedImage};
use atelier_core::AppError;
use atelier_db::EditedImageStore;
use atelier_storage::{is_absolute_url, resolve_display_url, Storage};
use uuid::Uuid;

#[derive(Clone)]
pub struct EditedImageService {
    images: Arc<dyn EditedImageStore>,
    storage: Arc<dyn Storage>,
}

impl EditedImageService {
    pub fn new(images: Arc<dyn EditedImageStore>, storage: Arc<dyn Storage>) -> Self {
        Self { images, storage }
    }

    fn with_url(&self, mut image: EditedImage) -> EditedImage {
        image.image_url = Some(resolve_display_url(self.storage.as_ref(), &image.storage_path));
        image
    }

    pub async fn list(&self, project_id: Uuid, user_id: Uuid) -> Result<Vec<EditedImage>, AppError> {
        let images = self.images.list_by_project(project_id, user_id).await?;
        Ok(images.into_iter().map(|i| self.with_url(i)).collect())
    }

    pub async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<EditedImage>, AppError> {
        let images = self.images.list_by_lineage(lineage_id, user_id).await?;
        Ok(images.into_iter().map(|i| self.with_url(i)).collect())
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<EditedImage, AppError> {
        self.images
            .get(id, user_id)
            .await?
            .map(|i| self.with_url(i))
            .ok_or_else(|| AppError::NotFound(format!("Edited image {} not found", id)))
    }

    /// Record an edit. Blank project or user identifiers are rejected before
    /// the store is touched.
    #[tracing::instrument(skip(self, request))]
    pub async fn create(&self, request: CreateEditedImageRequest) -> Result<EditedImage, AppError> {
        let new = request.into_new()?;
        let image = self.images.create(&new).await?;
        tracing::info!(image_id = %image.id, lineage_id = ?image.lineage_id, "Edited image recorded");
        Ok(self.with_url(image))
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: UpdateEditedImage,
    ) -> Result<EditedImage, AppError> {
        self.images
            .update(id, user_id, &changes)
            .await?
            .map(|i| self.with_url(i))
            .ok_or_else(|| AppError::NotFound(format!("Edited image {} not found", id)))
    }

    #[tracing::instrument(skip(self, image), fields(image_id = %image.id))]
    pub async fn delete(&self, image: &EditedImage) -> Result<(), AppError> {
        if !is_absolute_url(&image.storage_path) {
            self.storage
                .delete(std::slice::from_ref(&image.storage_path))
                .await?;
        }
        self.images.delete(image.id, image.user_id).await?;
        Ok(())
    }

    /// Time-limited URL for a private bucket.
    pub async fn signed_url(&self, image: &EditedImage, ttl: Duration) -> Result<String, AppError> {
        if is_absolute_url(&image.storage_path) {
            return Ok(image.storage_path.clone());
        }
        Ok(self.storage.signed_url(&image.storage_path, ttl).await?)
    }
}
