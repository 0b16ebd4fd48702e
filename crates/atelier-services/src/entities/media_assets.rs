use std::sync::Arc;

use atelier_core::models::{
    empty_object, CreateMediaAssetRequest, MediaAsset, NewLineage, NewMediaAsset, UpdateMediaAsset,
};
use atelier_core::validation::{parse_optional_id, parse_required_id};
use atelier_core::AppError;
use atelier_db::{LineageStore, MediaAssetStore};
use atelier_storage::{is_absolute_url, object_path, Storage};
use uuid::Uuid;

/// File received from a client, not yet stored
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub project_id: String,
    pub user_id: String,
    pub lineage_id: Option<String>,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// Media assets and the lineages they root
#[derive(Clone)]
pub struct MediaAssetService {
    assets: Arc<dyn MediaAssetStore>,
    lineages: Arc<dyn LineageStore>,
    storage: Arc<dyn Storage>,
}

impl MediaAssetService {
    pub fn new(
        assets: Arc<dyn MediaAssetStore>,
        lineages: Arc<dyn LineageStore>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            assets,
            lineages,
            storage,
        }
    }

    pub async fn list(&self, project_id: Uuid, user_id: Uuid) -> Result<Vec<MediaAsset>, AppError> {
        self.assets.list_by_project(project_id, user_id).await
    }

    pub async fn list_by_lineage(
        &self,
        lineage_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<MediaAsset>, AppError> {
        self.assets.list_by_lineage(lineage_id, user_id).await
    }

    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<MediaAsset, AppError> {
        self.assets
            .get(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media asset {} not found", id)))
    }

    /// Register an asset. Without a `lineage_id` the asset roots a new lineage:
    /// insert the asset, create the lineage, then point the asset at it.
    #[tracing::instrument(skip(self, request))]
    pub async fn create(&self, request: CreateMediaAssetRequest) -> Result<MediaAsset, AppError> {
        let new = request.into_new()?;
        self.insert(new).await
    }

    /// Store the file in the media bucket, then register it.
    #[tracing::instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.data.len()))]
    pub async fn upload(&self, upload: MediaUpload) -> Result<MediaAsset, AppError> {
        let project_id = parse_required_id("project_id", &upload.project_id)?;
        let user_id = parse_required_id("user_id", &upload.user_id)?;
        let lineage_id = parse_optional_id("lineage_id", upload.lineage_id.as_deref())?;
        if upload.file_name.trim().is_empty() {
            return Err(AppError::InvalidInput("file_name is required".to_string()));
        }

        let path = object_path(user_id, project_id, &upload.file_name);
        let file_size = upload.data.len() as i64;
        let stored_path = self
            .storage
            .upload(&path, &upload.content_type, upload.data)
            .await?;

        let new = NewMediaAsset {
            project_id,
            user_id,
            lineage_id,
            file_name: upload.file_name,
            file_type: upload.content_type,
            file_size,
            width: upload.width,
            height: upload.height,
            storage_path: stored_path.clone(),
            sort_order: 0,
        };

        match self.insert(new).await {
            Ok(asset) => Ok(asset),
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&[stored_path.clone()]).await {
                    tracing::warn!(
                        error = %cleanup,
                        storage_path = %stored_path,
                        "Failed to remove uploaded object after registration failure"
                    );
                }
                Err(e)
            }
        }
    }

    async fn insert(&self, new: NewMediaAsset) -> Result<MediaAsset, AppError> {
        let asset = self.assets.create(&new).await?;
        if asset.lineage_id.is_some() {
            return Ok(asset);
        }

        let lineage = NewLineage {
            project_id: asset.project_id,
            user_id: asset.user_id,
            root_media_asset_id: asset.id,
            name: Some(asset.file_name.clone()),
            metadata: empty_object(),
        };

        let lineage = match self.lineages.create(&lineage).await {
            Ok(lineage) => lineage,
            Err(e) => {
                tracing::error!(error = %e, asset_id = %asset.id, "Lineage creation failed, removing asset");
                if let Err(cleanup) = self.assets.delete(asset.id, asset.user_id).await {
                    tracing::error!(error = %cleanup, asset_id = %asset.id, "Failed to remove orphaned asset");
                }
                return Err(AppError::LineageCreation {
                    asset_id: asset.id,
                    source: Box::new(e),
                });
            }
        };

        let link = UpdateMediaAsset {
            lineage_id: Some(lineage.id),
            ..Default::default()
        };
        match self.assets.update(asset.id, asset.user_id, &link).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => {
                tracing::warn!(asset_id = %asset.id, "Asset vanished before lineage link");
                Ok(with_lineage(asset, lineage.id))
            }
            Err(e) => {
                tracing::warn!(error = %e, asset_id = %asset.id, lineage_id = %lineage.id, "Failed to link asset to lineage");
                Ok(with_lineage(asset, lineage.id))
            }
        }
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: UpdateMediaAsset,
    ) -> Result<MediaAsset, AppError> {
        self.assets
            .update(id, user_id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media asset {} not found", id)))
    }

    /// Remove the stored file, then the row.
    #[tracing::instrument(skip(self, asset), fields(asset_id = %asset.id))]
    pub async fn delete(&self, asset: &MediaAsset) -> Result<(), AppError> {
        if !is_absolute_url(&asset.storage_path) {
            self.storage
                .delete(std::slice::from_ref(&asset.storage_path))
                .await?;
        }
        self.assets.delete(asset.id, asset.user_id).await?;
        Ok(())
    }
}

fn with_lineage(mut asset: MediaAsset, lineage_id: Uuid) -> MediaAsset {
    asset.lineage_id = Some(lineage_id);
    asset
}
