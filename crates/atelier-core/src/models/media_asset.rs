use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;
use crate::validation::{not_blank, parse_optional_id, parse_required_id};

/// Uploaded media file. The first upload of a file roots a lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaAsset {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub lineage_id: Option<Uuid>,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub storage_path: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaAsset {
    /// Image assets are the ones shown as project previews.
    pub fn is_image(&self) -> bool {
        self.file_type.to_ascii_lowercase().starts_with("image/")
    }
}

/// Request DTO for registering an uploaded file
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMediaAssetRequest {
    #[validate(custom(function = "not_blank"))]
    pub project_id: String,
    #[validate(custom(function = "not_blank"))]
    pub user_id: String,
    /// Existing lineage to attach to; a new lineage is created when absent.
    #[serde(default)]
    pub lineage_id: Option<String>,
    #[validate(length(
        min = 1,
        max = 255,
        message = "File name must be between 1 and 255 characters"
    ))]
    pub file_name: String,
    #[validate(custom(function = "not_blank"))]
    pub file_type: String,
    #[validate(range(min = 0, message = "File size cannot be negative"))]
    pub file_size: i64,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[validate(custom(function = "not_blank"))]
    pub storage_path: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Validated media asset insert payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewMediaAsset {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub lineage_id: Option<Uuid>,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub storage_path: String,
    pub sort_order: i32,
}

impl CreateMediaAssetRequest {
    pub fn into_new(self) -> Result<NewMediaAsset, AppError> {
        self.validate()?;
        Ok(NewMediaAsset {
            project_id: parse_required_id("project_id", &self.project_id)?,
            user_id: parse_required_id("user_id", &self.user_id)?,
            lineage_id: parse_optional_id("lineage_id", self.lineage_id.as_deref())?,
            file_name: self.file_name,
            file_type: self.file_type.trim().to_string(),
            file_size: self.file_size,
            width: self.width,
            height: self.height,
            storage_path: self.storage_path,
            sort_order: self.sort_order.unwrap_or(0),
        })
    }
}

/// Partial media asset update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMediaAsset {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub lineage_id: Option<Uuid>,
}

impl UpdateMediaAsset {
    pub fn apply_to(&self, asset: &mut MediaAsset) {
        if let Some(ref file_name) = self.file_name {
            asset.file_name = file_name.clone();
        }
        if let Some(sort_order) = self.sort_order {
            asset.sort_order = sort_order;
        }
        if let Some(lineage_id) = self.lineage_id {
            asset.lineage_id = Some(lineage_id);
        }
    }
}
