use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::lineage::empty_object;
use crate::error::AppError;
use crate::validation::{not_blank, parse_optional_id, parse_required_id};

/// Generation status of a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "video_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Processing,
    Completed,
    Failed,
}

impl VideoStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }
}

/// Video generated from one or more images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct GeneratedVideo {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub lineage_id: Option<Uuid>,
    pub name: Option<String>,
    pub prompt: String,
    pub model: String,
    pub generation_params: JsonValue,
    /// Bucket path, or an absolute URL when the provider hosts the file.
    pub storage_path: Option<String>,
    pub status: VideoStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Request DTO for recording a generation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGeneratedVideoRequest {
    #[validate(custom(function = "not_blank"))]
    pub project_id: String,
    #[validate(custom(function = "not_blank"))]
    pub user_id: String,
    #[serde(default)]
    pub lineage_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub prompt: String,
    #[validate(custom(function = "not_blank"))]
    pub model: String,
    #[serde(default)]
    pub generation_params: Option<JsonValue>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub status: Option<VideoStatus>,
}

/// Validated generated video insert payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeneratedVideo {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub lineage_id: Option<Uuid>,
    pub name: Option<String>,
    pub prompt: String,
    pub model: String,
    pub generation_params: JsonValue,
    pub storage_path: Option<String>,
    pub status: VideoStatus,
}

impl CreateGeneratedVideoRequest {
    pub fn into_new(self) -> Result<NewGeneratedVideo, AppError> {
        let project_id = parse_required_id("project_id", &self.project_id)?;
        let user_id = parse_required_id("user_id", &self.user_id)?;
        self.validate()?;

        Ok(NewGeneratedVideo {
            project_id,
            user_id,
            lineage_id: parse_optional_id("lineage_id", self.lineage_id.as_deref())?,
            name: self.name,
            prompt: self.prompt,
            model: self.model,
            generation_params: self.generation_params.unwrap_or_else(empty_object),
            storage_path: self.storage_path.filter(|p| !p.trim().is_empty()),
            status: self.status.unwrap_or(VideoStatus::Processing),
        })
    }
}

/// Partial generated video update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGeneratedVideo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub status: Option<VideoStatus>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl UpdateGeneratedVideo {
    /// Moving to `completed` without an explicit timestamp stamps `now`.
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        if self.status == Some(VideoStatus::Completed) && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        self
    }

    pub fn apply_to(&self, video: &mut GeneratedVideo) {
        if let Some(ref name) = self.name {
            video.name = Some(name.clone());
        }
        if let Some(ref storage_path) = self.storage_path {
            video.storage_path = Some(storage_path.clone());
        }
        if let Some(status) = self.status {
            video.status = status;
        }
        if let Some(completed_at) = self.completed_at {
            video.completed_at = Some(completed_at);
        }
    }
}
