use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;
use crate::validation::parse_required_id;

/// Kind of row a video source points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "video_source_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    EditedImage,
    MediaAsset,
}

/// Join row between a generated video and the image it was generated from.
/// Carries no owner; ownership is checked through the referenced video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct VideoSource {
    pub id: Uuid,
    pub video_id: Uuid,
    pub source_type: SourceType,
    pub source_id: Uuid,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for linking a source image to a video
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoSourceRequest {
    pub video_id: String,
    pub source_type: SourceType,
    pub source_id: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Validated video source insert payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideoSource {
    pub video_id: Uuid,
    pub source_type: SourceType,
    pub source_id: Uuid,
    pub sort_order: i32,
}

impl CreateVideoSourceRequest {
    pub fn into_new(self) -> Result<NewVideoSource, AppError> {
        Ok(NewVideoSource {
            video_id: parse_required_id("video_id", &self.video_id)?,
            source_type: self.source_type,
            source_id: parse_required_id("source_id", &self.source_id)?,
            sort_order: self.sort_order.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SourceType::EditedImage).unwrap(),
            "\"edited_image\""
        );
        let parsed: SourceType = serde_json::from_str("\"media_asset\"").unwrap();
        assert_eq!(parsed, SourceType::MediaAsset);
    }

    #[test]
    fn requires_video_and_source() {
        let err = CreateVideoSourceRequest {
            video_id: "".into(),
            source_type: SourceType::MediaAsset,
            source_id: Uuid::new_v4().to_string(),
            sort_order: None,
        }
        .into_new()
        .unwrap_err();
        assert!(err.is_validation());
    }
}
