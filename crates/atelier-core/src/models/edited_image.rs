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

/// AI edit of a media asset or of a previous edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct EditedImage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub lineage_id: Option<Uuid>,
    /// Previous edit this one was derived from
    pub parent_id: Option<Uuid>,
    /// Media asset this edit was derived from
    pub source_asset_id: Option<Uuid>,
    pub prompt: String,
    pub context: JsonValue,
    pub ai_model: String,
    pub storage_path: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Public URL of `storage_path`, filled in by the service layer.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub image_url: Option<String>,
}

impl EditedImage {
    /// Node this edit derives from. An explicit `parent_id` wins over
    /// `source_asset_id`; `None` means the lineage root.
    pub fn derived_from(&self) -> Option<Uuid> {
        self.parent_id.or(self.source_asset_id)
    }
}

/// Request DTO for recording an edit
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEditedImageRequest {
    #[validate(custom(function = "not_blank"))]
    pub project_id: String,
    #[validate(custom(function = "not_blank"))]
    pub user_id: String,
    #[serde(default)]
    pub lineage_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub source_asset_id: Option<String>,
    pub prompt: String,
    #[serde(default)]
    pub context: Option<JsonValue>,
    #[validate(custom(function = "not_blank"))]
    pub ai_model: String,
    #[validate(custom(function = "not_blank"))]
    pub storage_path: String,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 1, message = "Version starts at 1"))]
    pub version: Option<i32>,
}

/// Validated edited image insert payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewEditedImage {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub lineage_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub source_asset_id: Option<Uuid>,
    pub prompt: String,
    pub context: JsonValue,
    pub ai_model: String,
    pub storage_path: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub version: i32,
}

impl CreateEditedImageRequest {
    pub fn into_new(self) -> Result<NewEditedImage, AppError> {
        // Identifiers first so a blank project/user is reported as such
        let project_id = parse_required_id("project_id", &self.project_id)?;
        let user_id = parse_required_id("user_id", &self.user_id)?;
        self.validate()?;

        Ok(NewEditedImage {
            project_id,
            user_id,
            lineage_id: parse_optional_id("lineage_id", self.lineage_id.as_deref())?,
            parent_id: parse_optional_id("parent_id", self.parent_id.as_deref())?,
            source_asset_id: parse_optional_id("source_asset_id", self.source_asset_id.as_deref())?,
            prompt: self.prompt,
            context: self.context.unwrap_or_else(empty_object),
            ai_model: self.ai_model,
            storage_path: self.storage_path,
            width: self.width,
            height: self.height,
            version: self.version.unwrap_or(1),
        })
    }
}

/// Partial edited image update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEditedImage {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub context: Option<JsonValue>,
    #[serde(default)]
    pub version: Option<i32>,
}

impl UpdateEditedImage {
    pub fn apply_to(&self, image: &mut EditedImage) {
        if let Some(ref prompt) = self.prompt {
            image.prompt = prompt.clone();
        }
        if let Some(ref context) = self.context {
            image.context = context.clone();
        }
        if let Some(version) = self.version {
            image.version = version;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateEditedImageRequest {
        CreateEditedImageRequest {
            project_id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            lineage_id: None,
            parent_id: None,
            source_asset_id: None,
            prompt: "make it golden hour".into(),
            context: None,
            ai_model: "flux-kontext".into(),
            storage_path: "u/p/edit.png".into(),
            width: None,
            height: None,
            version: None,
        }
    }

    #[test]
    fn blank_identifiers_fail_with_field_name() {
        let mut req = request();
        req.project_id = "   ".into();
        let err = req.into_new().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "project_id is required"));

        let mut req = request();
        req.user_id = "".into();
        let err = req.into_new().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "user_id is required"));
    }

    #[test]
    fn defaults_context_and_version() {
        let new = request().into_new().unwrap();
        assert_eq!(new.context, serde_json::json!({}));
        assert_eq!(new.version, 1);
    }

    #[test]
    fn parent_wins_over_source_asset() {
        let now = Utc::now();
        let parent = Uuid::new_v4();
        let source = Uuid::new_v4();
        let mut image = EditedImage {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            lineage_id: None,
            parent_id: Some(parent),
            source_asset_id: Some(source),
            prompt: String::new(),
            context: serde_json::json!({}),
            ai_model: "m".into(),
            storage_path: "p".into(),
            width: None,
            height: None,
            version: 1,
            created_at: now,
            updated_at: now,
            image_url: None,
        };
        assert_eq!(image.derived_from(), Some(parent));

        image.parent_id = None;
        assert_eq!(image.derived_from(), Some(source));

        image.source_asset_id = None;
        assert_eq!(image.derived_from(), None);
    }
}
