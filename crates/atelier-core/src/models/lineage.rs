use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;
use crate::validation::{not_blank, parse_required_id};

/// Derivation history of one originating media asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Lineage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub root_media_asset_id: Uuid,
    pub name: Option<String>,
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating a lineage
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLineageRequest {
    #[validate(custom(function = "not_blank"))]
    pub project_id: String,
    #[validate(custom(function = "not_blank"))]
    pub user_id: String,
    #[validate(custom(function = "not_blank"))]
    pub root_media_asset_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

/// Validated lineage insert payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineage {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub root_media_asset_id: Uuid,
    pub name: Option<String>,
    pub metadata: JsonValue,
}

impl CreateLineageRequest {
    pub fn into_new(self) -> Result<NewLineage, AppError> {
        self.validate()?;
        Ok(NewLineage {
            project_id: parse_required_id("project_id", &self.project_id)?,
            user_id: parse_required_id("user_id", &self.user_id)?,
            root_media_asset_id: parse_required_id(
                "root_media_asset_id",
                &self.root_media_asset_id,
            )?,
            name: self.name,
            metadata: self.metadata.unwrap_or_else(empty_object),
        })
    }
}

/// Partial lineage update. The root asset is fixed at creation and cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLineage {
    #[serde(default)]
    pub name: Option<Option<String>>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

impl UpdateLineage {
    pub fn apply_to(&self, lineage: &mut Lineage) {
        if let Some(ref name) = self.name {
            lineage.name = name.clone();
        }
        if let Some(ref metadata) = self.metadata {
            lineage.metadata = metadata.clone();
        }
    }
}

/// Default for optional JSON maps.
pub fn empty_object() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}
