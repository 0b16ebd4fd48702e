use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::error::AppError;
use crate::validation::{not_blank, parse_required_id};

/// Project owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Storage paths of the most recent image assets, newest first.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub preview_images: Vec<String>,
}

/// Request DTO for creating a project
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(custom(function = "not_blank"))]
    pub user_id: String,
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Project name must be between 1 and 255 characters"
        ),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Validated project insert payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl CreateProjectRequest {
    pub fn into_new(self) -> Result<NewProject, AppError> {
        self.validate()?;
        Ok(NewProject {
            user_id: parse_required_id("user_id", &self.user_id)?,
            name: self.name.trim().to_string(),
            description: self.description,
            thumbnail_url: self.thumbnail_url,
        })
    }
}

/// Partial project update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[serde(default)]
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Project name must be between 1 and 255 characters"
        ),
        custom(function = "not_blank")
    )]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>, // Option<Option> to distinguish "no change" from "clear"
    #[serde(default)]
    pub thumbnail_url: Option<Option<String>>,
}

impl UpdateProject {
    /// Apply the changes to a local copy (used for optimistic cache updates).
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(ref name) = self.name {
            project.name = name.clone();
        }
        if let Some(ref description) = self.description {
            project.description = description.clone();
        }
        if let Some(ref thumbnail_url) = self.thumbnail_url {
            project.thumbnail_url = thumbnail_url.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.thumbnail_url.is_none()
    }
}
