//! Configuration module
//!
//! Settings for the database pool, the three storage buckets, listing
//! behavior and presentation defaults, read from the environment.

use std::env;

use uuid::Uuid;

use crate::preferences::Theme;
use crate::storage_types::{BucketKind, StorageBackend};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SIGNED_URL_TTL_SECS: u64 = 3600;
const PREVIEW_IMAGE_LIMIT: i64 = 4;

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, Supabase, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub media_assets_bucket: String,
    pub edited_images_bucket: String,
    pub generated_videos_bucket: String,
    pub signed_url_ttl_secs: u64,
    /// Number of recent image paths attached to each listed project.
    pub preview_image_limit: i64,
    pub default_theme: Theme,
    // Development-only auth bypass
    pub bypass_auth: bool,
    pub bypass_user_id: Option<Uuid>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let default_theme = match env::var("DEFAULT_THEME") {
            Ok(value) => value.parse::<Theme>()?,
            Err(_) => Theme::System,
        };

        let bypass_user_id = match env::var("BYPASS_USER_ID").ok().filter(|s| !s.trim().is_empty()) {
            Some(value) => Some(
                Uuid::parse_str(value.trim())
                    .map_err(|e| anyhow::anyhow!("BYPASS_USER_ID must be a valid UUID: {}", e))?,
            ),
            None => None,
        };

        let config = Config {
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_region: env::var("S3_REGION").ok().filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            aws_region: env::var("AWS_REGION").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            media_assets_bucket: env::var("MEDIA_ASSETS_BUCKET")
                .unwrap_or_else(|_| BucketKind::MediaAssets.default_name().to_string()),
            edited_images_bucket: env::var("EDITED_IMAGES_BUCKET")
                .unwrap_or_else(|_| BucketKind::EditedImages.default_name().to_string()),
            generated_videos_bucket: env::var("GENERATED_VIDEOS_BUCKET")
                .unwrap_or_else(|_| BucketKind::GeneratedVideos.default_name().to_string()),
            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .unwrap_or_else(|_| SIGNED_URL_TTL_SECS.to_string())
                .parse()
                .unwrap_or(SIGNED_URL_TTL_SECS),
            preview_image_limit: env::var("PREVIEW_IMAGE_LIMIT")
                .unwrap_or_else(|_| PREVIEW_IMAGE_LIMIT.to_string())
                .parse()
                .unwrap_or(PREVIEW_IMAGE_LIMIT),
            default_theme,
            bypass_auth: env::var("BYPASS_AUTH")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            bypass_user_id,
        };

        config.validate()?;
        Ok(config)
    }

    /// Local-filesystem configuration with defaults for everything else.
    pub fn local(database_url: &str, storage_path: &str, base_url: &str) -> Self {
        Config {
            environment: "development".to_string(),
            database_url: database_url.to_string(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::Local,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: Some(storage_path.to_string()),
            local_storage_base_url: Some(base_url.to_string()),
            media_assets_bucket: BucketKind::MediaAssets.default_name().to_string(),
            edited_images_bucket: BucketKind::EditedImages.default_name().to_string(),
            generated_videos_bucket: BucketKind::GeneratedVideos.default_name().to_string(),
            signed_url_ttl_secs: SIGNED_URL_TTL_SECS,
            preview_image_limit: PREVIEW_IMAGE_LIMIT,
            default_theme: Theme::System,
            bypass_auth: false,
            bypass_user_id: None,
        }
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    pub fn bucket_name(&self, kind: BucketKind) -> &str {
        match kind {
            BucketKind::MediaAssets => &self.media_assets_bucket,
            BucketKind::EditedImages => &self.edited_images_bucket,
            BucketKind::GeneratedVideos => &self.generated_videos_bucket,
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.preview_image_limit < 0 {
            return Err(anyhow::anyhow!("PREVIEW_IMAGE_LIMIT cannot be negative"));
        }

        // Validate storage backend configuration
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.bypass_auth {
            if self.is_production() {
                return Err(anyhow::anyhow!(
                    "BYPASS_AUTH cannot be enabled in production"
                ));
            }
            if self.bypass_user_id.is_none() {
                return Err(anyhow::anyhow!(
                    "BYPASS_AUTH=true requires BYPASS_USER_ID to be set"
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> Config {
        Config::local(
            "postgresql://localhost/atelier",
            "/tmp/atelier",
            "http://localhost:3000/media",
        )
    }

    #[test]
    fn local_config_is_valid() {
        let config = local();
        assert!(config.validate().is_ok());
        assert_eq!(config.bucket_name(BucketKind::EditedImages), "edited-images");
        assert_eq!(config.preview_image_limit, 4);
    }

    #[test]
    fn rejects_non_postgres_url() {
        let mut config = local();
        config.database_url = "mysql://localhost/atelier".into();
        assert!(config.validate().is_err());

        config.database_url = "postgres://localhost/atelier".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn s3_requires_region() {
        let mut config = local();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.aws_region = Some("eu-west-1".into());
        assert!(config.validate().is_ok());
        assert_eq!(config.region(), Some("eu-west-1"));
    }

    #[test]
    fn bypass_rules() {
        let mut config = local();
        config.bypass_auth = true;
        assert!(config.validate().is_err());

        config.bypass_user_id = Some(Uuid::new_v4());
        assert!(config.validate().is_ok());

        config.environment = "production".into();
        assert!(config.validate().is_err());
    }
}
