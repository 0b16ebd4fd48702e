#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{BucketKind, Buckets, Storage, StorageBackend, StorageError, StorageResult};
use atelier_core::Config;
use std::sync::Arc;

/// Create the storage backend for one bucket based on configuration
pub async fn create_storage(config: &Config, kind: BucketKind) -> StorageResult<Arc<dyn Storage>> {
    let bucket = config.bucket_name(kind).to_string();

    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let region = config.region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint.clone();

            let storage = S3Storage::new(bucket, region, endpoint)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let root = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;

            let storage = LocalStorage::new(root, base_url, bucket).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

/// Create all three buckets from configuration
pub async fn create_buckets(config: &Config) -> StorageResult<Buckets> {
    let buckets = Buckets::new(
        create_storage(config, BucketKind::MediaAssets).await?,
        create_storage(config, BucketKind::EditedImages).await?,
        create_storage(config, BucketKind::GeneratedVideos).await?,
    );

    tracing::info!(
        backend = %config.storage_backend,
        media_assets = %buckets.media_assets.bucket(),
        edited_images = %buckets.edited_images.bucket(),
        generated_videos = %buckets.generated_videos.bucket(),
        "Storage buckets ready"
    );

    Ok(buckets)
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_local_buckets_from_config() {
        let dir = tempdir().unwrap();
        let mut config = Config::local(
            "postgresql://localhost/atelier",
            dir.path().to_str().unwrap(),
            "http://localhost:3000/storage",
        );
        config.generated_videos_bucket = "videos".into();

        let buckets = create_buckets(&config).await.unwrap();

        assert_eq!(buckets.get(BucketKind::MediaAssets).bucket(), "media-assets");
        assert_eq!(buckets.get(BucketKind::GeneratedVideos).bucket(), "videos");
        assert_eq!(buckets.edited_images.backend_type(), StorageBackend::Local);
        assert!(dir.path().join("edited-images").is_dir());
    }

    #[tokio::test]
    async fn missing_local_path_is_config_error() {
        let mut config = Config::local(
            "postgresql://localhost/atelier",
            "/tmp/unused",
            "http://localhost:3000/storage",
        );
        config.local_storage_path = None;

        let result = create_storage(&config, BucketKind::MediaAssets).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }
}
