use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage for one bucket
///
/// Objects live under `{root}/{bucket}/{path}` and are served from
/// `{base_url}/{bucket}/{path}`.
#[derive(Clone)]
pub struct LocalStorage {
    bucket: String,
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `root` - Root directory for all buckets (e.g., "/var/lib/atelier/storage")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/storage")
    /// * `bucket` - Bucket name, used as a subdirectory and URL segment
    pub async fn new(
        root: impl Into<PathBuf>,
        base_url: impl Into<String>,
        bucket: impl Into<String>,
    ) -> StorageResult<Self> {
        let bucket = bucket.into();
        let base_path = root.into().join(&bucket);

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            bucket,
            base_path,
            base_url: base_url.into(),
        })
    }

    /// Convert an object path to a filesystem path, rejecting anything that
    /// could escape the bucket directory.
    fn key_to_path(&self, path: &str) -> StorageResult<PathBuf> {
        if path.is_empty() || path.contains("..") || path.starts_with('/') || path.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "Storage path contains invalid characters: {}",
                path
            )));
        }

        let full = self.base_path.join(path);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = full.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage path resolves outside storage directory".to_string(),
                ));
            }
        } else if full.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage path resolves outside storage directory".to_string(),
            ));
        }

        Ok(full)
    }

    fn generate_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            path
        )
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        path: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<String> {
        let file_path = self.key_to_path(path)?;
        let size = data.len();

        self.ensure_parent_dir(&file_path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&file_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(path.to_string())
    }

    async fn download(&self, path: &str) -> StorageResult<Vec<u8>> {
        let file_path = self.key_to_path(path)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&file_path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(path.to_string()));
        }

        let data = fs::read(&file_path).await.map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to read file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %path,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn delete(&self, paths: &[String]) -> StorageResult<()> {
        // Validate the whole batch before touching the filesystem
        let file_paths = paths
            .iter()
            .map(|p| self.key_to_path(p))
            .collect::<StorageResult<Vec<_>>>()?;
        let start = std::time::Instant::now();

        for file_path in &file_paths {
            if !fs::try_exists(file_path).await.unwrap_or(false) {
                continue;
            }
            fs::remove_file(file_path).await.map_err(|e| {
                StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    file_path.display(),
                    e
                ))
            })?;
        }

        tracing::info!(
            bucket = %self.bucket,
            count = paths.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.generate_url(path)
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> StorageResult<String> {
        self.key_to_path(path)?;
        let expires_at = chrono::Utc::now().timestamp() + expires_in.as_secs() as i64;
        Ok(format!("{}?expires={}", self.generate_url(path), expires_at))
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let file_path = self.key_to_path(path)?;
        Ok(fs::try_exists(&file_path).await.unwrap_or(false))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
