use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::future::try_join_all;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{ObjectStoreExt, PutPayload};
use std::time::Duration;

/// S3-compatible storage for one bucket
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    ///
    /// Credentials come from the standard `AWS_*` environment variables.
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(endpoint.starts_with("http://"))
                .with_virtual_hosted_style_request(false);
        }

        let store = builder.build().map_err(|e| {
            StorageError::ConfigError(format!("Failed to build S3 object store: {}", e))
        })?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    fn location(path: &str) -> StorageResult<Path> {
        if path.is_empty() || path.contains("..") || path.starts_with('/') {
            return Err(StorageError::InvalidKey(format!(
                "Storage path contains invalid characters: {}",
                path
            )));
        }
        Path::parse(path).map_err(|e| StorageError::InvalidKey(e.to_string()))
    }
}

#[async_trait]
impl Storage for S3Storage {
    #[tracing::instrument(skip(self, data), fields(
        s3.bucket = %self.bucket,
        s3.key = %path,
        s3.size = data.len()
    ))]
    async fn upload(&self, path: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String> {
        let location = Self::location(path)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let result = self.store.put(&location, PutPayload::from(data)).await;
        let duration = start.elapsed().as_secs_f64();

        match result {
            Ok(_) => {
                tracing::info!(
                    content_type = %content_type,
                    size_bytes = size,
                    duration_ms = duration * 1000.0,
                    "S3 upload successful"
                );
                Ok(path.to_string())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    size_bytes = size,
                    duration_ms = duration * 1000.0,
                    "S3 upload failed"
                );
                Err(StorageError::UploadFailed(e.to_string()))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(s3.bucket = %self.bucket, s3.key = %path))]
    async fn download(&self, path: &str) -> StorageResult<Vec<u8>> {
        let location = Self::location(path)?;
        let start = std::time::Instant::now();

        let response = match self.store.get(&location).await {
            Ok(response) => response,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                return Err(StorageError::DownloadFailed(e.to_string()));
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    #[tracing::instrument(skip(self, paths), fields(s3.bucket = %self.bucket, count = paths.len()))]
    async fn delete(&self, paths: &[String]) -> StorageResult<()> {
        let locations = paths
            .iter()
            .map(|p| Self::location(p))
            .collect::<StorageResult<Vec<_>>>()?;
        let start = std::time::Instant::now();

        let result = try_join_all(locations.iter().map(|location| async move {
            match self.store.delete(location).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
                Err(e) => Err(e),
            }
        }))
        .await;

        let duration = start.elapsed().as_secs_f64();

        match result {
            Ok(_) => {
                tracing::info!(duration_ms = duration * 1000.0, "S3 delete successful");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = duration * 1000.0,
                    "S3 delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    fn public_url(&self, path: &str) -> String {
        match self.endpoint_url {
            Some(ref endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket,
                path
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, path
            ),
        }
    }

    #[tracing::instrument(skip(self), fields(s3.bucket = %self.bucket, s3.key = %path))]
    async fn signed_url(&self, path: &str, expires_in: Duration) -> StorageResult<String> {
        let location = Self::location(path)?;
        let url = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| {
                StorageError::BackendError(format!("Failed to generate presigned URL: {}", e))
            })?;

        tracing::info!(
            expires_in_seconds = expires_in.as_secs(),
            "Generated presigned GET URL"
        );

        Ok(url.to_string())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let location = Self::location(path)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_uses_custom_endpoint() {
        let storage = S3Storage::new(
            "edited-images".into(),
            "us-east-1".into(),
            Some("http://localhost:9000/".into()),
        )
        .unwrap();
        assert_eq!(
            storage.public_url("u/p/a.png"),
            "http://localhost:9000/edited-images/u/p/a.png"
        );
        assert_eq!(storage.backend_type(), StorageBackend::S3);
    }

    #[test]
    fn public_url_defaults_to_aws_host() {
        let storage =
            S3Storage::new("media-assets".into(), "eu-west-1".into(), None).unwrap();
        assert_eq!(
            storage.public_url("u/p/a.png"),
            "https://media-assets.s3.eu-west-1.amazonaws.com/u/p/a.png"
        );
    }

    #[test]
    fn rejects_traversal_paths() {
        assert!(matches!(
            S3Storage::location("../secret"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(S3Storage::location("u/p/a.png").is_ok());
    }
}
