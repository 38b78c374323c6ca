//! Object storage for uploaded verification files

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::error::{ApiError, ApiResult};

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `bucket/path`, replacing any existing object
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> ApiResult<()>;
}

/// Writes objects below a root directory, one sub-directory per bucket
pub struct LocalObjectStorage {
    root: PathBuf,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> ApiResult<()> {
        let target = self.root.join(bucket).join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::debug!(bucket = %bucket, path = %path, "Stored object on local disk");
        Ok(())
    }
}

/// Bucket API reached over HTTP (`POST {base_url}/{bucket}/{path}`)
pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpObjectStorage {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Each path segment is percent-encoded on its own
    fn object_url(&self, bucket: &str, path: &str) -> ApiResult<reqwest::Url> {
        let invalid = || {
            ApiError::ExternalServiceError(format!(
                "Invalid object storage URL: {}",
                self.base_url
            ))
        };

        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(bucket)
            .extend(path.split('/'));
        Ok(url)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> ApiResult<()> {
        let mut request = self
            .client
            .post(self.object_url(bucket, path)?)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::ExternalServiceError(format!(
                "Object upload to {}/{} failed with {}: {}",
                bucket, path, status, body
            )));
        }

        tracing::debug!(bucket = %bucket, path = %path, "Uploaded object");
        Ok(())
    }
}

/// Keeps objects in a map; used by tests
#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&format!("{}/{}", bucket, path))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> ApiResult<()> {
        self.objects
            .write()
            .await
            .insert(format!("{}/{}", bucket, path), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_upload_overwrites() {
        let storage = InMemoryObjectStorage::new();
        storage.upload("docs", "a/b.pdf", vec![1]).await.unwrap();
        storage.upload("docs", "a/b.pdf", vec![2]).await.unwrap();

        assert_eq!(storage.get("docs", "a/b.pdf").await, Some(vec![2]));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_local_upload_creates_folders() {
        let root = std::env::temp_dir().join(format!("skillswap-{}", uuid::Uuid::new_v4()));
        let storage = LocalObjectStorage::new(&root);

        storage
            .upload("verification-documents", "user/skill/diploma.pdf", b"pdf".to_vec())
            .await
            .unwrap();

        let written = tokio::fs::read(root.join("verification-documents/user/skill/diploma.pdf"))
            .await
            .unwrap();
        assert_eq!(written, b"pdf");

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[test]
    fn test_http_object_url() {
        let storage = HttpObjectStorage::new("https://storage.local/object/".to_string(), None);
        assert_eq!(
            storage
                .object_url("verification-documents", "u/passport.pdf")
                .unwrap()
                .as_str(),
            "https://storage.local/object/verification-documents/u/passport.pdf"
        );
    }

    #[test]
    fn test_http_object_url_encodes_segments() {
        let storage = HttpObjectStorage::new("https://storage.local/object".to_string(), None);
        let url = storage
            .object_url("verification-documents", "u/scan #1?v=100%.pdf")
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://storage.local/object/verification-documents/u/scan%20%231%3Fv=100%25.pdf"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_http_object_url_rejects_bad_base() {
        let storage = HttpObjectStorage::new("not a url".to_string(), None);
        let err = storage.object_url("docs", "a.pdf").unwrap_err();
        assert!(matches!(err, ApiError::ExternalServiceError(_)));
    }
}
