//! Writes uploaded files to the public disk under a directory per media type.

use bytes::Bytes;
use cinetheque_core::models::MediaType;
use cinetheque_storage::{Storage, StorageResult};
use std::sync::Arc;
use uuid::Uuid;

/// File received in a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Extension for the stored file: the client's when it looks sane, else one
    /// derived from the content type.
    fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| {
                !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            });

        if let Some(ext) = from_name {
            return ext;
        }

        match self.content_type.as_deref() {
            Some("image/jpeg") => "jpg",
            Some("image/png") => "png",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            Some("video/mp4") => "mp4",
            Some("application/pdf") => "pdf",
            _ => "bin",
        }
        .to_string()
    }
}

/// Location of a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage key relative to the public disk
    pub path: String,
    pub url: String,
}

#[derive(Clone)]
pub struct MediaUploader {
    storage: Arc<dyn Storage>,
}

impl MediaUploader {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Store `file` as `<media_type>/<uuid>.<ext>`.
    ///
    /// Returns `Ok(None)` when there is nothing to store. When `current_path` is
    /// given that file is removed first; failing to remove it is only logged.
    #[tracing::instrument(skip(self, file))]
    pub async fn upload(
        &self,
        file: Option<UploadedFile>,
        media_type: MediaType,
        current_path: Option<&str>,
    ) -> StorageResult<Option<StoredFile>> {
        let Some(file) = file.filter(|f| !f.is_empty()) else {
            return Ok(None);
        };

        if let Some(current) = current_path.filter(|p| !p.is_empty()) {
            if let Err(e) = self.storage.delete(current).await {
                tracing::warn!(error = %e, path = %current, "Failed to delete replaced media file");
            }
        }

        let key = format!("{}/{}.{}", media_type.as_str(), Uuid::new_v4(), file.extension());
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let url = self
            .storage
            .upload_with_key(&key, file.data.to_vec(), content_type)
            .await?;

        Ok(Some(StoredFile { path: key, url }))
    }

    /// Remove a file written by a request whose transaction did not commit.
    pub async fn discard(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            tracing::warn!(error = %e, path = %path, "Failed to discard uploaded media file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cinetheque_storage::{LocalStorage, StorageError};
    use tempfile::tempdir;

    fn jpeg(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_string()),
            content_type: Some("image/jpeg".to_string()),
            data: Bytes::from_static(b"\xff\xd8\xff poster"),
        }
    }

    async fn uploader(dir: &std::path::Path) -> MediaUploader {
        let storage = LocalStorage::new(dir, "http://localhost:4000/storage")
            .await
            .unwrap();
        MediaUploader::new(Arc::new(storage))
    }

    #[tokio::test]
    async fn missing_or_empty_file_stores_nothing() {
        let dir = tempdir().unwrap();
        let uploader = uploader(dir.path()).await;

        assert_eq!(uploader.upload(None, MediaType::Poster, None).await.unwrap(), None);

        let empty = UploadedFile {
            file_name: Some("empty.jpg".to_string()),
            content_type: None,
            data: Bytes::new(),
        };
        assert_eq!(
            uploader.upload(Some(empty), MediaType::Poster, None).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn stores_under_media_type_directory() {
        let dir = tempdir().unwrap();
        let uploader = uploader(dir.path()).await;

        let stored = uploader
            .upload(Some(jpeg("Dune.JPG")), MediaType::Poster, None)
            .await
            .unwrap()
            .unwrap();

        assert!(stored.path.starts_with("poster/"));
        assert!(stored.path.ends_with(".jpg"));
        assert_eq!(
            stored.url,
            format!("http://localhost:4000/storage/{}", stored.path)
        );
        assert!(dir.path().join(&stored.path).exists());
    }

    #[tokio::test]
    async fn replacing_deletes_current_file() {
        let dir = tempdir().unwrap();
        let uploader = uploader(dir.path()).await;

        let first = uploader
            .upload(Some(jpeg("a.jpg")), MediaType::Poster, None)
            .await
            .unwrap()
            .unwrap();
        let second = uploader
            .upload(Some(jpeg("b.jpg")), MediaType::Poster, Some(&first.path))
            .await
            .unwrap()
            .unwrap();

        assert!(!dir.path().join(&first.path).exists());
        assert!(dir.path().join(&second.path).exists());
    }

    #[tokio::test]
    async fn missing_current_file_does_not_block_upload() {
        let dir = tempdir().unwrap();
        let uploader = uploader(dir.path()).await;

        let stored = uploader
            .upload(Some(jpeg("a.jpg")), MediaType::Poster, Some("poster/gone.jpg"))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn discard_removes_file() {
        let dir = tempdir().unwrap();
        let uploader = uploader(dir.path()).await;

        let stored = uploader
            .upload(Some(jpeg("a.jpg")), MediaType::Image, None)
            .await
            .unwrap()
            .unwrap();
        uploader.discard(&stored.path).await;

        assert!(!dir.path().join(&stored.path).exists());
    }

    #[test]
    fn extension_falls_back_to_content_type() {
        let mut file = jpeg("no-extension");
        assert_eq!(file.extension(), "jpg");

        file.file_name = Some("../../evil.sh;rm".to_string());
        file.content_type = Some("image/png".to_string());
        assert_eq!(file.extension(), "png");

        file.file_name = None;
        file.content_type = None;
        assert_eq!(file.extension(), "bin");
    }

    struct FailingStorage;

    #[async_trait]
    impl Storage for FailingStorage {
        async fn upload_with_key(&self, _: &str, _: Vec<u8>, _: &str) -> StorageResult<String> {
            Err(StorageError::UploadFailed("disk full".to_string()))
        }

        async fn delete(&self, _: &str) -> StorageResult<()> {
            Err(StorageError::DeleteFailed("read-only".to_string()))
        }

        fn public_url(&self, key: &str) -> String {
            key.to_string()
        }
    }

    #[tokio::test]
    async fn storage_failure_is_an_error_not_none() {
        let uploader = MediaUploader::new(Arc::new(FailingStorage));

        let result = uploader
            .upload(Some(jpeg("a.jpg")), MediaType::Poster, Some("poster/old.jpg"))
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }
}
