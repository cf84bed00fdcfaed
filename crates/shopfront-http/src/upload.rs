//! HTTP-backed file upload.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use shopfront_core::error::{Error, StorageError};
use shopfront_core::traits::FileUploader;
use shopfront_core::{ApiUrl, Result, UploadedFile};

use crate::client::{ApiClient, map_reqwest};
use crate::endpoints::{Endpoints, UPLOAD_FIELD};

/// Guess a content type from a file extension.
///
/// Only common image types are recognized; anything else is sent as
/// `application/octet-stream` and left for the service to judge.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Uploads files to the API's multipart upload endpoint.
#[derive(Debug, Clone)]
pub struct HttpFileUploader {
    client: ApiClient,
    path: String,
}

impl HttpFileUploader {
    pub fn new(base: ApiUrl) -> Result<Self> {
        Ok(Self::with_client(ApiClient::new(base)?, &Endpoints::default()))
    }

    pub fn with_client(client: ApiClient, endpoints: &Endpoints) -> Self {
        Self {
            client,
            path: endpoints.upload.clone(),
        }
    }

    /// Read a local file and upload it.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn upload_path(&self, path: &Path) -> Result<UploadedFile> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            Error::Storage(StorageError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");

        self.upload(file_name, content_type_for(path), bytes).await
    }
}

#[async_trait]
impl FileUploader for HttpFileUploader {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile> {
        debug!("Uploading file");

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(map_reqwest)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let uploaded: UploadedFile = self.client.post_multipart(&self.path, form).await?;
        debug!(location = %uploaded.location, "File stored");
        Ok(uploaded)
    }
}
