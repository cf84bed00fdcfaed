//! File upload trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Response of the upload service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(rename = "originalname", default)]
    pub original_name: String,
    #[serde(default)]
    pub filename: String,
    /// Public URL of the stored file.
    pub location: String,
}

/// Uploads binary payloads and returns where they were stored.
///
/// Content is not inspected; validating images is the service's job.
#[async_trait]
pub trait FileUploader: Send + Sync {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile>;
}
