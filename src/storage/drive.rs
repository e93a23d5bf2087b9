//! Authenticated Drive storage provider
//!
//! Three-step protocol: multipart upload with a JSON metadata part,
//! then an "anyone with the link can read" permission on the created
//! file, then a canonical view URL synthesized from the file id.
//! Requires a pre-provisioned service credential; the provider stays
//! out of the chain when none is configured.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::core::config;
use crate::storage::{StoredFile, UploadError, Uploader};

const PROVIDER: &str = "drive";

const VIEW_URL_BASE: &str = "https://drive.google.com/file/d";

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

pub struct DriveUploader {
    client: Client,
    api_base: String,
    upload_base: String,
    token: String,
}

impl DriveUploader {
    /// Builds the provider from the environment; None without a token.
    pub fn from_config(client: Client) -> Option<Self> {
        let token = config::upload::DRIVE_API_TOKEN.clone()?;
        Some(Self::with_bases(
            client,
            config::upload::DRIVE_API_BASE.clone(),
            config::upload::DRIVE_UPLOAD_BASE.clone(),
            token,
        ))
    }

    pub fn with_bases(client: Client, api_base: String, upload_base: String, token: String) -> Self {
        Self {
            client,
            api_base,
            upload_base,
            token,
        }
    }

    fn view_url(file_id: &str) -> String {
        format!("{}/{}/view?usp=sharing", VIEW_URL_BASE, file_id)
    }

    /// Step 1: multipart upload, returns the created file id.
    async fn push_file(&self, path: &Path) -> Result<String, UploadError> {
        let size = tokio::fs::metadata(path).await?.len();
        let file = tokio::fs::File::open(path).await?;
        let stream = FramedRead::new(file, BytesCodec::new());
        let body = reqwest::Body::wrap_stream(stream);

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let metadata = json!({ "name": file_name }).to_string();

        let metadata_part = Part::text(metadata)
            .mime_str("application/json")
            .map_err(|e| UploadError::Http {
                provider: PROVIDER,
                source: e,
            })?;
        let file_part = Part::stream_with_length(body, size).file_name(file_name);
        let form = Form::new().part("metadata", metadata_part).part("file", file_part);

        let response = self
            .client
            .post(format!("{}/files?uploadType=multipart", self.upload_base))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Http {
                provider: PROVIDER,
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(UploadError::Rejected {
                provider: PROVIDER,
                reason: format!("upload returned HTTP {}", response.status()),
            });
        }

        let created: CreatedFile = response.json().await.map_err(|e| UploadError::BadResponse {
            provider: PROVIDER,
            reason: format!("upload response is not valid JSON: {}", e),
        })?;

        Ok(created.id)
    }

    /// Step 2: open the file to anyone with the link.
    async fn share_publicly(&self, file_id: &str) -> Result<(), UploadError> {
        let response = self
            .client
            .post(format!("{}/files/{}/permissions", self.api_base, file_id))
            .bearer_auth(&self.token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| UploadError::Http {
                provider: PROVIDER,
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(UploadError::Rejected {
                provider: PROVIDER,
                reason: format!("permission call returned HTTP {}", response.status()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Uploader for DriveUploader {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn upload(&self, path: &Path) -> Result<StoredFile, UploadError> {
        let file_id = self.push_file(path).await?;
        log::info!("☁️ drive accepted {} as file {}", path.display(), file_id);

        self.share_publicly(&file_id).await?;
        let url = Self::view_url(&file_id);
        log::info!("✅ drive upload done: {}", url);

        Ok(StoredFile {
            provider: PROVIDER,
            url,
        })
    }
}
