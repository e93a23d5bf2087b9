//! Anonymous file host provider (gofile.io protocol)
//!
//! Two-step protocol: ask the API which upload server to use, then
//! stream the file to that server as multipart form data. The response
//! carries a download-page URL that is handed to the user as-is.
//! No credential is required.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::core::config;
use crate::storage::{StoredFile, UploadError, Uploader};

const PROVIDER: &str = "gofile";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ServerAssignment {
    server: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadReceipt {
    download_page: String,
}

pub struct GofileUploader {
    client: Client,
    api_base: String,
    /// When set, uploads go here instead of the assigned server host.
    /// Used to point the provider at a test server.
    upload_base: Option<String>,
}

impl GofileUploader {
    pub fn new(client: Client) -> Self {
        Self::with_bases(
            client,
            config::upload::GOFILE_API_BASE.clone(),
            config::upload::GOFILE_UPLOAD_BASE.clone(),
        )
    }

    pub fn with_bases(client: Client, api_base: String, upload_base: Option<String>) -> Self {
        Self {
            client,
            api_base,
            upload_base,
        }
    }

    fn upload_url(&self, server: &str) -> String {
        match &self.upload_base {
            Some(base) => format!("{}/uploadFile", base),
            None => format!("https://{}.gofile.io/uploadFile", server),
        }
    }

    /// Step 1: which server takes the upload.
    async fn assign_server(&self) -> Result<String, UploadError> {
        let response = self
            .client
            .get(format!("{}/getServer", self.api_base))
            .send()
            .await
            .map_err(|e| UploadError::Http {
                provider: PROVIDER,
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(UploadError::Rejected {
                provider: PROVIDER,
                reason: format!("server assignment returned HTTP {}", response.status()),
            });
        }

        let envelope: Envelope<ServerAssignment> = response.json().await.map_err(|e| UploadError::BadResponse {
            provider: PROVIDER,
            reason: format!("server assignment is not valid JSON: {}", e),
        })?;

        if envelope.status != "ok" {
            return Err(UploadError::Rejected {
                provider: PROVIDER,
                reason: format!("server assignment status: {}", envelope.status),
            });
        }

        envelope
            .data
            .map(|assignment| assignment.server)
            .ok_or_else(|| UploadError::BadResponse {
                provider: PROVIDER,
                reason: "server assignment carries no data".to_string(),
            })
    }

    /// Step 2: stream the file to the assigned server.
    async fn push_file(&self, server: &str, path: &Path) -> Result<String, UploadError> {
        let size = tokio::fs::metadata(path).await?.len();
        let file = tokio::fs::File::open(path).await?;
        let stream = FramedRead::new(file, BytesCodec::new());
        let body = reqwest::Body::wrap_stream(stream);

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let part = Part::stream_with_length(body, size).file_name(file_name);
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.upload_url(server))
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

        let envelope: Envelope<UploadReceipt> = response.json().await.map_err(|e| UploadError::BadResponse {
            provider: PROVIDER,
            reason: format!("upload receipt is not valid JSON: {}", e),
        })?;

        if envelope.status != "ok" {
            return Err(UploadError::Rejected {
                provider: PROVIDER,
                reason: format!("upload status: {}", envelope.status),
            });
        }

        envelope
            .data
            .map(|receipt| receipt.download_page)
            .ok_or_else(|| UploadError::BadResponse {
                provider: PROVIDER,
                reason: "upload receipt carries no download page".to_string(),
            })
    }
}

#[async_trait]
impl Uploader for GofileUploader {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn upload(&self, path: &Path) -> Result<StoredFile, UploadError> {
        let server = self.assign_server().await?;
        log::info!("☁️ gofile assigned server '{}' for {}", server, path.display());

        let url = self.push_file(&server, path).await?;
        log::info!("✅ gofile upload done: {}", url);

        Ok(StoredFile {
            provider: PROVIDER,
            url,
        })
    }
}
