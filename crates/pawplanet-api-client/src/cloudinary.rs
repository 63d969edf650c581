//! Direct upload to Cloudinary with a backend-issued signature.
//!
//! The signature is the only credential on the request. The destination is
//! `{base_url}/{cloud_name}/{resource_type}/upload`; `base_url` is fixed when
//! the uploader is built and both path segments are checked before use, so a
//! signed credential cannot be redirected elsewhere.

use crate::traits::MediaUploader;
use async_trait::async_trait;
use pawplanet_core::constants::{ALLOWED_RESOURCE_TYPES, DEFAULT_UPLOAD_BASE_URL};
use pawplanet_core::{MediaClientConfig, MediaError, MediaFile, MediaResult, SignAuthorization, UploadResult};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use std::time::Duration;

/// Provider upload response.
#[derive(Deserialize)]
pub struct CloudinaryUploadResponse {
    pub public_id: String,
    pub version: u64,
    pub signature: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub format: String,
    pub resource_type: String,
    pub created_at: String,
    pub bytes: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub secure_url: String,
}

impl From<CloudinaryUploadResponse> for UploadResult {
    fn from(wire: CloudinaryUploadResponse) -> Self {
        UploadResult {
            public_id: wire.public_id,
            version: wire.version,
            signature: wire.signature,
            width: wire.width,
            height: wire.height,
            format: wire.format,
            resource_type: wire.resource_type,
            created_at: wire.created_at,
            bytes: wire.bytes,
            kind: wire.kind,
            url: wire.url,
            secure_url: wire.secure_url,
        }
    }
}

#[derive(Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorDetail,
}

#[derive(Deserialize)]
struct CloudinaryErrorDetail {
    message: String,
}

/// Uploads files straight to Cloudinary.
#[derive(Clone, Debug)]
pub struct CloudinaryUploader {
    client: Client,
    base_url: String,
}

impl CloudinaryUploader {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        let base_url: String = base_url.into();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &MediaClientConfig) -> anyhow::Result<Self> {
        Self::new(config.upload_base_url.clone(), config.http_timeout())
    }

    /// Uploader for the public Cloudinary API.
    pub fn public(timeout: Duration) -> anyhow::Result<Self> {
        Self::new(DEFAULT_UPLOAD_BASE_URL, timeout)
    }

    /// Destination for an authorization.
    pub fn upload_url(&self, authorization: &SignAuthorization) -> MediaResult<String> {
        let cloud_name = authorization.cloud_name.as_str();
        if cloud_name.is_empty()
            || !cloud_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(MediaError::Transfer(format!(
                "Invalid cloud name in authorization: '{}'",
                cloud_name
            )));
        }

        let resource_type = authorization.resource_type.as_str();
        if !ALLOWED_RESOURCE_TYPES.contains(&resource_type) {
            return Err(MediaError::Transfer(format!(
                "Invalid resource type in authorization: '{}'. Allowed: {}",
                resource_type,
                ALLOWED_RESOURCE_TYPES.join(", ")
            )));
        }

        Ok(format!(
            "{}/{}/{}/upload",
            self.base_url, cloud_name, resource_type
        ))
    }

    fn build_form(file: &MediaFile, authorization: &SignAuthorization) -> MediaResult<Form> {
        let file_part = Part::stream_with_length(Body::from(file.data.clone()), file.len())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| {
                MediaError::InvalidFile(format!(
                    "Invalid content type '{}': {}",
                    file.content_type, e
                ))
            })?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("signature", authorization.signature.clone())
            .text("timestamp", authorization.timestamp.to_string())
            .text("api_key", authorization.api_key.clone())
            .text("folder", authorization.asset_folder.clone());

        if let Some(public_id) = &authorization.public_id {
            form = form.text("public_id", public_id.clone());
        }

        Ok(form)
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(
        &self,
        file: &MediaFile,
        authorization: &SignAuthorization,
    ) -> MediaResult<UploadResult> {
        let url = self.upload_url(authorization)?;
        let form = Self::build_form(file, authorization)?;

        tracing::debug!(
            cloud_name = %authorization.cloud_name,
            resource_type = %authorization.resource_type,
            folder = %authorization.asset_folder,
            file_size = file.len(),
            "Uploading file to storage provider"
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Transfer(format!("Failed to send upload request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown status");
            let detail = response
                .json::<CloudinaryErrorBody>()
                .await
                .ok()
                .map(|body| body.error.message);
            return Err(MediaError::Transfer(match detail {
                Some(message) => format!("{} {}: {}", status.as_u16(), status_text, message),
                None => format!("{} {}", status.as_u16(), status_text),
            }));
        }

        let body: CloudinaryUploadResponse = response.json().await.map_err(|e| {
            MediaError::Transfer(format!("Failed to parse upload response: {}", e))
        })?;

        Ok(body.into())
    }
}
