//! Signed media upload client for PawPlanet.
//!
//! Uploading is a two-step protocol: the PawPlanet backend issues a
//! short-lived signature for one asset ([`MediaSigner`], implemented by
//! [`ApiClient`]), then the file goes straight to the storage provider with
//! that signature ([`MediaUploader`], implemented by [`CloudinaryUploader`]).
//! [`MediaUploadOrchestrator`] sequences both steps and publishes phase,
//! progress, error and result for the UI layer.

pub mod api;
pub mod cloudinary;
pub mod traits;
pub mod upload;

use anyhow::{Context, Result};
use pawplanet_core::MediaClientConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Authentication strategy for the PawPlanet API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `Authorization: Bearer {token}`
    Bearer(String),
    /// No credentials (e.g. when a gateway injects the session).
    Anonymous,
}

/// HTTP client for the PawPlanet backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_prefix: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, api_prefix: String, auth: Auth, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_prefix,
            auth,
        })
    }

    /// Create client from configuration. Uses Bearer auth when a token is configured.
    pub fn from_config(config: &MediaClientConfig) -> Result<Self> {
        let auth = match &config.api_token {
            Some(token) => Auth::Bearer(token.clone()),
            None => Auth::Anonymous,
        };
        Self::new(
            config.api_url.clone(),
            config.api_prefix(),
            auth,
            config.http_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a path under the versioned API prefix.
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
            Auth::Anonymous => request,
        }
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        let request = self.client.post(&url).json(body);
        let request = self.apply_auth(request);

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;

        Ok(body)
    }
}

pub use cloudinary::CloudinaryUploader;
pub use traits::{MediaSigner, MediaUploader};
pub use upload::{
    upload_media, MediaUploadOrchestrator, ProgressTicker, UploadHandlers, UploadState,
};
