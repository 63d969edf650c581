//! PawPlanet backend endpoints used by the upload flow.
//!
//! Wire types mirror the backend's snake_case JSON and are converted into the
//! domain models from `pawplanet_core::models` right after decoding.

use crate::traits::MediaSigner;
use crate::ApiClient;
use anyhow::Result;
use async_trait::async_trait;
use pawplanet_core::constants::SIGN_ENDPOINT_PATH;
use pawplanet_core::{MediaError, MediaResult, SignAuthorization, SignRequest};
use serde::Deserialize;

/// Signing endpoint response (`POST /media/sign`).
#[derive(Deserialize)]
pub struct SignMediaResponse {
    pub signature: String,
    pub timestamp: i64,
    pub api_key: String,
    pub cloud_name: String,
    pub asset_folder: String,
    #[serde(default)]
    pub public_id: Option<String>,
    pub resource_type: String,
}

impl From<SignMediaResponse> for SignAuthorization {
    fn from(wire: SignMediaResponse) -> Self {
        SignAuthorization {
            signature: wire.signature,
            timestamp: wire.timestamp,
            api_key: wire.api_key,
            cloud_name: wire.cloud_name,
            asset_folder: wire.asset_folder,
            public_id: wire.public_id,
            resource_type: wire.resource_type,
        }
    }
}

impl ApiClient {
    /// Request an upload signature for one asset.
    pub async fn sign_media_upload(&self, request: &SignRequest) -> Result<SignAuthorization> {
        let response: SignMediaResponse = self.post_json(SIGN_ENDPOINT_PATH, request).await?;
        Ok(response.into())
    }
}

#[async_trait]
impl MediaSigner for ApiClient {
    async fn sign(&self, request: &SignRequest) -> MediaResult<SignAuthorization> {
        tracing::debug!(
            context = %request.context(),
            owner_id = ?request.owner_id(),
            slug = ?request.slug(),
            "Requesting upload signature"
        );

        self.sign_media_upload(request)
            .await
            .map_err(|e| MediaError::Signing(format!("{:#}", e)))
    }
}
