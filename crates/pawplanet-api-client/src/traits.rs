//! Seams of the upload flow
//!
//! The orchestrator only talks to these traits, so the backend and the
//! storage provider can be swapped (or spied on in tests) independently.

use async_trait::async_trait;
use pawplanet_core::{MediaFile, MediaResult, SignAuthorization, SignRequest, UploadResult};

/// Obtains a signed upload authorization from a trusted backend.
///
/// Implementations are stateless and never retry: any failure is reported
/// as `MediaError::Signing` and the caller decides what to do next.
#[async_trait]
pub trait MediaSigner: Send + Sync {
    async fn sign(&self, request: &SignRequest) -> MediaResult<SignAuthorization>;
}

/// Transfers one file to the storage provider named by an authorization.
///
/// The destination is derived from the authorization and the uploader's own
/// fixed base URL; callers can never choose it. Failures are reported as
/// `MediaError::Transfer` and no partial result is returned.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(
        &self,
        file: &MediaFile,
        authorization: &SignAuthorization,
    ) -> MediaResult<UploadResult>;
}
