//! Upload sequencing: sign, transfer, publish.

mod orchestrator;
mod progress;
mod state;

pub use orchestrator::MediaUploadOrchestrator;
pub use progress::ProgressTicker;
pub use state::{ErrorHandler, ProgressHandler, SuccessHandler, UploadHandlers, UploadState};

use crate::traits::{MediaSigner, MediaUploader};
use pawplanet_core::{MediaFile, MediaResult, SignRequest, UploadResult};

/// Sign then transfer one file, without state tracking or progress.
///
/// The uploader is never called when signing fails.
pub async fn upload_media(
    signer: &dyn MediaSigner,
    uploader: &dyn MediaUploader,
    file: &MediaFile,
    request: &SignRequest,
) -> MediaResult<UploadResult> {
    let authorization = signer.sign(request).await?;
    uploader.upload(file, &authorization).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pawplanet_core::{MediaError, SignAuthorization, UploadContext};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSigner;

    #[async_trait]
    impl MediaSigner for FailingSigner {
        async fn sign(&self, _request: &SignRequest) -> MediaResult<SignAuthorization> {
            Err(MediaError::Signing("backend unavailable".to_string()))
        }
    }

    #[derive(Default)]
    struct CountingUploader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MediaUploader for CountingUploader {
        async fn upload(
            &self,
            _file: &MediaFile,
            _authorization: &SignAuthorization,
        ) -> MediaResult<UploadResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MediaError::Transfer("unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn signing_failure_short_circuits() {
        let uploader = CountingUploader::default();
        let file = MediaFile::new("a.jpg", "image/jpeg", vec![1u8; 4]);
        let request = SignRequest::new(UploadContext::UserAvatar, 1_i64).unwrap();

        let err = upload_media(&FailingSigner, &uploader, &file, &request)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Signing(_)));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }
}
