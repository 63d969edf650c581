use crate::cloudinary::CloudinaryUploader;
use crate::traits::{MediaSigner, MediaUploader};
use crate::upload::progress::ProgressTicker;
use crate::upload::state::{UploadHandlers, UploadState};
use crate::ApiClient;
use chrono::Utc;
use pawplanet_core::{
    validate_media_file, LogLevel, MediaClientConfig, MediaError, MediaFile, MediaResult,
    MediaTarget, SignRequest, UploadContext, UploadPhase, UploadProgress, UploadResult,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Bookkeeping for the attempt currently allowed to touch the observable state.
#[derive(Default)]
struct ActiveAttempt {
    generation: u64,
    token: Option<CancellationToken>,
}

/// State shared between the orchestrator and its progress ticker.
struct Shared {
    state: watch::Sender<UploadState>,
    active: Mutex<ActiveAttempt>,
    handlers: UploadHandlers,
}

impl Shared {
    fn active(&self) -> MutexGuard<'_, ActiveAttempt> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply `update` only if `generation` is still the current attempt.
    fn update_if_current(&self, generation: u64, update: impl FnOnce(&mut UploadState)) -> bool {
        let active = self.active();
        if active.generation != generation {
            return false;
        }
        self.state.send_modify(update);
        true
    }

    fn publish_progress(&self, generation: u64, progress: UploadProgress) -> bool {
        let applied = self.update_if_current(generation, |state| {
            if state.phase == UploadPhase::Transferring {
                state.progress = Some(progress);
            }
        });
        if applied {
            if let Some(on_progress) = &self.handlers.on_progress {
                on_progress(&progress);
            }
        }
        applied
    }

    /// Release the attempt's token if it is still the current one.
    fn release(&self, generation: u64) {
        let mut active = self.active();
        if active.generation == generation {
            active.token = None;
        }
    }
}

/// One invocation of the upload sequence.
struct Attempt {
    id: Uuid,
    generation: u64,
    token: CancellationToken,
}

/// Sequences signing and transfer for one upload at a time and publishes
/// phase, progress, error and result.
///
/// Phases go `Idle -> Signing -> Transferring -> Succeeded | Failed`. Each
/// call to [`upload`](Self::upload) starts a fresh attempt; starting one while
/// another is in flight cancels the older attempt, whose caller receives
/// `MediaError::Cancelled` and whose late responses are discarded.
/// [`reset`](Self::reset) returns to `Idle` from any phase.
pub struct MediaUploadOrchestrator {
    signer: Arc<dyn MediaSigner>,
    uploader: Arc<dyn MediaUploader>,
    config: MediaClientConfig,
    shared: Arc<Shared>,
}

impl MediaUploadOrchestrator {
    pub fn new(
        signer: Arc<dyn MediaSigner>,
        uploader: Arc<dyn MediaUploader>,
        config: MediaClientConfig,
    ) -> Self {
        Self::with_handlers(signer, uploader, config, UploadHandlers::default())
    }

    pub fn with_handlers(
        signer: Arc<dyn MediaSigner>,
        uploader: Arc<dyn MediaUploader>,
        config: MediaClientConfig,
        handlers: UploadHandlers,
    ) -> Self {
        let (state, _) = watch::channel(UploadState::default());
        Self {
            signer,
            uploader,
            config,
            shared: Arc::new(Shared {
                state,
                active: Mutex::new(ActiveAttempt::default()),
                handlers,
            }),
        }
    }

    /// Orchestrator wired to the PawPlanet backend and Cloudinary.
    pub fn from_config(config: MediaClientConfig, handlers: UploadHandlers) -> anyhow::Result<Self> {
        let signer = ApiClient::from_config(&config)?;
        let uploader = CloudinaryUploader::from_config(&config)?;
        Ok(Self::with_handlers(
            Arc::new(signer),
            Arc::new(uploader),
            config,
            handlers,
        ))
    }

    /// Current snapshot.
    pub fn state(&self) -> UploadState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.shared.state.subscribe()
    }

    pub fn phase(&self) -> UploadPhase {
        self.shared.state.borrow().phase
    }

    pub fn is_uploading(&self) -> bool {
        self.shared.state.borrow().is_uploading()
    }

    pub fn progress(&self) -> Option<UploadProgress> {
        self.shared.state.borrow().progress
    }

    pub fn error(&self) -> Option<MediaError> {
        self.shared.state.borrow().error.clone()
    }

    pub fn result(&self) -> Option<UploadResult> {
        self.shared.state.borrow().result.clone()
    }

    /// Clear progress, error and result and return to `Idle`.
    ///
    /// An attempt in flight is cancelled; its response, if any, is discarded.
    pub fn reset(&self) {
        let mut active = self.shared.active();
        if let Some(token) = active.token.take() {
            token.cancel();
            tracing::debug!("Upload reset while an attempt was in flight");
        }
        active.generation += 1;
        self.shared.state.send_replace(UploadState::default());
    }

    /// Sign and upload `file` for `context`, identified by `target`.
    ///
    /// The outcome is returned and also published: the state ends in
    /// `Succeeded` or `Failed`, and exactly one of the success/error handlers
    /// runs. Cancelled attempts leave the state alone and notify no handler.
    pub async fn upload(
        &self,
        file: MediaFile,
        context: UploadContext,
        target: impl Into<MediaTarget>,
    ) -> MediaResult<UploadResult> {
        let target = target.into();
        let attempt = self.begin_attempt();

        tracing::info!(
            attempt_id = %attempt.id,
            context = %context,
            target = %target,
            file_name = %file.file_name,
            file_size = file.len(),
            "Starting media upload"
        );

        let outcome = self.run_attempt(&attempt, &file, context, target).await;
        self.finish(&attempt, file.len(), outcome)
    }

    fn begin_attempt(&self) -> Attempt {
        let mut active = self.shared.active();
        if let Some(previous) = active.token.take() {
            previous.cancel();
            tracing::debug!("Superseding in-flight upload attempt");
        }
        active.generation += 1;
        let token = CancellationToken::new();
        active.token = Some(token.clone());
        self.shared.state.send_replace(UploadState::signing());

        Attempt {
            id: Uuid::new_v4(),
            generation: active.generation,
            token,
        }
    }

    async fn run_attempt(
        &self,
        attempt: &Attempt,
        file: &MediaFile,
        context: UploadContext,
        target: MediaTarget,
    ) -> MediaResult<UploadResult> {
        validate_media_file(file, context, &self.config)?;
        let request = SignRequest::new(context, target)?;

        let authorization = tokio::select! {
            biased;
            _ = attempt.token.cancelled() => return Err(MediaError::Cancelled),
            signed = self.signer.sign(&request) => signed?,
        };
        authorization.ensure_fresh(Utc::now().timestamp(), self.config.signature_max_age_secs)?;

        let entered = self.shared.update_if_current(attempt.generation, |state| {
            state.phase = UploadPhase::Transferring;
        });
        if !entered {
            return Err(MediaError::Cancelled);
        }

        let shared = self.shared.clone();
        let generation = attempt.generation;
        let ticker = ProgressTicker::start(
            file.len(),
            self.config.progress_interval(),
            attempt.token.child_token(),
            move |progress| shared.publish_progress(generation, progress),
        );

        let transferred = tokio::select! {
            biased;
            _ = attempt.token.cancelled() => Err(MediaError::Cancelled),
            uploaded = self.uploader.upload(file, &authorization) => uploaded,
        };
        ticker.stop().await;

        transferred
    }

    fn finish(
        &self,
        attempt: &Attempt,
        total: u64,
        outcome: MediaResult<UploadResult>,
    ) -> MediaResult<UploadResult> {
        self.shared.release(attempt.generation);

        match outcome {
            Ok(result) => {
                let completed = UploadProgress::complete(total);
                let applied = self.shared.update_if_current(attempt.generation, |state| {
                    state.phase = UploadPhase::Succeeded;
                    state.progress = Some(completed);
                    state.error = None;
                    state.result = Some(result.clone());
                });

                if applied {
                    tracing::info!(
                        attempt_id = %attempt.id,
                        public_id = %result.public_id,
                        bytes = result.bytes,
                        "Media upload completed"
                    );
                    if let Some(on_progress) = &self.shared.handlers.on_progress {
                        on_progress(&completed);
                    }
                    if let Some(on_success) = &self.shared.handlers.on_success {
                        on_success(&result);
                    }
                } else {
                    tracing::debug!(
                        attempt_id = %attempt.id,
                        "Upload finished after being superseded; state left untouched"
                    );
                }
                Ok(result)
            }
            Err(MediaError::Cancelled) => {
                tracing::debug!(attempt_id = %attempt.id, "Upload attempt cancelled");
                Err(MediaError::Cancelled)
            }
            Err(err) => {
                let applied = self.shared.update_if_current(attempt.generation, |state| {
                    state.phase = UploadPhase::Failed;
                    state.progress = None;
                    state.error = Some(err.clone());
                    state.result = None;
                });

                if applied {
                    log_failure(attempt, &err);
                    if let Some(on_error) = &self.shared.handlers.on_error {
                        on_error(&err);
                    }
                }
                Err(err)
            }
        }
    }

    /// Upload a user's avatar.
    pub async fn upload_user_avatar(&self, file: MediaFile, user_id: i64) -> MediaResult<UploadResult> {
        self.upload(file, UploadContext::UserAvatar, user_id).await
    }

    pub async fn upload_pet_avatar(&self, file: MediaFile, pet_id: i64) -> MediaResult<UploadResult> {
        self.upload(file, UploadContext::PetAvatar, pet_id).await
    }

    pub async fn upload_pet_gallery(&self, file: MediaFile, pet_id: i64) -> MediaResult<UploadResult> {
        self.upload(file, UploadContext::PetGallery, pet_id).await
    }

    pub async fn upload_post_media(&self, file: MediaFile, post_id: i64) -> MediaResult<UploadResult> {
        self.upload(file, UploadContext::PostMedia, post_id).await
    }

    pub async fn upload_encyclopedia_class(
        &self,
        file: MediaFile,
        slug: &str,
    ) -> MediaResult<UploadResult> {
        self.upload(file, UploadContext::EncyclopediaClass, slug).await
    }

    pub async fn upload_encyclopedia_species(
        &self,
        file: MediaFile,
        slug: &str,
    ) -> MediaResult<UploadResult> {
        self.upload(file, UploadContext::EncyclopediaSpecies, slug).await
    }

    pub async fn upload_encyclopedia_breed(
        &self,
        file: MediaFile,
        slug: &str,
    ) -> MediaResult<UploadResult> {
        self.upload(file, UploadContext::EncyclopediaBreed, slug).await
    }
}

fn log_failure(attempt: &Attempt, err: &MediaError) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(attempt_id = %attempt.id, error = %err, error_code = code, "Media upload rejected")
        }
        LogLevel::Warn => {
            tracing::warn!(attempt_id = %attempt.id, error = %err, error_code = code, "Media upload failed")
        }
        LogLevel::Error => {
            tracing::error!(attempt_id = %attempt.id, error = %err, error_code = code, "Media upload failed")
        }
    }
}
