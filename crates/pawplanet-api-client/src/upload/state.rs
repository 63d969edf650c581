use pawplanet_core::{MediaError, UploadPhase, UploadProgress, UploadResult};
use std::fmt;
use std::sync::Arc;

/// Observable snapshot of an orchestrator.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub phase: UploadPhase,
    pub progress: Option<UploadProgress>,
    pub error: Option<MediaError>,
    pub result: Option<UploadResult>,
}

impl UploadState {
    /// State at the start of an attempt: everything cleared, signing in progress.
    pub(crate) fn signing() -> Self {
        Self {
            phase: UploadPhase::Signing,
            ..Self::default()
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.phase.is_in_flight()
    }
}

pub type SuccessHandler = Arc<dyn Fn(&UploadResult) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(&MediaError) + Send + Sync>;
pub type ProgressHandler = Arc<dyn Fn(&UploadProgress) + Send + Sync>;

/// Optional callbacks notified by the orchestrator.
///
/// Exactly one of `on_success` / `on_error` runs per finished attempt.
/// Superseded or reset attempts notify neither.
#[derive(Clone, Default)]
pub struct UploadHandlers {
    pub on_success: Option<SuccessHandler>,
    pub on_error: Option<ErrorHandler>,
    pub on_progress: Option<ProgressHandler>,
}

impl UploadHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, handler: impl Fn(&UploadResult) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl Fn(&MediaError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }

    pub fn on_progress(
        mut self,
        handler: impl Fn(&UploadProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_progress = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for UploadHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadHandlers")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}
