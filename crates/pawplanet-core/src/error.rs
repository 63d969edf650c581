//! Error types module
//!
//! All failures of an upload attempt are unified under the `MediaError` enum.
//! Each variant knows which stage of the attempt produced it, how it should be
//! logged and whether re-invoking the upload can reasonably succeed.

use std::io;
use std::sync::Arc;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like expired credentials
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Stage of an upload attempt that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    /// Checks performed locally before any network call.
    Validation,
    /// The signing request to the PawPlanet backend.
    Signing,
    /// The direct transfer to the object-storage provider.
    Transfer,
}

/// Upload failure.
///
/// `Clone` so that the same error can be kept in observable state, handed to
/// an error handler and returned to the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MediaError {
    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Upload authorization expired: issued {age_secs}s ago, maximum age is {max_age_secs}s")]
    ExpiredAuthorization { age_secs: i64, max_age_secs: u64 },

    #[error("Upload failed: {0}")]
    Transfer(String),

    #[error("Upload cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[source] Arc<io::Error>),
}

impl From<io::Error> for MediaError {
    fn from(err: io::Error) -> Self {
        MediaError::Io(Arc::new(err))
    }
}

/// Result type for media upload operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Stage of the attempt that failed. `None` for cancellations.
    pub fn stage(&self) -> Option<ErrorStage> {
        match self {
            MediaError::Routing(_) | MediaError::InvalidFile(_) | MediaError::Io(_) => {
                Some(ErrorStage::Validation)
            }
            MediaError::Signing(_) | MediaError::ExpiredAuthorization { .. } => {
                Some(ErrorStage::Signing)
            }
            MediaError::Transfer(_) => Some(ErrorStage::Transfer),
            MediaError::Cancelled => None,
        }
    }

    /// Machine-readable error code (e.g., "SIGNING_FAILED")
    pub fn error_code(&self) -> &'static str {
        match self {
            MediaError::Routing(_) => "ROUTING_ERROR",
            MediaError::InvalidFile(_) => "INVALID_FILE",
            MediaError::Signing(_) => "SIGNING_FAILED",
            MediaError::ExpiredAuthorization { .. } => "AUTHORIZATION_EXPIRED",
            MediaError::Transfer(_) => "UPLOAD_FAILED",
            MediaError::Cancelled => "CANCELLED",
            MediaError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether invoking the upload again (with a fresh authorization) can succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::Signing(_)
            | MediaError::ExpiredAuthorization { .. }
            | MediaError::Transfer(_)
            | MediaError::Cancelled => true,
            MediaError::Routing(_) | MediaError::InvalidFile(_) | MediaError::Io(_) => false,
        }
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            MediaError::Routing(_) | MediaError::InvalidFile(_) | MediaError::Cancelled => {
                LogLevel::Debug
            }
            MediaError::ExpiredAuthorization { .. } => LogLevel::Warn,
            MediaError::Signing(_) | MediaError::Transfer(_) | MediaError::Io(_) => {
                LogLevel::Error
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MediaError::Cancelled)
    }
}
