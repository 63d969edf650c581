//! PawPlanet Core Library
//!
//! This crate provides the domain models, error types, configuration and
//! client-side validation shared by the PawPlanet media upload components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::MediaClientConfig;
pub use error::{ErrorStage, LogLevel, MediaError, MediaResult};
pub use models::{
    ContextKey, MediaFile, MediaTarget, SignAuthorization, SignRequest, UploadContext,
    UploadPhase, UploadProgress, UploadResult,
};
pub use validation::validate_media_file;
