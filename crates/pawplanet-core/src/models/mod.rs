//! Data models for media uploads
//!
//! Each sub-module covers one part of the upload flow: what is being uploaded
//! (context and target), the signed authorization, the file payload, and the
//! outcome (progress, phase, result).

mod authorization;
mod context;
mod file;
mod upload;

pub use authorization::*;
pub use context::*;
pub use file::*;
pub use upload::*;
