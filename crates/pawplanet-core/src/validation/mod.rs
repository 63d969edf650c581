//! Client-side file validation
//!
//! Checks run before an authorization is requested, so that a file the
//! provider would reject never consumes a signature.

use std::path::Path;

use crate::config::MediaClientConfig;
use crate::error::{MediaError, MediaResult};
use crate::models::{MediaFile, UploadContext};

/// Expected MIME type for a known file extension.
pub fn content_type_for_extension(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    let content_type = match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "bmp" => "image/bmp",
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "m4v" => "video/x-m4v",
        _ => return None,
    };
    Some(content_type)
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Validate a file for the given upload context.
///
/// Every context rejects empty files and honours `max_upload_bytes` when it is
/// set. Avatars must also be images within `max_avatar_bytes`. Other contexts
/// accept any content type, including raw assets.
pub fn validate_media_file(
    file: &MediaFile,
    context: UploadContext,
    config: &MediaClientConfig,
) -> MediaResult<()> {
    if file.is_empty() {
        return Err(MediaError::InvalidFile(format!(
            "'{}' is empty",
            file.file_name
        )));
    }

    if let Some(max_bytes) = config.max_upload_bytes {
        ensure_within(file, max_bytes)?;
    }

    if context.is_avatar() {
        let content_type = normalize_mime_type(&file.content_type);
        if !content_type.starts_with("image/") {
            return Err(MediaError::InvalidFile(format!(
                "{} only accepts image files, got '{}'",
                context, file.content_type
            )));
        }
        if config.max_avatar_bytes > 0 {
            ensure_within(file, config.max_avatar_bytes)?;
        }
    }

    tracing::debug!(
        file_name = %file.file_name,
        content_type = %file.content_type,
        file_size = file.len(),
        context = %context,
        "File accepted for upload"
    );

    Ok(())
}

fn ensure_within(file: &MediaFile, max_bytes: u64) -> MediaResult<()> {
    if file.len() > max_bytes {
        return Err(MediaError::InvalidFile(format!(
            "File size of {} bytes exceeds maximum allowed size of {} bytes",
            file.len(),
            max_bytes
        )));
    }
    Ok(())
}
