use std::fmt;
use std::path::{Component, Path};

use bytes::Bytes;

use crate::error::{MediaError, MediaResult};
use crate::validation::content_type_for_extension;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File payload handed to an upload attempt.
#[derive(Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl MediaFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a local file. The content type is inferred from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(MediaError::InvalidFile(format!(
                "Invalid path: {}",
                path.display()
            )));
        }

        let data = tokio::fs::read(path).await?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let content_type = content_type_for_extension(&file_name)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Ok(Self::new(file_name, content_type, data))
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}
