use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Durable record of a completed upload, as reported by the storage provider.
///
/// `secure_url` is the value callers persist and display; the rest is metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub public_id: String,
    pub version: u64,
    pub signature: String,
    /// Absent for raw (non-image, non-video) assets.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: String,
    pub resource_type: String,
    /// Provider timestamp, passed through unparsed.
    pub created_at: String,
    pub bytes: u64,
    /// Delivery type (`upload`, `private`, `authenticated`).
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub secure_url: String,
}

/// Transfer progress of the in-flight attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
    /// 0.0 to 100.0
    pub percentage: f64,
}

impl UploadProgress {
    pub fn started(total: u64) -> Self {
        Self {
            loaded: 0,
            total,
            percentage: 0.0,
        }
    }

    /// Exactly 100%, whatever the size (including empty payloads).
    pub fn complete(total: u64) -> Self {
        Self {
            loaded: total,
            total,
            percentage: 100.0,
        }
    }

    /// Move forward by `step` bytes without passing `ceiling`.
    pub fn advance(&self, step: u64, ceiling: u64) -> Self {
        let ceiling = ceiling.min(self.total);
        let loaded = self.loaded.saturating_add(step).min(ceiling).max(self.loaded);
        Self {
            loaded,
            total: self.total,
            percentage: percent_of(loaded, self.total),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percentage >= 100.0
    }
}

fn percent_of(loaded: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (loaded as f64 * 100.0) / total as f64
}

/// Phase of the upload orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadPhase {
    #[default]
    Idle,
    Signing,
    Transferring,
    Succeeded,
    Failed,
}

impl UploadPhase {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, UploadPhase::Signing | UploadPhase::Transferring)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadPhase::Succeeded | UploadPhase::Failed)
    }
}

impl Display for UploadPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadPhase::Idle => write!(f, "idle"),
            UploadPhase::Signing => write!(f, "signing"),
            UploadPhase::Transferring => write!(f, "transferring"),
            UploadPhase::Succeeded => write!(f, "succeeded"),
            UploadPhase::Failed => write!(f, "failed"),
        }
    }
}
