use std::fmt;

use crate::constants::SIGNATURE_CLOCK_SKEW_SECS;
use crate::error::{MediaError, MediaResult};

/// Short-lived, single-use grant to upload one asset to one destination.
///
/// Neither `Clone` nor `Serialize`: an authorization belongs to one attempt
/// and is dropped with it. `Debug` redacts the secret fields.
pub struct SignAuthorization {
    pub signature: String,
    /// Unix seconds at which the backend issued the signature.
    pub timestamp: i64,
    pub api_key: String,
    pub cloud_name: String,
    pub asset_folder: String,
    pub public_id: Option<String>,
    pub resource_type: String,
}

impl SignAuthorization {
    /// Seconds elapsed between issuance and `now` (negative if issued in the future).
    ///
    /// Saturates: the timestamp comes from the backend and may be anything.
    pub fn age_secs(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    /// Reject authorizations older than `max_age_secs`. A zero maximum disables the check.
    pub fn ensure_fresh(&self, now: i64, max_age_secs: u64) -> MediaResult<()> {
        if max_age_secs == 0 {
            return Ok(());
        }

        let age_secs = self.age_secs(now);
        if age_secs < -SIGNATURE_CLOCK_SKEW_SECS {
            return Err(MediaError::Signing(format!(
                "authorization timestamp is {}s in the future",
                age_secs.unsigned_abs()
            )));
        }
        if age_secs > i64::try_from(max_age_secs).unwrap_or(i64::MAX) {
            return Err(MediaError::ExpiredAuthorization {
                age_secs,
                max_age_secs,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for SignAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignAuthorization")
            .field("signature", &"[redacted]")
            .field("timestamp", &self.timestamp)
            .field("api_key", &"[redacted]")
            .field("cloud_name", &self.cloud_name)
            .field("asset_folder", &self.asset_folder)
            .field("public_id", &self.public_id)
            .field("resource_type", &self.resource_type)
            .finish()
    }
}
