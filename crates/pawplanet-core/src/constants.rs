//! Shared constants

/// Path of the signing endpoint, relative to the versioned API prefix.
pub const SIGN_ENDPOINT_PATH: &str = "/media/sign";

/// Default object-storage upload API base. Cloud name and resource type are appended.
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Cadence of synthesized progress updates while a transfer is in flight.
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 200;

/// Number of synthesized steps between 0 and the full file size.
pub const PROGRESS_STEPS: u64 = 10;

/// Synthesized progress never goes past this share of the file. 100% means done.
pub const PROGRESS_CEILING_PERCENT: u64 = 95;

/// Provider signatures are valid for one hour.
pub const DEFAULT_SIGNATURE_MAX_AGE_SECS: u64 = 3600;

/// Tolerated clock skew for authorizations stamped slightly in the future.
pub const SIGNATURE_CLOCK_SKEW_SECS: i64 = 300;

/// Avatar size limit. Other contexts are unlimited unless configured.
pub const DEFAULT_MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

pub const MAX_SLUG_LENGTH: usize = 128;

/// Resource types accepted by the provider's upload API.
pub const ALLOWED_RESOURCE_TYPES: &[&str] = &["image", "video", "raw", "auto"];
