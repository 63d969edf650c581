//! Configuration module
//!
//! Settings for the media upload client: where the PawPlanet backend and the
//! storage provider live, how progress is paced and which files are accepted.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_AVATAR_BYTES,
    DEFAULT_PROGRESS_INTERVAL_MS, DEFAULT_SIGNATURE_MAX_AGE_SECS,
    DEFAULT_UPLOAD_BASE_URL,
};

/// Media upload client configuration
#[derive(Clone, Debug)]
pub struct MediaClientConfig {
    /// PawPlanet backend base URL (without the `/api/{version}` prefix)
    pub api_url: String,
    pub api_version: String,
    /// Session token sent as `Authorization: Bearer` to the signing endpoint
    pub api_token: Option<String>,
    /// Storage provider upload API base. Fixed per client, never taken from a request.
    pub upload_base_url: String,
    pub http_timeout_secs: u64,
    pub progress_interval_ms: u64,
    /// 0 disables the freshness check
    pub signature_max_age_secs: u64,
    /// Size limit for `USER_AVATAR` and `PET_AVATAR`; 0 disables it
    pub max_avatar_bytes: u64,
    /// Size limit for every context; unlimited when unset
    pub max_upload_bytes: Option<u64>,
}

impl Default for MediaClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_token: None,
            upload_base_url: DEFAULT_UPLOAD_BASE_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
            signature_max_age_secs: DEFAULT_SIGNATURE_MAX_AGE_SECS,
            max_avatar_bytes: DEFAULT_MAX_AVATAR_BYTES,
            max_upload_bytes: None,
        }
    }
}

impl MediaClientConfig {
    /// Load from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Build from any key/value source; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("PAWPLANET_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or(defaults.api_url)
            .trim_end_matches('/')
            .to_string();

        let api_version = lookup("PAWPLANET_API_VERSION").unwrap_or(defaults.api_version);

        let api_token = lookup("PAWPLANET_API_TOKEN").filter(|t| !t.trim().is_empty());

        let upload_base_url = lookup("PAWPLANET_UPLOAD_BASE_URL")
            .unwrap_or(defaults.upload_base_url)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_url,
            api_version,
            api_token,
            upload_base_url,
            http_timeout_secs: parse_or(
                &lookup,
                "PAWPLANET_HTTP_TIMEOUT_SECS",
                defaults.http_timeout_secs,
            )?,
            progress_interval_ms: parse_or(
                &lookup,
                "PAWPLANET_PROGRESS_INTERVAL_MS",
                defaults.progress_interval_ms,
            )?,
            signature_max_age_secs: parse_or(
                &lookup,
                "PAWPLANET_SIGNATURE_MAX_AGE_SECS",
                defaults.signature_max_age_secs,
            )?,
            max_avatar_bytes: parse_or(
                &lookup,
                "PAWPLANET_MAX_AVATAR_BYTES",
                defaults.max_avatar_bytes,
            )?,
            max_upload_bytes: parse_opt(&lookup, "PAWPLANET_MAX_UPLOAD_BYTES")?,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "PAWPLANET_API_URL must be an http(s) URL, got '{}'",
                self.api_url
            ));
        }

        if !self.upload_base_url.starts_with("https://")
            && !self.upload_base_url.starts_with("http://")
        {
            return Err(anyhow::anyhow!(
                "PAWPLANET_UPLOAD_BASE_URL must be an http(s) URL, got '{}'",
                self.upload_base_url
            ));
        }

        if self.progress_interval_ms == 0 {
            return Err(anyhow::anyhow!(
                "PAWPLANET_PROGRESS_INTERVAL_MS must be greater than 0"
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PAWPLANET_HTTP_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if i64::try_from(self.signature_max_age_secs).is_err() {
            return Err(anyhow::anyhow!(
                "PAWPLANET_SIGNATURE_MAX_AGE_SECS must be at most {}, got {}",
                i64::MAX,
                self.signature_max_age_secs
            ));
        }

        Ok(())
    }

    /// API prefix (e.g. "/api/v1")
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

fn parse_opt<F>(lookup: &F, key: &str) -> Result<Option<u64>, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("{} must be a non-negative integer, got '{}'", key, value)
            })
        })
        .transpose()
}
