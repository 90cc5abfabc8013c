//! Hosted backend configuration (REST, auth admin and storage APIs).

use serde::Deserialize;

use super::defaults::{default_storage_bucket, default_timeout_secs};

/// Hosted backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,
    /// Service-role key. Bypasses row-level security, so it must never reach
    /// a browser. Overridden by `CONFDESK_BACKEND_SERVICE_KEY`.
    #[serde(default)]
    pub service_key: Option<String>,
    /// Storage bucket holding presentation PDFs (default: "presentations").
    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,
    /// Request timeout in seconds (default: 15).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Project URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
