//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::SocketAddr;

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

pub fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

// =============================================================================
// Upstream Defaults
// =============================================================================

pub fn default_timeout_secs() -> u64 {
    15
}

pub fn default_storage_bucket() -> String {
    "presentations".to_string()
}

// =============================================================================
// Model Defaults
// =============================================================================

pub fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_ai_timeout_secs() -> u64 {
    60
}

pub fn default_temperature() -> f32 {
    0.3
}

pub fn default_max_prompt_chars() -> usize {
    8000
}

pub fn default_abstract_max_chars() -> usize {
    1000
}

pub fn default_summary_max_chars() -> usize {
    200
}

// =============================================================================
// LINE Defaults
// =============================================================================

pub fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

pub fn default_email_domain() -> String {
    "line.local".to_string()
}

pub fn default_welcome_message() -> String {
    "Thanks for adding us! Conference updates and reminders will arrive here.".to_string()
}
