//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("backend.url must be an http(s) URL, got '{0}'")]
    InvalidBackendUrl(String),
    #[error("backend.service_key is required (or set CONFDESK_BACKEND_SERVICE_KEY)")]
    MissingServiceKey,
    #[error("backend.storage_bucket must not be empty")]
    EmptyStorageBucket,
    #[error("ai.base_url must be an http(s) URL, got '{0}'")]
    InvalidModelUrl(String),
    #[error("ai.{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
    #[error("ai.summary_max_chars ({summary}) exceeds ai.abstract_max_chars ({abstract_max})")]
    SummaryLongerThanAbstract { summary: usize, abstract_max: usize },
    #[error("server.max_upload_bytes must be greater than zero")]
    ZeroUploadLimit,
    #[error("server.log_format must be 'pretty' or 'json', got '{0}'")]
    InvalidLogFormat(String),
    #[error("line.login.email_domain must not be empty")]
    EmptyEmailDomain,
    #[error("line.login.allowed_redirects entry '{0}' must be an absolute http(s) URL")]
    InvalidAllowedRedirect(String),
    #[error("line.login.default_redirect '{0}' is not in line.login.allowed_redirects")]
    DefaultRedirectNotAllowed(String),
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Backend
    if !is_http_url(&config.backend.url) {
        errors.push(ValidationError::InvalidBackendUrl(config.backend.url.clone()));
    }
    if config
        .backend
        .service_key
        .as_deref()
        .is_none_or(|k| k.trim().is_empty())
    {
        errors.push(ValidationError::MissingServiceKey);
    }
    if config.backend.storage_bucket.trim().is_empty() {
        errors.push(ValidationError::EmptyStorageBucket);
    }

    // Model
    if !is_http_url(&config.ai.base_url) {
        errors.push(ValidationError::InvalidModelUrl(config.ai.base_url.clone()));
    }
    for (field, value) in [
        ("max_prompt_chars", config.ai.max_prompt_chars),
        ("abstract_max_chars", config.ai.abstract_max_chars),
        ("summary_max_chars", config.ai.summary_max_chars),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroLimit { field });
        }
    }
    if config.ai.summary_max_chars > config.ai.abstract_max_chars {
        errors.push(ValidationError::SummaryLongerThanAbstract {
            summary: config.ai.summary_max_chars,
            abstract_max: config.ai.abstract_max_chars,
        });
    }

    // Server
    if config.server.max_upload_bytes == 0 {
        errors.push(ValidationError::ZeroUploadLimit);
    }
    if !matches!(config.server.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::InvalidLogFormat(
            config.server.log_format.clone(),
        ));
    }

    // LINE Login
    let login = &config.line.login;
    if login.email_domain.trim().is_empty() {
        errors.push(ValidationError::EmptyEmailDomain);
    }
    for entry in &login.allowed_redirects {
        if super::line::parse_absolute(entry).is_none() {
            errors.push(ValidationError::InvalidAllowedRedirect(entry.clone()));
        }
    }
    if let Some(ref redirect) = login.default_redirect
        && !login.redirect_allowed(redirect)
    {
        errors.push(ValidationError::DefaultRedirectNotAllowed(redirect.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
