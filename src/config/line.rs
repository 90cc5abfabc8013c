//! LINE Messaging API and LINE Login configuration.

use axum::http::Uri;
use serde::Deserialize;

use super::defaults::{
    default_email_domain, default_line_api_base, default_timeout_secs, default_welcome_message,
};

/// LINE configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    /// API root (default: https://api.line.me).
    #[serde(default = "default_line_api_base")]
    pub api_base: String,
    /// Messaging API channel access token. Overridden by `LINE_CHANNEL_ACCESS_TOKEN`.
    #[serde(default)]
    pub channel_access_token: Option<String>,
    /// Messaging API channel secret, used to check webhook signatures.
    /// Overridden by `LINE_CHANNEL_SECRET`. Unset disables the check.
    #[serde(default)]
    pub channel_secret: Option<String>,
    /// Request timeout in seconds (default: 15).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Login bridging.
    #[serde(default)]
    pub login: LineLoginConfig,
    /// Webhook event handling.
    #[serde(default)]
    pub webhook: LineWebhookConfig,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            api_base: default_line_api_base(),
            channel_access_token: None,
            channel_secret: None,
            timeout_secs: default_timeout_secs(),
            login: LineLoginConfig::default(),
            webhook: LineWebhookConfig::default(),
        }
    }
}

/// LINE Login bridging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LineLoginConfig {
    /// LINE Login channel id; the expected audience of id tokens.
    /// Unset disables the login endpoint.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Domain of the synthetic backend emails (default: "line.local").
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
    /// Redirect used when the request carries none.
    #[serde(default)]
    pub default_redirect: Option<String>,
    /// Allowed redirect targets. A redirect matches an entry when scheme,
    /// host and port are equal and its path lies under the entry's path.
    /// Empty allows any redirect.
    #[serde(default)]
    pub allowed_redirects: Vec<String>,
}

impl Default for LineLoginConfig {
    fn default() -> Self {
        Self {
            channel_id: None,
            email_domain: default_email_domain(),
            default_redirect: None,
            allowed_redirects: Vec::new(),
        }
    }
}

impl LineLoginConfig {
    /// Whether `redirect` may be embedded in a magic link.
    pub fn redirect_allowed(&self, redirect: &str) -> bool {
        if self.allowed_redirects.is_empty() {
            return true;
        }
        let Some(target) = parse_absolute(redirect) else {
            return false;
        };
        self.allowed_redirects
            .iter()
            .filter_map(|entry| parse_absolute(entry))
            .any(|allowed| redirect_matches(&allowed, &target))
    }
}

/// Parse an absolute http(s) URI with a host.
pub(crate) fn parse_absolute(raw: &str) -> Option<Uri> {
    let uri: Uri = raw.parse().ok()?;
    let scheme = uri.scheme_str()?;
    if !matches!(scheme, "http" | "https") || uri.host().is_none_or(str::is_empty) {
        return None;
    }
    // Userinfo hides the real host behind an innocent-looking prefix.
    if uri.authority().is_some_and(|a| a.as_str().contains('@')) {
        return None;
    }
    Some(uri)
}

fn effective_port(uri: &Uri) -> Option<u16> {
    uri.port_u16().or(match uri.scheme_str() {
        Some("https") => Some(443),
        Some("http") => Some(80),
        _ => None,
    })
}

fn redirect_matches(allowed: &Uri, target: &Uri) -> bool {
    let same_origin = allowed.scheme_str() == target.scheme_str()
        && allowed
            .host()
            .zip(target.host())
            .is_some_and(|(a, t)| a.eq_ignore_ascii_case(t))
        && effective_port(allowed) == effective_port(target);
    same_origin && path_under(allowed.path(), target.path())
}

/// `path` equals `prefix` or sits below it on a segment boundary.
fn path_under(prefix: &str, path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Webhook handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LineWebhookConfig {
    /// User, group or room id that receives forwarded text messages.
    /// Unset disables forwarding.
    #[serde(default)]
    pub forward_to: Option<String>,
    /// Text pushed to users who add the bot.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

impl Default for LineWebhookConfig {
    fn default() -> Self {
        Self {
            forward_to: None,
            welcome_message: default_welcome_message(),
        }
    }
}
