//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig) and loading
//! - [`backend`]: Hosted backend endpoints and keys (BackendConfig)
//! - [`ai`]: Chat-completion model and analysis limits (AiConfig)
//! - [`line`]: LINE Messaging API, Login and webhook handling (LineConfig)
//! - [`validation`]: Startup checks collecting every problem at once

mod ai;
mod backend;
mod defaults;
mod line;
mod types;
pub mod validation;

pub use ai::AiConfig;
pub use backend::BackendConfig;
pub use line::{LineConfig, LineLoginConfig, LineWebhookConfig};
pub use types::{Config, ConfigError, ServerConfig};
pub use validation::{ValidationError, validate};
