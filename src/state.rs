//! Shared application state handed to every handler.
//!
//! Immutable after startup: the config plus one client per hosted service,
//! each behind a trait object so tests can substitute fakes.

use std::sync::Arc;

use crate::config::Config;
use crate::line::{IdentityVerifier, LineClient, Messenger};
use crate::model::{ChatModel, OpenAiChat};
use crate::pdf::{PdfExtractText, TextExtractor};
use crate::store::{Store, SupabaseStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub model: Arc<dyn ChatModel>,
    pub messenger: Arc<dyn Messenger>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub extractor: Arc<dyn TextExtractor>,
}

impl AppState {
    /// Wire the real hosted-service clients from configuration.
    pub fn from_config(config: Config) -> Self {
        let line = Arc::new(LineClient::new(&config.line));
        Self {
            store: Arc::new(SupabaseStore::new(&config.backend)),
            model: Arc::new(OpenAiChat::new(&config.ai)),
            messenger: line.clone(),
            verifier: line,
            extractor: Arc::new(PdfExtractText),
            config: Arc::new(config),
        }
    }
}
