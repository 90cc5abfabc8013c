//! PDF text extraction.
//!
//! Parsing is CPU-bound and the parser can panic on hostile input, so the
//! real extractor runs on the blocking pool and turns a panic into an
//! [`ExtractError`] instead of taking the worker down.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a readable PDF: {0}")]
    Parse(String),
    #[error("PDF parser crashed")]
    Panicked,
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text layer of a PDF document.
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError>;
}

/// Extractor backed by the `pdf-extract` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractText;

#[async_trait]
impl TextExtractor for PdfExtractText {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError> {
        let joined =
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&document))
                .await;

        match joined {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractError::Parse(e.to_string())),
            Err(e) => {
                warn!(error = %e, "PDF extraction task failed");
                Err(ExtractError::Panicked)
            }
        }
    }
}
