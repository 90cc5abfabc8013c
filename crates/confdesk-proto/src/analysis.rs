//! PDF analysis endpoint payloads.

use serde::{Deserialize, Serialize};

/// Successful analysis of an uploaded PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Model-written abstract, truncated.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Leading slice of the abstract.
    pub summary: String,
    /// At most five trimmed, non-empty tag names.
    pub suggested_tag_names: Vec<String>,
    /// Heuristic confidence in `[0, 1]`.
    pub confidence: f32,
    /// Characters of text extracted from the document.
    pub extracted_text_length: usize,
}

/// Error envelope of the analysis endpoint.
///
/// The empty fields let clients bind the response to the same form state they
/// use for a success without branching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisFailure {
    /// Human-readable reason.
    pub error: String,
    /// Always empty.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Always empty.
    pub summary: String,
    /// Always empty.
    pub suggested_tags: Vec<String>,
}

impl AnalysisFailure {
    /// Build the envelope for an error message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            abstract_text: String::new(),
            summary: String::new(),
            suggested_tags: Vec::new(),
        }
    }
}
