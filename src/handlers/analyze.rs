//! `POST /api/analyze-pdf`: abstract, summary and tag suggestions for a PDF.
//!
//! Flow: multipart upload -> content-type check -> text extraction ->
//! abstract prompt -> tag prompt -> post-processing. The two prompts run one
//! after the other; there is no retry.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use bytes::Bytes;
use confdesk_proto::AnalysisResponse;
use std::collections::HashSet;
use tracing::{Instrument, debug, info, warn};

use crate::error::AnalyzeError;
use crate::model::Prompt;
use crate::state::AppState;
use crate::telemetry::{request_id, spans};

/// Documents yielding fewer characters are treated as unreadable (scans).
pub const MIN_EXTRACTED_CHARS: usize = 50;

/// Most tag names returned to the client.
pub const MAX_SUGGESTED_TAGS: usize = 5;

/// Extracted length at which the document counts as substantial.
const SUBSTANTIAL_TEXT_CHARS: usize = 500;

/// Most existing tag names listed in the tag prompt.
const MAX_TAG_HINTS: usize = 100;

const ABSTRACT_SYSTEM: &str = "You are an assistant for a conference programme committee. \
Write a concise academic abstract of the presentation document you are given. \
Reply with the abstract text only, in the document's language, without headings.";

const TAGS_SYSTEM: &str = "You classify conference presentations. \
Reply with at most 5 short topic tags separated by commas and nothing else.";

pub async fn analyze_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AnalyzeError> {
    let multipart = multipart.map_err(|e| AnalyzeError::Multipart(e.body_text()))?;
    let request_id = request_id();
    analyze(state, multipart)
        .instrument(spans::analysis(&request_id))
        .await
}

async fn analyze(
    state: AppState,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AnalyzeError> {
    let document = read_pdf_upload(multipart, state.config.server.max_upload_bytes).await?;
    debug!(bytes = document.len(), "PDF received");

    let text = state.extractor.extract(document).await?;
    let text = text.trim();
    let extracted_chars = text.chars().count();
    crate::metrics::record_extracted_chars(extracted_chars);

    if extracted_chars < MIN_EXTRACTED_CHARS {
        return Err(AnalyzeError::TooLittleText {
            chars: extracted_chars,
        });
    }

    let ai = &state.config.ai;
    let excerpt = truncate_chars(text, ai.max_prompt_chars);

    let abstract_reply = state
        .model
        .complete(Prompt {
            system: ABSTRACT_SYSTEM.to_string(),
            user: format!("Document text:\n\n{excerpt}"),
            max_tokens: 600,
        })
        .await?;
    let abstract_text = truncate_chars(abstract_reply.trim(), ai.abstract_max_chars).to_string();
    let summary = summarize(&abstract_text, ai.summary_max_chars);

    let hints = existing_tag_names(&state).await;
    let tags_reply = state
        .model
        .complete(Prompt {
            system: TAGS_SYSTEM.to_string(),
            user: tag_prompt(&abstract_text, &hints),
            max_tokens: 60,
        })
        .await?;
    let suggested_tag_names = parse_tag_list(&tags_reply);

    let confidence = confidence(suggested_tag_names.len(), extracted_chars);
    info!(
        chars = extracted_chars,
        tags = suggested_tag_names.len(),
        confidence,
        "PDF analysed"
    );

    Ok(Json(AnalysisResponse {
        abstract_text,
        summary,
        suggested_tag_names,
        confidence,
        extracted_text_length: extracted_chars,
    }))
}

/// Pull the `file` field out of the form and check it is a PDF.
async fn read_pdf_upload(mut multipart: Multipart, limit: usize) -> Result<Bytes, AnalyzeError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalyzeError::Multipart(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if !is_pdf_content_type(content_type.as_deref()) {
            return Err(AnalyzeError::NotPdf(content_type));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AnalyzeError::Multipart(e.body_text()))?;
        if data.len() > limit {
            return Err(AnalyzeError::TooLarge { limit });
        }
        return Ok(data);
    }

    Err(AnalyzeError::NoFile)
}

fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/pdf"))
}

/// Existing tag names, used as hints. A store failure only loses the hints.
async fn existing_tag_names(state: &AppState) -> Vec<String> {
    match state.store.list_tags().await {
        Ok(tags) => tags
            .into_iter()
            .map(|t| t.name)
            .take(MAX_TAG_HINTS)
            .collect(),
        Err(e) => {
            warn!(error = %e, "Could not load existing tags for hints");
            Vec::new()
        }
    }
}

fn tag_prompt(abstract_text: &str, hints: &[String]) -> String {
    let mut prompt = format!("Abstract:\n\n{abstract_text}\n\n");
    if !hints.is_empty() {
        prompt.push_str("Prefer these existing tags where they fit: ");
        prompt.push_str(&hints.join(", "));
        prompt.push_str("\n\n");
    }
    prompt.push_str("Tags:");
    prompt
}

/// Longest prefix of `text` with at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Leading slice of the abstract, with an ellipsis when cut.
pub fn summarize(abstract_text: &str, max: usize) -> String {
    let head = truncate_chars(abstract_text, max);
    if head.len() == abstract_text.len() {
        head.to_string()
    } else {
        format!("{}…", head.trim_end())
    }
}

/// Split a model reply into at most [`MAX_SUGGESTED_TAGS`] clean tag names.
pub fn parse_tag_list(reply: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    reply
        .split([',', '\n', '、'])
        .map(clean_tag)
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .take(MAX_SUGGESTED_TAGS)
        .map(str::to_string)
        .collect()
}

fn clean_tag(raw: &str) -> &str {
    let mut tag = raw.trim();
    if let Some(rest) = tag.strip_prefix("Tags:") {
        tag = rest.trim();
    }
    tag = tag.trim_start_matches(['-', '*', '•', '#']).trim();
    tag.trim_matches(['"', '\'', '`', '.']).trim()
}

/// Heuristic confidence from how much the document and the model gave us.
pub fn confidence(tag_count: usize, extracted_chars: usize) -> f32 {
    match (tag_count > 0, extracted_chars >= SUBSTANTIAL_TEXT_CHARS) {
        (true, true) => 0.9,
        (true, false) | (false, true) => 0.7,
        (false, false) => 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("会議の要旨", 3), "会議の");
    }

    #[test]
    fn summary_is_abstract_prefix() {
        assert_eq!(summarize("short", 10), "short");
        assert_eq!(summarize("one two three", 8), "one two…");
    }

    #[test]
    fn tag_list_is_cleaned_deduped_and_capped() {
        let tags = parse_tag_list(" Rust, \"async\", #WebAssembly,,  rust , tokio, gRPC, tracing, extra");
        assert_eq!(tags, vec!["Rust", "async", "WebAssembly", "tokio", "gRPC"]);
        assert!(tags.len() <= MAX_SUGGESTED_TAGS);
        assert!(tags.iter().all(|t| !t.is_empty() && t.trim() == t));
    }

    #[test]
    fn tag_list_handles_bullets_and_prefix() {
        let tags = parse_tag_list("Tags: ML\n- Vision\n* Robotics.");
        assert_eq!(tags, vec!["ML", "Vision", "Robotics"]);
        assert!(parse_tag_list("  ,\n, ").is_empty());
    }

    #[test]
    fn confidence_levels() {
        assert_eq!(confidence(3, 2000), 0.9);
        assert_eq!(confidence(0, 2000), 0.7);
        assert_eq!(confidence(2, 60), 0.7);
        assert_eq!(confidence(0, 60), 0.5);
    }

    #[test]
    fn pdf_content_types() {
        assert!(is_pdf_content_type(Some("application/pdf")));
        assert!(is_pdf_content_type(Some("Application/PDF; charset=binary")));
        assert!(!is_pdf_content_type(Some("text/plain")));
        assert!(!is_pdf_content_type(None));
    }

    #[test]
    fn tag_prompt_lists_hints() {
        let prompt = tag_prompt("About Rust.", &["rust".into(), "wasm".into()]);
        assert!(prompt.contains("rust, wasm"));
        assert!(tag_prompt("x", &[]).ends_with("Tags:"));
    }
}
