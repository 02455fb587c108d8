//! Review request validation, prompt construction, and response extraction.
//!
//! This module owns the gateway's contract: what counts as a valid
//! [`ReviewRequest`], the fixed rubric sent as the system instruction, and
//! how a Gemini response is reduced to a [`ReviewResponse`]. The HTTP
//! layer in [`crate::server`] and the `rgw review` command both go through
//! [`run_review`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::Config;
use crate::gemini::{
    GeminiClient, GenerateContentRequest, GenerateContentResponse, RequestContent,
};

/// Source label applied when the caller supplies none.
pub const DEFAULT_SOURCE: &str = "Pasted Code";

/// Fixed review rubric sent as the system instruction on every call.
const SYSTEM_PROMPT: &str = "You are a professional senior software engineer performing a code review. \
    Provide a structured, actionable review that includes:\n\
    1. Summary of what the code does\n\
    2. Major issues or bugs\n\
    3. Style and readability improvements\n\
    4. Performance or security concerns\n\
    Use clear Markdown formatting (headings, bullet points, and code blocks where relevant).";

/// Inbound review request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    /// The code to review. Must be non-empty after trimming.
    pub code: String,
    /// Caller-supplied label for where the code came from.
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Outbound review response: the model's text plus any cited web sources.
#[derive(Debug, Serialize, PartialEq)]
pub struct ReviewResponse {
    pub review: String,
    pub sources: Vec<SourceRef>,
}

/// A web source cited by the model, in encounter order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceRef {
    pub title: String,
    pub uri: String,
}

/// Failure taxonomy for a review call. Mapped to HTTP statuses in
/// [`crate::server`].
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Caller supplied invalid input; never retried.
    #[error("{0}")]
    InvalidInput(String),
    /// Transport or protocol failure on the outbound call.
    #[error("Gemini API request failed: {0}")]
    Upstream(String),
    /// Upstream reachable but produced no usable text.
    #[error("Empty response from Gemini API.")]
    EmptyResponse,
}

/// Validate a request and build the outbound payload.
///
/// The code body is embedded verbatim between `---` delimiters; the source
/// label falls back to [`DEFAULT_SOURCE`] when absent or blank.
pub fn build_request(request: &ReviewRequest) -> Result<GenerateContentRequest, ReviewError> {
    if request.code.trim().is_empty() {
        return Err(ReviewError::InvalidInput(
            "Code content cannot be empty.".to_string(),
        ));
    }

    let source = if request.source.trim().is_empty() {
        DEFAULT_SOURCE
    } else {
        request.source.as_str()
    };

    let user_text = format!(
        "Review the following code (source: {}):\n\n---\n{}\n---",
        source, request.code
    );

    Ok(GenerateContentRequest {
        system_instruction: RequestContent::from_text(SYSTEM_PROMPT),
        contents: vec![RequestContent::from_text(user_text)],
    })
}

/// Reduce a Gemini response to the gateway's response shape.
///
/// The review text is the first candidate's first part. No candidates, no
/// content, no parts, and empty text all collapse to
/// [`ReviewError::EmptyResponse`]. Sources are collected from grounding
/// attributions that carry both a non-empty `uri` and `title`; anything
/// else is skipped. A candidate without grounding metadata yields the same
/// empty list as metadata with no attributions.
pub fn extract_response(
    response: GenerateContentResponse,
) -> Result<ReviewResponse, ReviewError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(ReviewError::EmptyResponse);
    };

    let review = candidate
        .content
        .as_ref()
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.clone())
        .unwrap_or_default();

    if review.is_empty() {
        return Err(ReviewError::EmptyResponse);
    }

    let mut sources = Vec::new();
    if let Some(metadata) = candidate.grounding_metadata {
        for attribution in metadata.grounding_attributions {
            let Some(web) = attribution.web else {
                continue;
            };
            match (web.uri, web.title) {
                (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                    sources.push(SourceRef { title, uri });
                }
                _ => {}
            }
        }
    }

    Ok(ReviewResponse { review, sources })
}

/// Run one complete review: validate, call Gemini once, extract.
pub async fn run_review(
    client: &GeminiClient,
    request: &ReviewRequest,
) -> Result<ReviewResponse, ReviewError> {
    let payload = build_request(request)?;

    let response = client.generate(&payload).await.map_err(|e| {
        tracing::warn!("outbound Gemini call failed: {e:#}");
        ReviewError::Upstream(format!("{e:#}"))
    })?;

    extract_response(response)
}

/// Review a local file and print the result to stdout.
///
/// Used by the `rgw review` command. The source label defaults to the
/// file name when `--source` is not given.
pub async fn run_review_file(
    config: &Config,
    file: &Path,
    source: Option<String>,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let code = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let source = source.unwrap_or_else(|| {
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string())
    });

    let client = GeminiClient::new(config.gemini.clone())?;
    let result = run_review(&client, &ReviewRequest { code, source }).await?;

    println!("{}", result.review);
    if !result.sources.is_empty() {
        println!("\nSources:");
        for source in &result.sources {
            println!("  {} — {}", source.title, source.uri);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(code: &str, source: &str) -> ReviewRequest {
        ReviewRequest {
            code: code.to_string(),
            source: source.to_string(),
        }
    }

    fn response_json(raw: &str) -> GenerateContentResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_empty_code_rejected() {
        for code in ["", "   ", "\n\t  \n"] {
            let err = build_request(&request(code, "lib.rs")).unwrap_err();
            assert!(matches!(err, ReviewError::InvalidInput(_)), "code {code:?}");
            assert_eq!(err.to_string(), "Code content cannot be empty.");
        }
    }

    #[test]
    fn test_prompt_embeds_code_and_source() {
        let payload = build_request(&request("fn main() {}", "main.rs")).unwrap();

        assert!(payload.system_instruction.parts[0]
            .text
            .contains("code review"));
        let user_text = &payload.contents[0].parts[0].text;
        assert!(user_text.contains("(source: main.rs)"));
        assert!(user_text.contains("---\nfn main() {}\n---"));
    }

    #[test]
    fn test_blank_source_falls_back_to_default() {
        let payload = build_request(&request("x = 1", "  ")).unwrap();
        assert!(payload.contents[0].parts[0]
            .text
            .contains("(source: Pasted Code)"));
    }

    #[test]
    fn test_serde_default_source() {
        let request: ReviewRequest = serde_json::from_str(r#"{"code": "x = 1"}"#).unwrap();
        assert_eq!(request.source, DEFAULT_SOURCE);
    }

    #[test]
    fn test_extract_text_without_grounding() {
        let response =
            response_json(r#"{"candidates": [{"content": {"parts": [{"text": "X"}]}}]}"#);
        let result = extract_response(response).unwrap();
        assert_eq!(result.review, "X");
        assert!(result.sources.is_empty());
    }

    #[test]
    fn test_extract_no_candidates_is_empty_response() {
        let err = extract_response(response_json(r#"{"candidates": []}"#)).unwrap_err();
        assert!(matches!(err, ReviewError::EmptyResponse));
    }

    #[test]
    fn test_extract_missing_text_is_empty_response() {
        for raw in [
            r#"{"candidates": [{}]}"#,
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
            r#"{"candidates": [{"content": {"parts": [{}]}}]}"#,
            r#"{"candidates": [{"content": {"parts": [{"text": ""}]}}]}"#,
        ] {
            let err = extract_response(response_json(raw)).unwrap_err();
            assert!(matches!(err, ReviewError::EmptyResponse), "raw {raw}");
        }
    }

    #[test]
    fn test_extract_sources_in_order_skipping_partial() {
        let response = response_json(
            r#"{"candidates": [{
                "content": {"parts": [{"text": "reviewed"}]},
                "groundingMetadata": {"groundingAttributions": [
                    {"web": {"uri": "https://a.example", "title": "A"}},
                    {"web": {"uri": "https://no-title.example"}},
                    {"web": {"title": "no uri"}},
                    {},
                    {"web": {"uri": "", "title": "empty uri"}},
                    {"web": {"uri": "https://b.example", "title": "B"}}
                ]}
            }]}"#,
        );

        let result = extract_response(response).unwrap();
        assert_eq!(
            result.sources,
            vec![
                SourceRef {
                    title: "A".to_string(),
                    uri: "https://a.example".to_string()
                },
                SourceRef {
                    title: "B".to_string(),
                    uri: "https://b.example".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_extract_absent_metadata_equals_empty_list() {
        let with_absent =
            response_json(r#"{"candidates": [{"content": {"parts": [{"text": "X"}]}}]}"#);
        let with_empty = response_json(
            r#"{"candidates": [{
                "content": {"parts": [{"text": "X"}]},
                "groundingMetadata": {"groundingAttributions": []}
            }]}"#,
        );

        assert_eq!(
            extract_response(with_absent).unwrap().sources,
            extract_response(with_empty).unwrap().sources
        );
    }
}
