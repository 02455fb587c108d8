//! Typed Gemini `generateContent` wire structures and the outbound client.
//!
//! Request and response shapes mirror the generative language API JSON
//! (camelCase on the wire). Every response field that the API may omit is
//! an `Option` or a defaulted container, so callers handle each absent
//! value as an explicit branch instead of falling through a chain of
//! dynamic lookups.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;

// ============ Request types ============

/// Body of a `generateContent` call: a fixed system instruction plus the
/// composed user content.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: RequestContent,
    pub contents: Vec<RequestContent>,
}

/// A content block in a request.
#[derive(Debug, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

/// A text part within a request content block.
#[derive(Debug, Serialize)]
pub struct RequestPart {
    pub text: String,
}

impl RequestContent {
    /// Single-part content block, the only shape this service sends.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![RequestPart { text: text.into() }],
        }
    }
}

// ============ Response types ============

/// Top-level `generateContent` response.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One generated response option from the model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Content of a candidate; a blocked or empty candidate may omit parts.
#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A part of a candidate's content. `text` is absent for non-text parts.
#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Citation metadata the model optionally attaches to a candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_attributions: Vec<GroundingAttribution>,
}

/// A single citation-like reference supporting the candidate.
#[derive(Debug, Deserialize)]
pub struct GroundingAttribution {
    #[serde(default)]
    pub web: Option<WebSource>,
}

/// Web source behind a grounding attribution.
#[derive(Debug, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

// ============ Client ============

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// Holds a `reqwest::Client` built with the configured timeout, so the
/// outbound call either completes or fails within the bound. One call per
/// review; no retry.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        )
    }

    /// Make one `generateContent` call.
    ///
    /// Network errors, timeouts, and non-success statuses all surface as
    /// errors carrying the underlying cause; a non-success response body
    /// is included in the error text.
    pub async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        tracing::debug!(model = %self.config.model, "calling Gemini generateContent");

        let response = self
            .http
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to decode Gemini API response")
    }
}
