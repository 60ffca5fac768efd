//! Model provider seam and the Gemini REST client behind it.
//!
//! The response side is modelled as a fully optional structure: every field the
//! provider may omit is an `Option`, so extraction never has to probe for presence.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::core::Config;
use crate::features::conversation::{Message, MessageRole};
use crate::features::personas::GenerationParams;

/// A single model invocation, already shaped for one persona
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_instruction: String,
    pub generation_params: GenerationParams,
    pub contents: Vec<Message>,
    /// Attach the web-search tool
    pub web_search: bool,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, request: &ModelRequest) -> Result<ProviderResponse>;
}

// ============================================================================
// Provider response (all optional)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    pub parts: Option<Vec<ContentPart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    pub web_search_queries: Option<Vec<String>>,
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
    pub grounding_supports: Option<Vec<GroundingSupport>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebChunk {
    pub title: Option<String>,
    pub uri: Option<String>,
}

/// Links a text segment to the chunks that support it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingSupport {
    pub segment: Option<Segment>,
    pub grounding_chunk_indices: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_index: Option<i64>,
    pub end_index: Option<i64>,
    pub text: Option<String>,
}

impl ProviderResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.as_ref().and_then(|c| c.first())
    }

    /// Concatenated text parts of the first candidate, `None` if no part carries text
    pub fn text(&self) -> Option<String> {
        let parts = self
            .first_candidate()?
            .content
            .as_ref()?
            .parts
            .as_ref()?;

        let texts: Vec<&str> = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    pub fn grounding_metadata(&self) -> Option<&GroundingMetadata> {
        self.first_candidate()?.grounding_metadata.as_ref()
    }
}

// ============================================================================
// Gemini client
// ============================================================================

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: crate::core::config::DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.gemini_api_key.clone(), config.gemini_model.clone())
            .with_base_url(config.gemini_base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body(request: &ModelRequest) -> GenerateContentRequest {
        let contents = request
            .contents
            .iter()
            .map(|message| ContentBody {
                role: Some(
                    match message.role {
                        MessageRole::User => "user",
                        MessageRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![PartBody {
                    text: message.content.clone(),
                }],
            })
            .collect();

        let params = request.generation_params;
        let tools = if request.web_search {
            vec![ToolBody {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            contents,
            system_instruction: ContentBody {
                role: None,
                parts: vec![PartBody {
                    text: request.system_instruction.clone(),
                }],
            },
            generation_config: GenerationConfigBody {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                max_output_tokens: params.max_output_tokens,
            },
            tools,
        }
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(&self, request: &ModelRequest) -> Result<ProviderResponse> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = Self::build_body(request);

        debug!(
            "Gemini request | model: {} | contents: {} | web_search: {}",
            self.model,
            body.contents.len(),
            request.web_search
        );

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Gemini API request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        response
            .json::<ProviderResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse Gemini response: {e}"))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<ContentBody>,
    system_instruction: ContentBody,
    generation_config: GenerationConfigBody,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolBody>,
}

#[derive(Serialize)]
struct ContentBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<PartBody>,
}

#[derive(Serialize)]
struct PartBody {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct ToolBody {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn map_http_error(status: StatusCode, body: &str) -> anyhow::Error {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    anyhow!("Gemini API error ({}): {}", status.as_u16(), message)
}
