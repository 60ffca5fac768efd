//! # Feature: Grounding Adapter
//!
//! Wraps one model invocation for one persona, optionally with web search, and
//! normalizes whatever the provider returns into `{text, sources, search_queries}`.
//! Provider faults never escape: they become a fallback result of the same shape.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Outcomes split into generated/fallback variants
//! - 1.1.0: Chat mode input (full per-agent turn list)
//! - 1.0.0: Initial release with Google Search grounding

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::features::citations::reconcile_supports;
use crate::features::conversation::Message;
use crate::features::grounding::provider::{GroundingChunk, ModelProvider, ModelRequest, ProviderResponse};
use crate::features::personas::Persona;

/// Returned when the provider answers without any text
pub const EMPTY_RESPONSE_TEXT: &str =
    "I apologize, but I couldn't generate a response at this time. Please try again.";

/// Returned when the provider call itself fails
pub const PROVIDER_ERROR_TEXT: &str =
    "I'm sorry, I encountered an error while generating a response. Please try again later.";

/// Title used for sources the provider left untitled
pub const UNKNOWN_SOURCE_TITLE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingResult {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub search_queries: Vec<String>,
}

impl GroundingResult {
    pub fn fallback(text: &str) -> Self {
        GroundingResult {
            text: text.to_string(),
            sources: Vec::new(),
            search_queries: Vec::new(),
        }
    }
}

/// Outcome of one agent call. Both variants carry a complete result.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Generated(GroundingResult),
    Fallback(GroundingResult),
}

impl AgentOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, AgentOutcome::Fallback(_))
    }

    pub fn result(&self) -> &GroundingResult {
        match self {
            AgentOutcome::Generated(result) | AgentOutcome::Fallback(result) => result,
        }
    }

    pub fn into_result(self) -> GroundingResult {
        match self {
            AgentOutcome::Generated(result) | AgentOutcome::Fallback(result) => result,
        }
    }
}

/// What to send: one prompt, or a turn list already shaped for the target persona
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationInput {
    Prompt(String),
    Conversation(Vec<Message>),
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub request_id: Uuid,
    pub input: GenerationInput,
    pub persona: Persona,
    pub grounding_enabled: bool,
}

#[derive(Clone)]
pub struct GroundingAdapter {
    provider: Arc<dyn ModelProvider>,
}

impl GroundingAdapter {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        GroundingAdapter { provider }
    }

    pub async fn invoke(&self, request: &GenerationRequest) -> AgentOutcome {
        let request_id = request.request_id;
        let agent = request.persona.id;
        let start_time = Instant::now();

        let model_request = Self::build_model_request(request);
        debug!(
            "[{request_id}] {agent}: sending {} message(s) | grounding: {}",
            model_request.contents.len(),
            request.grounding_enabled
        );

        match self.provider.generate(&model_request).await {
            Ok(response) => {
                let outcome = normalize(response);
                let elapsed = start_time.elapsed();
                match &outcome {
                    AgentOutcome::Generated(result) => info!(
                        "[{request_id}] {agent}: response after {elapsed:?} | {} chars | {} sources | {} queries",
                        result.text.chars().count(),
                        result.sources.len(),
                        result.search_queries.len()
                    ),
                    AgentOutcome::Fallback(_) => warn!(
                        "[{request_id}] {agent}: provider returned no text after {elapsed:?}, using fallback"
                    ),
                }
                outcome
            }
            Err(e) => {
                let elapsed = start_time.elapsed();
                error!("[{request_id}] {agent}: provider error after {elapsed:?}: {e:#}");
                AgentOutcome::Fallback(GroundingResult::fallback(PROVIDER_ERROR_TEXT))
            }
        }
    }

    pub fn build_model_request(request: &GenerationRequest) -> ModelRequest {
        let contents = match &request.input {
            GenerationInput::Prompt(prompt) => vec![Message::user(prompt.clone())],
            GenerationInput::Conversation(messages) => messages.clone(),
        };

        ModelRequest {
            system_instruction: request.persona.system_instruction.clone(),
            generation_params: request.persona.generation_params,
            contents,
            web_search: request.grounding_enabled,
        }
    }
}

/// Total over the optional response structure: missing text is a fallback,
/// missing metadata is just empty sources and queries.
pub fn normalize(response: ProviderResponse) -> AgentOutcome {
    let text = match response.text() {
        Some(text) if !text.is_empty() => text,
        _ => return AgentOutcome::Fallback(GroundingResult::fallback(EMPTY_RESPONSE_TEXT)),
    };

    let Some(metadata) = response.grounding_metadata() else {
        return AgentOutcome::Generated(GroundingResult {
            text,
            sources: Vec::new(),
            search_queries: Vec::new(),
        });
    };

    let search_queries = metadata.web_search_queries.clone().unwrap_or_default();
    let chunks = metadata.grounding_chunks.as_deref().unwrap_or_default();
    let sources: Vec<Source> = chunks.iter().map(source_from_chunk).collect();

    let text = reconcile_supports(&text, metadata.grounding_supports.as_deref(), chunks.len());

    AgentOutcome::Generated(GroundingResult {
        text,
        sources,
        search_queries,
    })
}

// Chunks without web data still occupy their position so span indices line up
fn source_from_chunk(chunk: &GroundingChunk) -> Source {
    let web = chunk.web.as_ref();
    Source {
        title: web
            .and_then(|w| w.title.clone())
            .unwrap_or_else(|| UNKNOWN_SOURCE_TITLE.to_string()),
        uri: web.and_then(|w| w.uri.clone()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::conversation::MessageRole;
    use crate::features::personas::{PersonaId, PersonaRegistry};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    /// Provider that replays one canned result and records what it was sent
    struct ScriptedProvider {
        reply: Result<serde_json::Value, String>,
        seen: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedProvider {
        fn ok(value: serde_json::Value) -> Self {
            ScriptedProvider {
                reply: Ok(value),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            ScriptedProvider {
                reply: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        async fn generate(&self, request: &ModelRequest) -> anyhow::Result<ProviderResponse> {
            self.seen.lock().await.push(request.clone());
            match &self.reply {
                Ok(value) => Ok(serde_json::from_value(value.clone())?),
                Err(message) => Err(anyhow!(message.clone())),
            }
        }
    }

    fn request(input: GenerationInput, grounding_enabled: bool) -> GenerationRequest {
        GenerationRequest {
            request_id: Uuid::new_v4(),
            input,
            persona: PersonaRegistry::new().get(PersonaId::AgentA).clone(),
            grounding_enabled,
        }
    }

    fn parse(value: serde_json::Value) -> ProviderResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_grounded_response() {
        let outcome = normalize(parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Solar power is good" }] },
                "groundingMetadata": {
                    "webSearchQueries": ["solar power benefits", "solar cost 2024"],
                    "groundingChunks": [
                        { "web": { "title": "A", "uri": "u1" } },
                        { "web": { "title": "B", "uri": "u2" } }
                    ],
                    "groundingSupports": [
                        { "segment": { "endIndex": 20 }, "groundingChunkIndices": [0, 1] }
                    ]
                }
            }]
        })));

        assert!(!outcome.is_fallback());
        let result = outcome.into_result();
        assert_eq!(result.text, "Solar power is good[1][2]");
        assert_eq!(
            result.sources,
            vec![
                Source { title: "A".into(), uri: "u1".into() },
                Source { title: "B".into(), uri: "u2".into() },
            ]
        );
        assert_eq!(result.search_queries, vec!["solar power benefits", "solar cost 2024"]);
    }

    #[test]
    fn test_normalize_without_metadata() {
        let outcome = normalize(parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Plain answer" }] } }]
        })));

        assert_eq!(
            outcome,
            AgentOutcome::Generated(GroundingResult {
                text: "Plain answer".into(),
                sources: vec![],
                search_queries: vec![],
            })
        );
    }

    #[test]
    fn test_normalize_missing_text_falls_back() {
        for body in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
        ] {
            let outcome = normalize(parse(body));
            assert!(outcome.is_fallback());
            assert_eq!(outcome.result(), &GroundingResult::fallback(EMPTY_RESPONSE_TEXT));
        }
    }

    #[test]
    fn test_whitespace_text_is_passed_through() {
        let outcome = normalize(parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  \n" }] } }]
        })));

        assert!(!outcome.is_fallback());
        assert_eq!(outcome.result().text, "  \n");
    }

    #[test]
    fn test_untitled_and_webless_chunks_become_unknown() {
        let outcome = normalize(parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "abc" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://no-title.example" } },
                        {}
                    ]
                }
            }]
        })));

        let result = outcome.into_result();
        assert_eq!(result.text, "abc");
        assert_eq!(result.sources[0].title, UNKNOWN_SOURCE_TITLE);
        assert_eq!(result.sources[0].uri, "https://no-title.example");
        assert_eq!(result.sources[1], Source { title: UNKNOWN_SOURCE_TITLE.into(), uri: String::new() });
        assert!(result.search_queries.is_empty());
    }

    #[test]
    fn test_malformed_supports_keep_text_and_sources() {
        let outcome = normalize(parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Keep me" }] },
                "groundingMetadata": {
                    "groundingChunks": [{ "web": { "title": "A", "uri": "u1" } }],
                    "groundingSupports": [{ "groundingChunkIndices": [0] }]
                }
            }]
        })));

        let result = outcome.into_result();
        assert_eq!(result.text, "Keep me");
        assert_eq!(result.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_invoke_builds_persona_request_with_search_tool() {
        let provider = Arc::new(ScriptedProvider::ok(json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
        })));
        let adapter = GroundingAdapter::new(provider.clone());

        let outcome = adapter
            .invoke(&request(GenerationInput::Prompt("universal basic income".into()), true))
            .await;
        assert_eq!(outcome.result().text, "ok");

        let seen = provider.seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert!(seen[0].web_search);
        assert!(seen[0].system_instruction.contains("Advocate"));
        assert_eq!(seen[0].contents, vec![Message::user("universal basic income")]);
    }

    #[tokio::test]
    async fn test_invoke_passes_conversation_through() {
        let provider = Arc::new(ScriptedProvider::ok(json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
        })));
        let adapter = GroundingAdapter::new(provider.clone());
        let messages = vec![
            Message::user("first"),
            Message { role: MessageRole::Model, content: "reply".into() },
            Message::user("second"),
        ];

        adapter
            .invoke(&request(GenerationInput::Conversation(messages.clone()), false))
            .await;

        let seen = provider.seen.lock().await;
        assert!(!seen[0].web_search);
        assert_eq!(seen[0].contents, messages);
    }

    #[tokio::test]
    async fn test_invoke_converts_provider_error_to_fallback() {
        let adapter = GroundingAdapter::new(Arc::new(ScriptedProvider::failing("quota exceeded")));

        let outcome = adapter
            .invoke(&request(GenerationInput::Prompt("anything".into()), true))
            .await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_result(), GroundingResult::fallback(PROVIDER_ERROR_TEXT));
    }
}
