//! # API Protocol
//!
//! JSON request and response bodies for the HTTP surface. Field names are the
//! wire contract the web client depends on.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::conversation::Turn;
use crate::features::debate::DebateResult;
use crate::features::grounding::Source;
use crate::features::personas::{Persona, PersonaId, Stance};

fn default_use_search() -> bool {
    true
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRequest {
    pub prompt: String,
    #[serde(default = "default_use_search")]
    pub use_search: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Turn>,
    #[serde(default = "default_use_search")]
    pub use_search: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateDebateRequest {
    pub user_policy_prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default)]
    pub agent: Option<PersonaId>,
    #[serde(default)]
    pub voice_id: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// Flattened per-agent results, the same shape for debate and chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateResponse {
    pub agent_a_response: String,
    pub agent_b_response: String,
    pub agent_a_sources: Vec<Source>,
    pub agent_b_sources: Vec<Source>,
    pub agent_a_search_queries: Vec<String>,
    pub agent_b_search_queries: Vec<String>,
}

impl From<DebateResult> for DebateResponse {
    fn from(result: DebateResult) -> Self {
        let DebateResult { agent_a, agent_b } = result;
        DebateResponse {
            agent_a_response: agent_a.text,
            agent_b_response: agent_b.text,
            agent_a_sources: agent_a.sources,
            agent_b_sources: agent_b.sources,
            agent_a_search_queries: agent_a.search_queries,
            agent_b_search_queries: agent_b.search_queries,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateDebateResponse {
    pub debate_id: Uuid,
    pub agent_a_persona: String,
    pub agent_b_persona: String,
}

/// Public view of a persona; the system instruction stays server-side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSummary {
    pub id: PersonaId,
    pub stance: Stance,
    pub name: String,
    pub description: String,
}

impl From<&Persona> for PersonaSummary {
    fn from(persona: &Persona) -> Self {
        PersonaSummary {
            id: persona.id,
            stance: persona.stance,
            name: persona.name.clone(),
            description: persona.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub speech_enabled: bool,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::grounding::GroundingResult;

    #[test]
    fn test_use_search_defaults_to_true() {
        let request: DebateRequest = serde_json::from_str(r#"{"prompt":"rent control"}"#).unwrap();
        assert!(request.use_search);

        let request: ChatRequest =
            serde_json::from_str(r#"{"messages":[],"use_search":false}"#).unwrap();
        assert!(!request.use_search);
        assert!(request.messages.is_empty());
    }

    #[test]
    fn test_speech_request_agent_is_optional() {
        let request: SpeechRequest =
            serde_json::from_str(r#"{"text":"hi","agent":"agent_b"}"#).unwrap();
        assert_eq!(request.agent, Some(PersonaId::AgentB));
        assert!(request.voice_id.is_none());

        let request: SpeechRequest = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert!(request.agent.is_none());
    }

    #[test]
    fn test_debate_response_flattens_both_agents() {
        let result = DebateResult {
            agent_a: GroundingResult {
                text: "pro".into(),
                sources: vec![Source {
                    title: "IEA".into(),
                    uri: "https://iea.org".into(),
                }],
                search_queries: vec!["solar costs".into()],
            },
            agent_b: GroundingResult::fallback("con"),
        };

        let json = serde_json::to_value(DebateResponse::from(result)).unwrap();
        assert_eq!(json["agent_a_response"], "pro");
        assert_eq!(json["agent_b_response"], "con");
        assert_eq!(json["agent_a_sources"][0]["title"], "IEA");
        assert_eq!(json["agent_a_search_queries"][0], "solar costs");
        assert_eq!(json["agent_b_sources"].as_array().unwrap().len(), 0);
        assert_eq!(json["agent_b_search_queries"].as_array().unwrap().len(), 0);
    }
}
