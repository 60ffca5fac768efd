//! Per-agent turn reconstruction for chat mode.
//!
//! Every call is stateless on the server: the caller resends the whole transcript and
//! each agent receives it re-tagged with the two roles the model API understands.
//! Both agents' prior turns become `model` turns, so each agent sees the full exchange
//! as its own prior output. That collapse is preserved as shipped; see DESIGN.md.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::personas::PersonaId;

/// Who spoke a transcript turn, as supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    AgentA,
    AgentB,
}

impl TurnRole {
    /// The agent that spoke this turn, `None` for the user
    pub fn persona(&self) -> Option<PersonaId> {
        match self {
            TurnRole::User => None,
            TurnRole::AgentA => Some(PersonaId::AgentA),
            TurnRole::AgentB => Some(PersonaId::AgentB),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Role as the model API sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("conversation transcript must contain at least one message")]
    EmptyTranscript,
}

/// Re-tag `transcript` for `target`, preserving order exactly.
pub fn build(transcript: &[Turn], target: PersonaId) -> Result<Vec<Message>, ConversationError> {
    if transcript.is_empty() {
        return Err(ConversationError::EmptyTranscript);
    }

    Ok(transcript
        .iter()
        .map(|turn| Message {
            role: role_for(turn.role, target),
            content: turn.content.clone(),
        })
        .collect())
}

fn role_for(role: TurnRole, _target: PersonaId) -> MessageRole {
    match role.persona() {
        None => MessageRole::User,
        // Own turns and the opponent's turns both read as prior model output
        Some(_) => MessageRole::Model,
    }
}
