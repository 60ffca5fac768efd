//! # Debate Orchestrator
//!
//! Runs the advocate and the skeptic side by side on the same input and joins both
//! results. Each agent runs in its own task; one agent degrading or failing never
//! cancels or hides the other.

use log::{error, info};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::features::conversation::{self, ConversationError, Turn};
use crate::features::grounding::{
    AgentOutcome, GenerationInput, GenerationRequest, GroundingAdapter, GroundingResult,
};
use crate::features::personas::{PersonaId, PersonaRegistry};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("messages must not be empty")]
    EmptyTranscript,

    /// An agent task died outside the adapter's own fault handling
    #[error("agent task failed: {0}")]
    AgentTask(String),
}

impl From<ConversationError> for OrchestratorError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::EmptyTranscript => OrchestratorError::EmptyTranscript,
        }
    }
}

/// Both agents' results, always in agent order
#[derive(Debug, Clone, PartialEq)]
pub struct DebateResult {
    pub agent_a: GroundingResult,
    pub agent_b: GroundingResult,
}

/// Fans one input out to both personas and fans the two results back in
pub struct DualAgentOrchestrator {
    adapter: Arc<GroundingAdapter>,
    personas: Arc<PersonaRegistry>,
}

impl DualAgentOrchestrator {
    pub fn new(adapter: Arc<GroundingAdapter>, personas: Arc<PersonaRegistry>) -> Self {
        Self { adapter, personas }
    }

    /// Debate mode: both agents answer the same prompt
    pub async fn run_debate(
        &self,
        prompt: &str,
        grounding_enabled: bool,
    ) -> Result<DebateResult, OrchestratorError> {
        let request_id = Uuid::new_v4();
        info!(
            "[{request_id}] Starting debate | grounding: {grounding_enabled} | prompt: '{}'",
            prompt.chars().take(100).collect::<String>()
        );

        let input = GenerationInput::Prompt(prompt.to_string());
        self.fan_out(request_id, input.clone(), input, grounding_enabled)
            .await
    }

    /// Chat mode: each agent gets the transcript re-tagged from its own side
    pub async fn run_chat(
        &self,
        transcript: &[Turn],
        grounding_enabled: bool,
    ) -> Result<DebateResult, OrchestratorError> {
        let request_id = Uuid::new_v4();

        let messages_a = conversation::build(transcript, PersonaId::AgentA)?;
        let messages_b = conversation::build(transcript, PersonaId::AgentB)?;

        info!(
            "[{request_id}] Starting chat | grounding: {grounding_enabled} | turns: {}",
            transcript.len()
        );

        self.fan_out(
            request_id,
            GenerationInput::Conversation(messages_a),
            GenerationInput::Conversation(messages_b),
            grounding_enabled,
        )
        .await
    }

    async fn fan_out(
        &self,
        request_id: Uuid,
        input_a: GenerationInput,
        input_b: GenerationInput,
        grounding_enabled: bool,
    ) -> Result<DebateResult, OrchestratorError> {
        let start_time = Instant::now();

        let task_a = self.spawn_agent(request_id, PersonaId::AgentA, input_a, grounding_enabled);
        let task_b = self.spawn_agent(request_id, PersonaId::AgentB, input_b, grounding_enabled);

        // Wait for both before looking at either
        let (joined_a, joined_b) = tokio::join!(task_a, task_b);
        let outcome_a = Self::unwrap_joined(request_id, PersonaId::AgentA, joined_a)?;
        let outcome_b = Self::unwrap_joined(request_id, PersonaId::AgentB, joined_b)?;

        info!(
            "[{request_id}] Both agents finished after {:?} | agent_a fallback: {} | agent_b fallback: {}",
            start_time.elapsed(),
            outcome_a.is_fallback(),
            outcome_b.is_fallback()
        );

        Ok(DebateResult {
            agent_a: outcome_a.into_result(),
            agent_b: outcome_b.into_result(),
        })
    }

    fn spawn_agent(
        &self,
        request_id: Uuid,
        agent: PersonaId,
        input: GenerationInput,
        grounding_enabled: bool,
    ) -> JoinHandle<AgentOutcome> {
        let adapter = Arc::clone(&self.adapter);
        let request = GenerationRequest {
            request_id,
            input,
            persona: self.personas.get(agent).clone(),
            grounding_enabled,
        };

        tokio::spawn(async move { adapter.invoke(&request).await })
    }

    fn unwrap_joined(
        request_id: Uuid,
        agent: PersonaId,
        joined: Result<AgentOutcome, tokio::task::JoinError>,
    ) -> Result<AgentOutcome, OrchestratorError> {
        joined.map_err(|e| {
            error!("[{request_id}] {agent} task failed: {e}");
            OrchestratorError::AgentTask(format!("{agent}: {e}"))
        })
    }
}
