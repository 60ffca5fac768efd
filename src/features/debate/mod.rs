//! # Debate Feature
//!
//! Runs the advocate and the skeptic concurrently on one prompt or transcript.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Chat mode with per-agent transcripts, task-isolated agents
//! - 1.0.0: Initial single-prompt debates

pub mod orchestrator;

pub use orchestrator::{DebateResult, DualAgentOrchestrator, OrchestratorError};
