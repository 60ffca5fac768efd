//! # Features
//!
//! Each feature is self-contained and depends only on `core` and the features it names.
//!
//! | Feature | Purpose |
//! |---------|---------|
//! | `personas` | Advocate and skeptic definitions |
//! | `conversation` | Per-agent chat transcripts |
//! | `citations` | Inline citation markers |
//! | `grounding` | Gemini calls with Google Search grounding |
//! | `debate` | Concurrent dual-agent orchestration |
//! | `speech` | Optional text-to-speech |

pub mod citations;
pub mod conversation;
pub mod debate;
pub mod grounding;
pub mod personas;
pub mod speech;

pub use debate::{DebateResult, DualAgentOrchestrator, OrchestratorError};
pub use grounding::{GeminiClient, GroundingAdapter, GroundingResult, ModelProvider, Source};
pub use personas::{Persona, PersonaId, PersonaRegistry};
pub use speech::{SpeechResult, SpeechSynthesizer};
