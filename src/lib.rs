// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// API layer - HTTP surface for the web client
pub mod api;

// Re-export core config
pub use core::Config;

// Re-export feature items
pub use features::{
    // Debate
    DebateResult, DualAgentOrchestrator, OrchestratorError,
    // Grounding
    GeminiClient, GroundingAdapter, GroundingResult, ModelProvider, Source,
    // Personas
    Persona, PersonaId, PersonaRegistry,
    // Speech
    SpeechResult, SpeechSynthesizer,
};

// Re-export API items
pub use api::{build_router, serve, AppState};
