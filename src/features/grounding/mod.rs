//! # Grounding Feature
//!
//! Single-persona model calls with optional Google Search grounding, normalized into
//! text plus sources and search queries.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod adapter;
pub mod provider;

pub use adapter::{
    normalize, AgentOutcome, GenerationInput, GenerationRequest, GroundingAdapter, GroundingResult,
    Source, EMPTY_RESPONSE_TEXT, PROVIDER_ERROR_TEXT,
};
pub use provider::{GeminiClient, ModelProvider, ModelRequest, ProviderResponse};
