//! # Personas Feature
//!
//! Advocate and skeptic persona definitions for the two debate agents.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod manager;

pub use manager::{GenerationParams, Persona, PersonaId, PersonaRegistry, Stance};
