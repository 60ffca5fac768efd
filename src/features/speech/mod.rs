//! # Speech Feature
//!
//! Optional text-to-speech for agent responses.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true

pub mod synthesizer;

pub use synthesizer::{SpeechResult, SpeechSynthesizer};
