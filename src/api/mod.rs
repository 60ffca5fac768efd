//! # API Module
//!
//! HTTP surface for the web client.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Chat, personas, and speech endpoints
//! - 1.0.0: Initial axum server replacing the local socket protocol

pub mod protocol;
pub mod server;

pub use protocol::{
    ChatRequest, DebateRequest, DebateResponse, InitiateDebateRequest, InitiateDebateResponse,
    PersonaSummary, SpeechRequest,
};
pub use server::{build_router, serve, AppState};
