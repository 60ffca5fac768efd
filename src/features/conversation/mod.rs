//! # Conversation Feature
//!
//! Maps the shared chat transcript onto each agent's own user/model turn sequence.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false

pub mod builder;

pub use builder::{build, ConversationError, Message, MessageRole, Turn, TurnRole};
