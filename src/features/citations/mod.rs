//! # Citations Feature
//!
//! Rewrites generated text with bracketed citation markers from grounding spans.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Offsets are counted in characters; malformed supports no longer drop the response
//! - 1.0.0: Initial release

pub mod reconciler;

pub use reconciler::{reconcile, reconcile_supports, spans_from_supports, CitationError, CitationSpan};
