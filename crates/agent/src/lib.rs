//! Negotiation agent - outbound model calls and request orchestration
//!
//! This crate wires the deterministic pieces from `haggle-core` to the two
//! external collaborators the service depends on:
//! - a sentiment classifier (`sentiment`) mapping free text to a tone bucket
//! - a generative model (`llm`, `gemini`) that writes the counteroffer
//!
//! # Pipeline
//!
//! `NegotiationRuntime::handle` runs each request straight through:
//! 1. **Classify** the user message
//! 2. **Extract** the first number as the offered price (a miss ends the
//!    request with an explanatory reply, no model call)
//! 3. **Synthesize** the sentiment-specific prompt
//! 4. **Negotiate** with the model and return its text verbatim
//!
//! The model only writes prose. Nothing here parses or checks the
//! counteroffer it proposes.

pub mod gemini;
pub mod llm;
pub mod retry;
pub mod runtime;
pub mod sentiment;
