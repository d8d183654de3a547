//! Domain core for the haggle negotiation service.
//!
//! Holds the request-scoped domain types, the deterministic parts of the
//! negotiation pipeline (price extraction and prompt synthesis), layered
//! configuration and the error taxonomy shared by every boundary.

pub mod config;
pub mod domain;
pub mod errors;
pub mod price;
pub mod prompt;

pub use domain::negotiation::{
    NegotiationReply, NegotiationRequest, NegotiationResult, PRICE_NOT_FOUND_MESSAGE,
};
pub use domain::sentiment::SentimentCategory;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use price::extract_price;
pub use prompt::{build_prompt, context_line, SYSTEM_INSTRUCTION};
