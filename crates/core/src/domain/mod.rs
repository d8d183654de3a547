pub mod negotiation;
pub mod sentiment;
