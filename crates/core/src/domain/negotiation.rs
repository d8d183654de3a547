use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::sentiment::SentimentCategory;
use crate::errors::DomainError;

pub const PRICE_NOT_FOUND_MESSAGE: &str = "Could not extract the user price from the message.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationRequest {
    pub product_price: Decimal,
    pub user_message: String,
}

impl NegotiationRequest {
    pub fn new(product_price: Decimal, user_message: impl Into<String>) -> Self {
        Self { product_price, user_message: user_message.into() }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.product_price <= Decimal::ZERO {
            return Err(DomainError::InvalidRequest(
                "product_price must be greater than zero".to_string(),
            ));
        }
        if self.user_message.trim().is_empty() {
            return Err(DomainError::InvalidRequest("user_message must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationResult {
    pub sentiment: SentimentCategory,
    pub gemini_response: String,
}

/// What a negotiation call hands back to the caller.
///
/// A message without any number is not an error: the caller receives a
/// plain explanatory string instead of a counteroffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NegotiationReply {
    Countered(NegotiationResult),
    PriceNotFound(String),
}

impl NegotiationReply {
    pub fn price_not_found() -> Self {
        Self::PriceNotFound(PRICE_NOT_FOUND_MESSAGE.to_string())
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Countered(_) => "countered",
            Self::PriceNotFound(_) => "price_not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{NegotiationReply, NegotiationRequest, NegotiationResult};
    use crate::domain::sentiment::SentimentCategory;
    use crate::errors::DomainError;

    #[test]
    fn rejects_non_positive_product_price() {
        let request = NegotiationRequest::new(Decimal::ZERO, "I can offer 80");
        assert!(matches!(
            request.validate(),
            Err(DomainError::InvalidRequest(ref message)) if message.contains("product_price")
        ));

        let request = NegotiationRequest::new(Decimal::new(-5, 0), "I can offer 80");
        assert!(request.validate().is_err());
    }

    #[test]
    fn rejects_blank_user_message() {
        let request = NegotiationRequest::new(Decimal::new(100, 0), "   \n");
        assert!(matches!(
            request.validate(),
            Err(DomainError::InvalidRequest(ref message)) if message.contains("user_message")
        ));
    }

    #[test]
    fn request_accepts_json_number_price() {
        let request: NegotiationRequest =
            serde_json::from_value(json!({"product_price": 149.99, "user_message": "hi"}))
                .expect("request should deserialize");
        assert_eq!(request.product_price, Decimal::new(14999, 2));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn countered_reply_serializes_as_flat_object() {
        let reply = NegotiationReply::Countered(NegotiationResult {
            sentiment: SentimentCategory::Neutral,
            gemini_response: "How about $90?".to_string(),
        });
        let value = serde_json::to_value(&reply).expect("serialize");
        assert_eq!(value, json!({"sentiment": "neutral", "gemini_response": "How about $90?"}));
        assert_eq!(reply.outcome(), "countered");
    }

    #[test]
    fn price_not_found_reply_serializes_as_bare_string() {
        let value = serde_json::to_value(NegotiationReply::price_not_found()).expect("serialize");
        assert_eq!(value, json!("Could not extract the user price from the message."));
    }
}
