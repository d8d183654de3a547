use std::sync::Arc;

use anyhow::Result;
use haggle_core::config::AppConfig;
use haggle_core::{
    build_prompt, context_line, extract_price, ApplicationError, NegotiationReply,
    NegotiationRequest, NegotiationResult, SentimentCategory, SYSTEM_INSTRUCTION,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::gemini::GeminiClient;
use crate::llm::{CompletionRequest, LlmClient};
use crate::sentiment::{classifier_from_config, SentimentClassifier};

/// Request handler for one negotiation exchange.
///
/// Holds no per-request state; a single instance is shared across
/// concurrent requests.
#[derive(Clone)]
pub struct NegotiationRuntime {
    classifier: Arc<dyn SentimentClassifier>,
    llm: Arc<dyn LlmClient>,
}

impl NegotiationRuntime {
    pub fn new(classifier: Arc<dyn SentimentClassifier>, llm: Arc<dyn LlmClient>) -> Self {
        Self { classifier, llm }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let classifier: Arc<dyn SentimentClassifier> =
            Arc::from(classifier_from_config(&config.classifier)?);
        let llm: Arc<dyn LlmClient> = Arc::new(GeminiClient::from_config(&config.llm)?);
        Ok(Self::new(classifier, llm))
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub async fn handle(
        &self,
        request: &NegotiationRequest,
        correlation_id: &str,
    ) -> Result<NegotiationReply, ApplicationError> {
        request.validate()?;

        let sentiment = self
            .classifier
            .classify(&request.user_message)
            .await
            .map_err(|error| ApplicationError::Classifier(format!("{error:#}")))?;

        let Some(user_price) = extract_price(&request.user_message) else {
            info!(
                event_name = "negotiation.price_not_found",
                correlation_id = %correlation_id,
                sentiment = %sentiment,
                message_chars = request.user_message.chars().count(),
                "no price in user message, skipping llm call"
            );
            return Ok(NegotiationReply::price_not_found());
        };

        let prompt = build_prompt(request.product_price, user_price, sentiment);
        let gemini_response = self
            .negotiate(request.product_price, user_price, sentiment, &prompt)
            .await
            .map_err(|error| {
                warn!(
                    event_name = "negotiation.provider_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "llm provider call failed"
                );
                ApplicationError::Provider(format!("{error:#}"))
            })?;

        info!(
            event_name = "negotiation.countered",
            correlation_id = %correlation_id,
            sentiment = %sentiment,
            product_price = %request.product_price,
            user_price = %user_price,
            response_chars = gemini_response.chars().count(),
            "counteroffer generated"
        );

        Ok(NegotiationReply::Countered(NegotiationResult { sentiment, gemini_response }))
    }

    /// Sends the synthesized prompt, primed with a structured context turn.
    pub async fn negotiate(
        &self,
        product_price: Decimal,
        user_price: Decimal,
        sentiment: SentimentCategory,
        prompt: &str,
    ) -> Result<String> {
        let request = CompletionRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            context: vec![context_line(product_price, user_price, sentiment)],
            prompt: prompt.to_string(),
        };
        self.llm.complete(&request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use haggle_core::{
        ApplicationError, NegotiationReply, NegotiationRequest, SentimentCategory,
        PRICE_NOT_FOUND_MESSAGE, SYSTEM_INSTRUCTION,
    };
    use rust_decimal::Decimal;

    use super::NegotiationRuntime;
    use crate::llm::{CompletionRequest, LlmClient};
    use crate::sentiment::{LexiconClassifier, SentimentClassifier};

    #[derive(Default)]
    struct RecordingLlm {
        calls: AtomicUsize,
        last_request: Mutex<Option<CompletionRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut slot) = self.last_request.lock() {
                *slot = Some(request.clone());
            }
            if self.fail {
                return Err(anyhow!("gemini api error (HTTP 503): overloaded"));
            }
            Ok("I appreciate your interest. How about $90?".to_string())
        }
    }

    struct FixedClassifier(Option<SentimentCategory>);

    #[async_trait]
    impl SentimentClassifier for FixedClassifier {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn classify(&self, _text: &str) -> Result<SentimentCategory> {
            self.0.ok_or_else(|| anyhow!("model not loaded"))
        }
    }

    fn runtime_with(
        classifier: Arc<dyn SentimentClassifier>,
        llm: Arc<RecordingLlm>,
    ) -> NegotiationRuntime {
        NegotiationRuntime::new(classifier, llm)
    }

    fn request(price: i64, message: &str) -> NegotiationRequest {
        NegotiationRequest::new(Decimal::new(price, 0), message)
    }

    #[tokio::test]
    async fn neutral_offer_produces_counteroffer() {
        let llm = Arc::new(RecordingLlm::default());
        let runtime = runtime_with(Arc::new(LexiconClassifier::new()), llm.clone());

        let reply = runtime
            .handle(&request(100, "I can offer 80, seems fair"), "req-1")
            .await
            .expect("negotiation should succeed");

        let NegotiationReply::Countered(result) = reply else {
            panic!("expected a counteroffer");
        };
        assert_eq!(result.sentiment, SentimentCategory::Neutral);
        assert!(!result.gemini_response.is_empty());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);

        let sent = llm.last_request.lock().expect("lock").clone().expect("request recorded");
        assert_eq!(sent.system_instruction, SYSTEM_INSTRUCTION);
        assert_eq!(sent.context.len(), 1);
        assert_eq!(sent.context[0], "price: $100\nuser_price: $80\nsentiment: \"neutral\"");
        assert!(sent.prompt.starts_with("The user made a neutral offer of $80"));
        assert!(sent.prompt.contains("priced at $100"));
    }

    #[tokio::test]
    async fn message_without_digits_never_calls_llm() {
        let llm = Arc::new(RecordingLlm::default());
        let runtime = runtime_with(Arc::new(LexiconClassifier::new()), llm.clone());

        let reply = runtime
            .handle(&request(100, "no numbers here"), "req-2")
            .await
            .expect("extraction miss is not an error");

        assert_eq!(reply, NegotiationReply::PriceNotFound(PRICE_NOT_FOUND_MESSAGE.to_string()));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_number_is_used_as_offer() {
        let llm = Arc::new(RecordingLlm::default());
        let runtime = runtime_with(
            Arc::new(FixedClassifier(Some(SentimentCategory::Negative))),
            llm.clone(),
        );

        runtime.handle(&request(100, "I'll pay 45 not 50"), "req-3").await.expect("success");

        let sent = llm.last_request.lock().expect("lock").clone().expect("request recorded");
        assert!(sent.prompt.contains("offering $45"));
        assert!(!sent.prompt.contains("$50"));
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_provider_error() {
        let llm = Arc::new(RecordingLlm { fail: true, ..RecordingLlm::default() });
        let runtime = runtime_with(Arc::new(LexiconClassifier::new()), llm);

        let error = runtime
            .handle(&request(100, "I can offer 80"), "req-4")
            .await
            .expect_err("provider failure must propagate");

        assert!(matches!(error, ApplicationError::Provider(ref message) if message.contains("503")));
    }

    #[tokio::test]
    async fn classifier_failure_is_hard_failure() {
        let llm = Arc::new(RecordingLlm::default());
        let runtime = runtime_with(Arc::new(FixedClassifier(None)), llm.clone());

        let error = runtime
            .handle(&request(100, "I can offer 80"), "req-5")
            .await
            .expect_err("classifier failure must propagate");

        assert!(matches!(error, ApplicationError::Classifier(_)));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_pipeline() {
        let llm = Arc::new(RecordingLlm::default());
        let runtime = runtime_with(Arc::new(FixedClassifier(None)), llm.clone());

        let error = runtime
            .handle(&request(0, "I can offer 80"), "req-6")
            .await
            .expect_err("zero price is invalid");

        assert!(matches!(error, ApplicationError::Domain(_)));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }
}
