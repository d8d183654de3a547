use axum::Router;
use haggle_agent::runtime::NegotiationRuntime;
use haggle_core::config::{AppConfig, ConfigError, LoadOptions};
use thiserror::Error;
use tracing::info;

use crate::{health, negotiate};

pub struct Application {
    pub config: AppConfig,
    pub runtime: NegotiationRuntime,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("negotiation runtime could not be built: {0}")]
    Runtime(String),
}

impl Application {
    pub fn router(&self) -> Router {
        negotiate::router(self.runtime.clone())
            .merge(health::router(self.runtime.classifier_name(), self.config.llm.model.clone()))
    }
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let runtime = NegotiationRuntime::from_config(&config)
        .map_err(|error| BootstrapError::Runtime(format!("{error:#}")))?;

    info!(
        event_name = "system.bootstrap.runtime_ready",
        correlation_id = "bootstrap",
        classifier = runtime.classifier_name(),
        llm_model = %config.llm.model,
        "negotiation runtime constructed"
    );

    Ok(Application { config, runtime })
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use haggle_core::config::{ClassifierProvider, ConfigOverrides, LoadOptions};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::bootstrap::bootstrap;

    fn lexicon_overrides(api_key: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                llm_api_key: Some(api_key.to_string()),
                classifier_provider: Some(ClassifierProvider::Lexicon),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[test]
    fn bootstrap_fails_fast_without_llm_key() {
        let result = bootstrap(lexicon_overrides("   "));

        assert!(result.is_err());
        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("llm.api_key"), "unexpected error: {message}");
    }

    #[tokio::test]
    async fn bootstrapped_router_serves_health_and_welcome() {
        let app = bootstrap(lexicon_overrides("test-key")).expect("bootstrap should succeed");
        assert_eq!(app.runtime.classifier_name(), "lexicon");

        let response = app
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(payload["classifier"]["detail"], "lexicon sentiment classifier");

        let response = app
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
