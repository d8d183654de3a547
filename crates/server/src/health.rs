use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct HealthState {
    classifier_backend: &'static str,
    llm_model: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: HealthCheck,
    pub classifier: HealthCheck,
    pub llm: HealthCheck,
    pub checked_at: String,
}

pub fn router(classifier_backend: &'static str, llm_model: impl Into<String>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { classifier_backend, llm_model: llm_model.into() })
}

/// Liveness only: reports what the process was configured with, without
/// calling out to either model.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready".to_string(),
        service: HealthCheck {
            status: "ready".to_string(),
            detail: "haggle-server runtime initialized".to_string(),
        },
        classifier: HealthCheck {
            status: "configured".to_string(),
            detail: format!("{} sentiment classifier", state.classifier_backend),
        },
        llm: HealthCheck {
            status: "configured".to_string(),
            detail: format!("model `{}`", state.llm_model),
        },
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_reports_configured_backends() {
        let (status, Json(payload)) = health(State(HealthState {
            classifier_backend: "lexicon",
            llm_model: "gemini-1.5-flash".to_string(),
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.service.status, "ready");
        assert_eq!(payload.classifier.detail, "lexicon sentiment classifier");
        assert_eq!(payload.llm.detail, "model `gemini-1.5-flash`");
        assert!(!payload.checked_at.is_empty());
    }
}
