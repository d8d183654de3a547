//! Negotiation HTTP surface.
//!
//! - `GET  /`: static welcome payload
//! - `POST /negotiate`: run one negotiation exchange (also `/negotiate/`)

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use haggle_agent::runtime::NegotiationRuntime;
use haggle_core::{ApplicationError, DomainError, InterfaceError, NegotiationReply, NegotiationRequest};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const WELCOME_MESSAGE: &str = "Welcome to the Gemini LLM Negotiation Chatbot!";

#[derive(Clone)]
pub struct NegotiationState {
    runtime: NegotiationRuntime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

pub fn router(runtime: NegotiationRuntime) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/negotiate", post(negotiate))
        .route("/negotiate/", post(negotiate))
        .with_state(NegotiationState { runtime })
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse { message: WELCOME_MESSAGE.to_string() })
}

async fn negotiate(
    State(state): State<NegotiationState>,
    payload: Result<Json<NegotiationRequest>, JsonRejection>,
) -> Result<Json<NegotiationReply>, (StatusCode, Json<ErrorResponse>)> {
    let correlation_id = Uuid::new_v4().to_string();

    let Json(request) = payload.map_err(|rejection| {
        let error = ApplicationError::from(DomainError::InvalidRequest(rejection.body_text()));
        error_response(error.into_interface(correlation_id.as_str()))
    })?;

    info!(
        event_name = "http.negotiate.received",
        correlation_id = %correlation_id,
        product_price = %request.product_price,
        message_chars = request.user_message.chars().count(),
        "negotiation request received"
    );

    let reply = state
        .runtime
        .handle(&request, &correlation_id)
        .await
        .map_err(|error| error_response(error.into_interface(correlation_id.as_str())))?;

    info!(
        event_name = "http.negotiate.completed",
        correlation_id = %correlation_id,
        outcome = reply.outcome(),
        "negotiation request completed"
    );

    Ok(Json(reply))
}

fn error_response(error: InterfaceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        InterfaceError::BadRequest { .. } => {
            warn!(
                event_name = "http.negotiate.rejected",
                correlation_id = %error.correlation_id(),
                error = %error,
                "negotiation request rejected"
            );
            StatusCode::BAD_REQUEST
        }
        InterfaceError::ServiceUnavailable { .. } => {
            error!(
                event_name = "http.negotiate.upstream_failed",
                correlation_id = %error.correlation_id(),
                error = %error,
                "negotiation upstream dependency failed"
            );
            StatusCode::SERVICE_UNAVAILABLE
        }
        InterfaceError::Internal { .. } => {
            error!(
                event_name = "http.negotiate.internal_error",
                correlation_id = %error.correlation_id(),
                error = %error,
                "negotiation failed internally"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: error.user_message().to_string(),
            detail: error.message().to_string(),
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}
