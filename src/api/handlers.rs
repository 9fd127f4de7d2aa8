//! HTTP request handlers

use super::types::{ErrorResponse, HealthResponse, ProcessRequest, ProcessResponse};
use super::AppState;
use crate::dialogue::{self, ProtocolError, OPENING_PROMPT};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // One dialogue turn
        .route("/process", post(process_turn))
        // Fresh session for a new call
        .route("/reset", post(reset_session))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Dialogue Turns
// ============================================================

async fn process_turn(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        AppError::from(ProtocolError::MalformedUserData(rejection.body_text()))
    })?;
    let session = req.session()?;

    let result = dialogue::advance(&session, &req.input, &state.context);
    tracing::info!(
        from = %session.state,
        to = %result.new_state,
        blank = req.input.trim().is_empty(),
        "Turn processed"
    );

    let (next, reply) = result.into_session();
    Ok(Json(ProcessResponse::new(next, reply)))
}

async fn reset_session() -> Json<ProcessResponse> {
    tracing::debug!("Session reset requested");
    Json(ProcessResponse::new(dialogue::reset(), OPENING_PROMPT))
}

// ============================================================
// Service Info
// ============================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn get_version() -> &'static str {
    concat!("voice-receptionist ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
}

impl From<ProtocolError> for AppError {
    fn from(err: ProtocolError) -> Self {
        tracing::warn!(error = %err, "Rejected turn request");
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
