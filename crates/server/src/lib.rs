use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, run_with_listener, spawn_with_listener};

mod server;
mod webhook;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::ProvidersExhausted { .. } | EngineError::NoProvider => StatusCode::BAD_GATEWAY,
        EngineError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Ledger(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::EmptyLedger => StatusCode::NOT_FOUND,
        EngineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Ledger(ledger_err) => {
            tracing::error!("ledger error: {ledger_err}");
            "ledger unavailable".to_string()
        }
        EngineError::Config(config_err) => {
            tracing::error!("configuration error: {config_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
