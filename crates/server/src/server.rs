use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use serde_json::json;

use std::sync::Arc;

use crate::webhook;
use engine::{Engine, Provider};
use tokio::sync::mpsc;

static SECRET_TOKEN_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-secret-token");

pub struct ServerState<P, F> {
    pub engine: Arc<Engine<P, F>>,
    pub webhook_secret: String,
    /// Rendered reports are pushed here; the bot side fans them out to
    /// allow-listed users.
    pub notifications: mpsc::Sender<String>,
}

// Manual impl: `#[derive(Clone)]` would demand P: Clone and F: Clone.
impl<P, F> Clone for ServerState<P, F> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            webhook_secret: self.webhook_secret.clone(),
            notifications: self.notifications.clone(),
        }
    }
}

/// `TypedHeader` for the webhook shared secret.
///
/// Webhook requests must carry an "x-secret-token" entry in the header.
#[derive(Debug)]
struct SecretToken(String);

impl Header for SecretToken {
    fn name() -> &'static axum::http::HeaderName {
        &SECRET_TOKEN_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };

        Ok(SecretToken(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-secret-token header"),
        }
    }
}

async fn auth<P, F>(
    secret_header: TypedHeader<SecretToken>,
    State(state): State<ServerState<P, F>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    P: Provider + 'static,
    F: Provider + 'static,
{
    if secret_header.0.0 != state.webhook_secret {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "running" }))
}

pub(crate) fn router<P, F>(state: ServerState<P, F>) -> Router
where
    P: Provider + 'static,
    F: Provider + 'static,
{
    Router::new()
        .route("/webhook/ingest", post(webhook::ingest::<P, F>))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::<P, F>))
        .route("/", get(root))
        .with_state(state)
}

pub async fn run_with_listener<P, F>(
    state: ServerState<P, F>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error>
where
    P: Provider + 'static,
    F: Provider + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener<P, F>(
    state: ServerState<P, F>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error>
where
    P: Provider + 'static,
    F: Provider + 'static,
{
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
