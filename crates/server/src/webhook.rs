//! Webhook ingestion: forwarded phone notifications land here.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use engine::{CommitOutcome, Provider, Source, render_report};

use crate::{ServerError, ServerState};

#[derive(Debug, Deserialize)]
pub(crate) struct WebhookPayload {
    #[serde(default)]
    text: String,
}

/// `POST /webhook/ingest`
///
/// Accepts `{"text": "..."}`, runs the commit flow, and on success pushes
/// the rendered report onto the notification channel. Empty input and
/// empty extraction results are acknowledged silently so ambient
/// notification forwarders never trigger error spam.
pub(crate) async fn ingest<P, F>(
    State(state): State<ServerState<P, F>>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<Value>, ServerError>
where
    P: Provider + 'static,
    F: Provider + 'static,
{
    if payload.text.trim().is_empty() {
        return Ok(Json(json!({ "status": "ignored", "message": "Empty text" })));
    }

    let outcome = state
        .engine
        .commit(&payload.text, None, Source::Webhook)
        .await?;

    match outcome {
        CommitOutcome::NoTransactions => {
            tracing::info!("ignored empty transaction from webhook");
            Ok(Json(json!({ "status": "ignored", "message": "No transactions" })))
        }
        CommitOutcome::Saved {
            provider,
            transactions,
        } => {
            let report = render_report(provider, Source::Webhook, &transactions);
            if let Err(err) = state.notifications.send(report.clone()).await {
                tracing::warn!("failed to queue webhook notification: {err}");
            }
            Ok(Json(json!({ "status": "success", "result": report })))
        }
    }
}
