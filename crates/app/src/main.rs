use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use engine::{AiEngine, GeminiProvider, GroqProvider, Ledger, SheetsLedger};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "duitku={level},telegram_bot={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let client = reqwest::Client::new();

    let ledger = Ledger::Sheets(SheetsLedger::new(
        client.clone(),
        settings.ledger.spreadsheet_id,
        settings.ledger.sheet_name,
        settings.ledger.token,
    ));

    let primary = settings
        .ai
        .google_api_key
        .map(|key| GeminiProvider::new(client.clone(), key));
    let fallback = settings
        .ai
        .groq_api_key
        .map(|key| GroqProvider::new(client.clone(), key));
    if primary.is_none() && fallback.is_none() {
        tracing::warn!("no AI provider configured, extraction will fail");
    }

    let mut builder = AiEngine::builder()
        .ledger(ledger)
        .primary_provider(primary)
        .fallback_provider(fallback);
    if let Some(ttl) = settings.ai.cache_ttl_secs {
        builder = builder.cache_ttl(Duration::from_secs(ttl));
    }
    let engine = Arc::new(builder.build()?);

    // Reports for webhook-ingested transactions flow from the server task
    // to the bot task over this channel.
    let (notify_tx, notify_rx) = mpsc::channel(32);

    if let Some(server) = settings.server {
        let state = server::ServerState {
            engine: Arc::clone(&engine),
            webhook_secret: server.webhook_secret,
            notifications: notify_tx,
        };
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(state, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    if let Some(telegram) = settings.telegram {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            tracing::info!("Found telegram settings...");
            match telegram_bot::Bot::builder()
                .token(&telegram.token)
                .allowed_users(telegram.allowed_users)
                .engine(engine)
                .build()
            {
                Ok(bot) => bot.run(notify_rx).await,
                Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}
