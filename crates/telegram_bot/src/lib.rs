//! Telegram bot.
//!
//! The bot is the interactive surface: free-text transactions, receipt
//! photos, voice notes, and the maintenance commands all arrive here and go
//! straight to the shared engine.

use std::sync::Arc;

use teloxide::prelude::*;
use tokio::sync::mpsc;

use engine::AiEngine;

mod commands;
mod handlers;
mod ui;

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    engine: Arc<AiEngine>,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    engine: Arc<AiEngine>,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// Run the dispatcher until shutdown.
    ///
    /// `notifications` carries reports from the webhook side; each one is
    /// fanned out to every allow-listed user.
    pub async fn run(self, mut notifications: mpsc::Receiver<String>) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let fan_out_bot = bot.clone();
        let fan_out_users = self.allowed_users.clone().unwrap_or_default();
        tokio::spawn(async move {
            while let Some(report) = notifications.recv().await {
                for user_id in &fan_out_users {
                    let chat_id = ChatId(user_id.0 as i64);
                    if let Err(err) = fan_out_bot
                        .send_message(chat_id, format!("📩 Notif Masuk:\n{report}"))
                        .await
                    {
                        tracing::error!("failed to notify user {user_id}: {err}");
                    }
                }
            }
        });

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users,
            engine: self.engine,
        };

        let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    engine: Option<Arc<AiEngine>>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn allowed_users(mut self, allowed_users: Vec<u64>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users.into_iter().map(UserId).collect());
        }
        self
    }

    pub fn engine(mut self, engine: Arc<AiEngine>) -> BotBuilder {
        self.engine = Some(engine);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("telegram token is required".to_string());
        }
        let engine = self.engine.ok_or_else(|| "engine is required".to_string())?;
        Ok(Bot {
            token: self.token,
            allowed_users: self.allowed_users,
            engine,
        })
    }
}
