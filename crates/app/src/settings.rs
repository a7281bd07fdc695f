//! Handles settings for the application. Configuration is written in
//! `settings.toml` and can be overridden with `DUITKU__`-prefixed
//! environment variables (e.g. `DUITKU__AI__GROQ_API_KEY`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct LedgerSettings {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct AiSettings {
    pub google_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    /// Account cache lifetime in seconds.
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramSettings {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub bind: Option<String>,
    pub port: u16,
    pub webhook_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub ledger: LedgerSettings,
    pub ai: AiSettings,
    pub telegram: Option<TelegramSettings>,
    pub server: Option<ServerSettings>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("DUITKU").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
