//! The module contains the errors the engine can throw.
//!
//! The errors are layered:
//!
//! - [`ProviderError`] for failures talking to an AI provider.
//! - [`LedgerError`] for failures talking to the ledger backend.
//! - [`EngineError`] for everything the engine surfaces to callers.
use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by a single AI provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider is not configured")]
    NotConfigured,
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error("provider returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("provider returned an empty response")]
    EmptyResponse,
    #[error("operation not supported by this provider")]
    Unsupported,
}

/// Errors returned by the ledger backend.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error("ledger API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("all providers failed (primary: {primary}; fallback: {fallback})")]
    ProvidersExhausted { primary: String, fallback: String },
    #[error("no AI provider is configured")]
    NoProvider,
    #[error("could not parse provider output: {0}")]
    Parse(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("the ledger has no entries")]
    EmptyLedger,
    #[error("configuration error: {0}")]
    Config(String),
}
