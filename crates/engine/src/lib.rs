//! Core engine: AI extraction, account resolution, balances, and the
//! commit flow onto a spreadsheet-like ledger.

use std::time::Duration;

pub use ai::{Extractor, GeminiProvider, GroqProvider, ImageData, Provider, prompt};
pub use categories::Category;
pub use error::{EngineError, LedgerError, ProviderError};
pub use ledger::{Ledger, MemoryLedger, SheetsLedger};
pub use ops::{
    BalanceAdjustment, BalanceSummary, CORRECTION_DESCRIPTION, CommitOutcome, Source, UndoneEntry,
    render_report,
};
pub use record::{Direction, LEDGER_COLUMNS, Transaction};
pub use resolver::{AccountResolver, DEFAULT_CACHE_TTL};
pub use util::format_rupiah;

pub mod ai;
mod categories;
mod error;
mod ledger;
mod ops;
mod record;
mod resolver;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

/// The engine wired for production providers.
pub type AiEngine = Engine<GeminiProvider, GroqProvider>;

/// Facade over the ledger, the account resolver, and the provider chain.
#[derive(Clone, Debug)]
pub struct Engine<P, F> {
    ledger: Ledger,
    resolver: AccountResolver,
    extractor: Extractor<P, F>,
}

impl<P: Provider, F: Provider> Engine<P, F> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<P, F> {
        EngineBuilder::default()
    }

    /// Transcribe a voice note to text.
    pub async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> ResultEngine<String> {
        self.extractor.transcribe(audio, filename).await
    }
}

/// The builder for `Engine`
pub struct EngineBuilder<P, F> {
    ledger: Option<Ledger>,
    primary: Option<P>,
    fallback: Option<F>,
    cache_ttl: Duration,
}

impl<P, F> Default for EngineBuilder<P, F> {
    fn default() -> Self {
        Self {
            ledger: None,
            primary: None,
            fallback: None,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl<P: Provider, F: Provider> EngineBuilder<P, F> {
    /// Pass the required ledger backend.
    pub fn ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn primary_provider(mut self, provider: Option<P>) -> Self {
        self.primary = provider;
        self
    }

    pub fn fallback_provider(mut self, provider: Option<F>) -> Self {
        self.fallback = provider;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Construct `Engine`.
    pub fn build(self) -> ResultEngine<Engine<P, F>> {
        let ledger = self
            .ledger
            .ok_or_else(|| EngineError::Config("a ledger backend is required".to_string()))?;
        let resolver = AccountResolver::new(ledger.clone(), self.cache_ttl);
        Ok(Engine {
            ledger,
            resolver,
            extractor: Extractor::new(self.primary, self.fallback),
        })
    }
}
