//! Account-name resolution with a TTL cache.
//!
//! Account names are free text typed by the user ("bca", "gopay", "dompet
//! bapak"). The resolver canonicalizes them against the names already on the
//! ledger so "bca" and "BCA" never become two accounts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::record::ACCOUNT_COLUMN;
use crate::util::title_case;
use crate::{Ledger, record::HEADER_ROWS};

/// How long a cache snapshot stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct NameCache {
    built_at: Instant,
    /// lowercase name -> canonical spelling as first seen on the ledger.
    names: HashMap<String, String>,
}

/// Resolves free-form account names to their canonical ledger spelling.
#[derive(Clone, Debug)]
pub struct AccountResolver {
    ledger: Ledger,
    ttl: Duration,
    cache: Arc<Mutex<Option<NameCache>>>,
}

impl AccountResolver {
    #[must_use]
    pub fn new(ledger: Ledger, ttl: Duration) -> Self {
        Self {
            ledger,
            ttl,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Resolve `candidate` to a canonical account name.
    ///
    /// Known names (case-insensitive) return the spelling already on the
    /// ledger. Unknown names are title-cased so a brand-new account still
    /// gets a tidy label. A failed cache rebuild degrades to title-casing
    /// rather than failing the caller.
    pub async fn resolve(&self, candidate: &str) -> String {
        let mut cache = self.cache.lock().await;

        let stale = match cache.as_ref() {
            Some(entry) => entry.built_at.elapsed() >= self.ttl,
            None => true,
        };
        if stale {
            match self.build_cache().await {
                Ok(names) => {
                    *cache = Some(NameCache {
                        built_at: Instant::now(),
                        names,
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "account cache rebuild failed");
                    return title_case(candidate);
                }
            }
        }

        match cache
            .as_ref()
            .and_then(|entry| entry.names.get(&candidate.trim().to_lowercase()))
        {
            Some(canonical) => canonical.clone(),
            None => title_case(candidate),
        }
    }

    /// Drop the cached snapshot so the next resolve rereads the ledger.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    async fn build_cache(&self) -> Result<HashMap<String, String>, crate::LedgerError> {
        let column = self.ledger.column(ACCOUNT_COLUMN).await?;
        let mut names = HashMap::new();
        for cell in column.into_iter().skip(HEADER_ROWS) {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                continue;
            }
            // First spelling wins.
            names
                .entry(trimmed.to_lowercase())
                .or_insert_with(|| trimmed.to_string());
        }
        Ok(names)
    }
}
