//! Extract-and-save flow: the main write path of the engine.

use crate::ai::{ImageData, Provider, prompt};
use crate::util::format_rupiah;
use crate::{Direction, Engine, ResultEngine, Transaction};

/// Where a message entered the system. Reports mention it so the user can
/// tell a webhook-captured bank notification from something they typed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Telegram,
    Webhook,
}

impl Source {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Source::Telegram => "Telegram",
            Source::Webhook => "MacroDroid",
        }
    }
}

/// Result of a commit attempt.
#[derive(Clone, Debug)]
pub enum CommitOutcome {
    /// The input carried no financial information.
    NoTransactions,
    Saved {
        provider: &'static str,
        transactions: Vec<Transaction>,
    },
}

impl<P: Provider, F: Provider> Engine<P, F> {
    /// Extract transactions from `text` (and an optional image) and append
    /// them to the ledger as one batch.
    ///
    /// Account names are canonicalized through the resolver before writing.
    /// Nothing is written when extraction yields an empty list.
    pub async fn commit(
        &self,
        text: &str,
        image: Option<&ImageData>,
        source: Source,
    ) -> ResultEngine<CommitOutcome> {
        let now = prompt::now_jakarta();
        let (extracted, provider) = self.extractor.extract(text, image, now).await?;

        if extracted.is_empty() {
            tracing::info!(source = source.label(), "no transactions in input");
            return Ok(CommitOutcome::NoTransactions);
        }

        let mut transactions = Vec::with_capacity(extracted.len());
        for mut tx in extracted {
            tx.account = self.resolver.resolve(&tx.account).await;
            transactions.push(tx);
        }

        let rows = transactions.iter().map(Transaction::to_row).collect();
        self.ledger.append_rows(rows).await?;

        tracing::info!(
            provider,
            source = source.label(),
            count = transactions.len(),
            "transactions saved"
        );
        Ok(CommitOutcome::Saved {
            provider,
            transactions,
        })
    }
}

/// Human-readable confirmation for a saved batch.
#[must_use]
pub fn render_report(provider: &str, source: Source, transactions: &[Transaction]) -> String {
    let mut report = format!("✅ Tersimpan! (via {provider} | {})", source.label());
    for tx in transactions {
        let arrow = match tx.direction {
            Direction::Outflow => "➡️",
            Direction::Inflow => "⬅️",
        };
        report.push_str(&format!(
            "\n{arrow} {}: {} ({})",
            tx.account,
            format_rupiah(tx.total_amount),
            tx.description
        ));
    }
    report
}
