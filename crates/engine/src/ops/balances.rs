//! Balance computation and correction entries.

use crate::ai::{Provider, prompt};
use crate::record::{ACCOUNT_IDX, DIRECTION_IDX, HEADER_ROWS, TOTAL_IDX, clean_amount};
use crate::{Category, Direction, Engine, ResultEngine, Transaction};

/// Description written on rows created by [`Engine::set_balance`].
pub const CORRECTION_DESCRIPTION: &str = "Automatic Balance Correction";

/// Per-account balances plus the grand total.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceSummary {
    /// `(account, balance)` in first-appearance order.
    pub accounts: Vec<(String, i64)>,
    pub total: i64,
}

/// What [`Engine::set_balance`] did.
#[derive(Clone, Debug)]
pub struct BalanceAdjustment {
    pub account: String,
    pub previous: i64,
    pub target: i64,
    /// The correction row that was appended, `None` when the balance
    /// already matched.
    pub entry: Option<Transaction>,
}

impl<P: Provider, F: Provider> Engine<P, F> {
    /// Balance of a single account: sum of inflows minus outflows,
    /// matching the account case-insensitively.
    pub async fn balance(&self, account: &str) -> ResultEngine<i64> {
        let rows = self.ledger.rows().await?;
        Ok(balance_from_rows(&rows, account))
    }

    /// Balances of every account on the ledger.
    ///
    /// Accounts are grouped by their raw cell value, so rows written before
    /// the resolver existed keep their own line. Empty account cells are
    /// skipped.
    pub async fn balance_summary(&self) -> ResultEngine<BalanceSummary> {
        let rows = self.ledger.rows().await?;

        let mut accounts: Vec<(String, i64)> = Vec::new();
        for row in rows.iter().skip(HEADER_ROWS) {
            let Some(account) = row.get(ACCOUNT_IDX).map(|c| c.trim()) else {
                continue;
            };
            if account.is_empty() {
                continue;
            }
            let amount = signed_amount(row);
            match accounts.iter_mut().find(|(name, _)| name == account) {
                Some((_, balance)) => *balance += amount,
                None => accounts.push((account.to_string(), amount)),
            }
        }

        let total = accounts.iter().map(|(_, balance)| balance).sum();
        Ok(BalanceSummary { accounts, total })
    }

    /// Force an account's balance to `target` by appending a correction row
    /// for the difference. Never rewrites history.
    pub async fn set_balance(&self, account: &str, target: i64) -> ResultEngine<BalanceAdjustment> {
        let canonical = self.resolver.resolve(account).await;
        let previous = self.balance(&canonical).await?;
        let delta = target - previous;

        if delta == 0 {
            return Ok(BalanceAdjustment {
                account: canonical,
                previous,
                target,
                entry: None,
            });
        }

        let now = prompt::now_jakarta();
        let entry = Transaction {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M").to_string(),
            direction: if delta > 0 {
                Direction::Inflow
            } else {
                Direction::Outflow
            },
            account: canonical.clone(),
            description: CORRECTION_DESCRIPTION.to_string(),
            unit: crate::record::DEFAULT_UNIT.to_string(),
            quantity: 1.0,
            unit_price: 0.0,
            category: Category::Lainnya,
            total_amount: delta.abs(),
        };
        self.ledger.append_rows(vec![entry.to_row()]).await?;

        tracing::info!(account = %canonical, previous, target, "balance corrected");
        Ok(BalanceAdjustment {
            account: canonical,
            previous,
            target,
            entry: Some(entry),
        })
    }
}

fn balance_from_rows(rows: &[Vec<String>], account: &str) -> i64 {
    rows.iter()
        .skip(HEADER_ROWS)
        .filter(|row| {
            row.get(ACCOUNT_IDX)
                .is_some_and(|cell| cell.trim().eq_ignore_ascii_case(account.trim()))
        })
        .map(|row| signed_amount(row))
        .sum()
}

/// Signed contribution of one row: positive inflow, negative outflow,
/// zero for anything unrecognizable.
fn signed_amount(row: &[String]) -> i64 {
    let amount = row.get(TOTAL_IDX).map(|cell| clean_amount(cell)).unwrap_or(0);
    match row.get(DIRECTION_IDX).map(|cell| cell.trim().to_lowercase()) {
        Some(direction) if direction == "masuk" => amount,
        Some(direction) if direction == "keluar" => -amount,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(direction: &str, account: &str, total: &str) -> Vec<String> {
        let mut cells = vec![String::new(); crate::record::LEDGER_COLUMNS];
        cells[DIRECTION_IDX] = direction.to_string();
        cells[ACCOUNT_IDX] = account.to_string();
        cells[TOTAL_IDX] = total.to_string();
        cells
    }

    fn header() -> Vec<String> {
        vec!["Tanggal".to_string(); crate::record::LEDGER_COLUMNS]
    }

    #[test]
    fn balance_sums_inflows_minus_outflows() {
        let rows = vec![
            header(),
            row("Masuk", "BCA", "100000"),
            row("Keluar", "BCA", "Rp 30.000"),
            row("Keluar", "GoPay", "5000"),
        ];
        assert_eq!(balance_from_rows(&rows, "BCA"), 70_000);
        assert_eq!(balance_from_rows(&rows, "bca"), 70_000);
        assert_eq!(balance_from_rows(&rows, "GoPay"), -5_000);
        assert_eq!(balance_from_rows(&rows, "Jenius"), 0);
    }

    #[test]
    fn dirty_cells_count_as_zero() {
        let rows = vec![
            header(),
            row("Masuk", "BCA", "abc"),
            row("Transfer", "BCA", "10000"),
            row("Masuk", "BCA", "2500"),
        ];
        assert_eq!(balance_from_rows(&rows, "BCA"), 2_500);
    }
}
