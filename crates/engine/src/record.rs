//! Transaction records and their positional ledger encoding.
//!
//! The ledger is schema-less: each transaction is one row of ten string
//! cells in a fixed order. This module owns that order so the rest of the
//! engine never hard-codes column positions.

use serde::{Deserialize, Serialize};

use crate::{Category, EngineError};

/// Number of cells in a ledger data row.
pub const LEDGER_COLUMNS: usize = 10;
/// 1-based column holding the account name. Used for cache rebuilds.
pub const ACCOUNT_COLUMN: usize = 4;
/// Rows at the top of the sheet that are headers, not data.
pub const HEADER_ROWS: usize = 1;

pub const DEFAULT_ACCOUNT: &str = "Tunai";
pub const DEFAULT_UNIT: &str = "x";

// 0-based cell offsets within a data row.
pub(crate) const DIRECTION_IDX: usize = 2;
pub(crate) const ACCOUNT_IDX: usize = 3;
pub(crate) const DESCRIPTION_IDX: usize = 4;
pub(crate) const TOTAL_IDX: usize = 9;

/// Whether money enters or leaves an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Inflow,
    Outflow,
}

impl Direction {
    /// Ledger wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inflow => "Masuk",
            Direction::Outflow => "Keluar",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "masuk" => Ok(Direction::Inflow),
            "keluar" => Ok(Direction::Outflow),
            other => Err(EngineError::Parse(format!("unknown direction: {other}"))),
        }
    }
}

/// A single extracted transaction, ready to append to the ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub date: String,
    pub time: String,
    pub direction: Direction,
    pub account: String,
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub category: Category,
    pub total_amount: i64,
}

impl Transaction {
    /// Encode as a positional ledger row.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.clone(),
            self.time.clone(),
            self.direction.as_str().to_string(),
            self.account.clone(),
            self.description.clone(),
            self.unit.clone(),
            format_number(self.quantity),
            format_number(self.unit_price),
            self.category.as_str().to_string(),
            self.total_amount.to_string(),
        ]
    }
}

/// Format a numeric cell, dropping a trailing `.0` for whole values.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Parse an amount cell into whole rupiah.
///
/// Ledger cells arrive as free-form strings ("Rp 15.000", "15,000", "15000").
/// Everything except ASCII digits and a leading minus is stripped before
/// parsing; unparseable cells count as zero so a single bad row never breaks
/// balance computation.
#[must_use]
pub(crate) fn clean_amount(raw: &str) -> i64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_round_trip() {
        assert_eq!(Direction::try_from("masuk").unwrap(), Direction::Inflow);
        assert_eq!(Direction::try_from(" KELUAR ").unwrap(), Direction::Outflow);
        assert!(Direction::try_from("transfer").is_err());
    }

    #[test]
    fn row_has_fixed_width_and_order() {
        let tx = Transaction {
            date: "2025-03-01".to_string(),
            time: "12:30".to_string(),
            direction: Direction::Outflow,
            account: "BCA".to_string(),
            description: "Nasi goreng".to_string(),
            unit: DEFAULT_UNIT.to_string(),
            quantity: 2.0,
            unit_price: 15000.0,
            category: Category::Makan,
            total_amount: 30000,
        };
        let row = tx.to_row();
        assert_eq!(row.len(), LEDGER_COLUMNS);
        assert_eq!(row[DIRECTION_IDX], "Keluar");
        assert_eq!(row[ACCOUNT_IDX], "BCA");
        assert_eq!(row[ACCOUNT_COLUMN - 1], "BCA");
        assert_eq!(row[DESCRIPTION_IDX], "Nasi goreng");
        assert_eq!(row[6], "2");
        assert_eq!(row[TOTAL_IDX], "30000");
    }

    #[test]
    fn fractional_quantities_keep_their_decimals() {
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(3.0), "3");
    }

    #[test]
    fn clean_amount_strips_noise() {
        assert_eq!(clean_amount("Rp 15.000"), 15000);
        assert_eq!(clean_amount("-2,500"), -2500);
        assert_eq!(clean_amount("abc"), 0);
        assert_eq!(clean_amount(""), 0);
    }
}
