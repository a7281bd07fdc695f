//! Undo and reset operations.

use crate::ai::Provider;
use crate::record::{DESCRIPTION_IDX, HEADER_ROWS};
use crate::{Engine, EngineError, ResultEngine};

/// The row removed by [`Engine::undo_last`].
#[derive(Clone, Debug, PartialEq)]
pub struct UndoneEntry {
    /// 1-based row index that was deleted.
    pub row_index: usize,
    pub description: String,
}

impl<P: Provider, F: Provider> Engine<P, F> {
    /// Delete the most recent data row.
    pub async fn undo_last(&self) -> ResultEngine<UndoneEntry> {
        let rows = self.ledger.rows().await?;
        if rows.len() <= HEADER_ROWS {
            return Err(EngineError::EmptyLedger);
        }

        let row_index = rows.len();
        let description = rows
            .last()
            .and_then(|row| row.get(DESCRIPTION_IDX))
            .cloned()
            .unwrap_or_default();

        self.ledger.delete_row(row_index).await?;
        tracing::info!(row_index, description = %description, "last entry removed");
        Ok(UndoneEntry {
            row_index,
            description,
        })
    }

    /// Wipe every data row, keeping the header.
    pub async fn reset(&self) -> ResultEngine<()> {
        self.ledger.clear_data_rows().await?;
        self.resolver.invalidate().await;
        tracing::warn!("ledger reset, all data rows cleared");
        Ok(())
    }
}
