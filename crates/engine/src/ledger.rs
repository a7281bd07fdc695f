//! Ledger backends.
//!
//! [`Ledger::Sheets`] talks to the Google Sheets v4 REST API and is the
//! production backend. [`Ledger::Memory`] keeps rows in process memory for
//! tests, including a switch to simulate an unreachable backend.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::LedgerError;

type ResultLedger<T> = Result<T, LedgerError>;

/// A spreadsheet-like store of positional string rows.
#[derive(Clone, Debug)]
pub enum Ledger {
    Sheets(SheetsLedger),
    Memory(MemoryLedger),
}

impl Ledger {
    /// All rows, headers included.
    pub async fn rows(&self) -> ResultLedger<Vec<Vec<String>>> {
        match self {
            Ledger::Sheets(sheets) => sheets.rows().await,
            Ledger::Memory(memory) => memory.rows().await,
        }
    }

    /// A single column (1-based index), headers included.
    pub async fn column(&self, index: usize) -> ResultLedger<Vec<String>> {
        match self {
            Ledger::Sheets(sheets) => sheets.column(index).await,
            Ledger::Memory(memory) => memory.column(index).await,
        }
    }

    /// Append rows after the last data row.
    pub async fn append_rows(&self, rows: Vec<Vec<String>>) -> ResultLedger<()> {
        match self {
            Ledger::Sheets(sheets) => sheets.append_rows(rows).await,
            Ledger::Memory(memory) => memory.append_rows(rows).await,
        }
    }

    /// Delete a single row (1-based index, headers count).
    pub async fn delete_row(&self, index: usize) -> ResultLedger<()> {
        match self {
            Ledger::Sheets(sheets) => sheets.delete_row(index).await,
            Ledger::Memory(memory) => memory.delete_row(index).await,
        }
    }

    /// Clear every data row, keeping the header row intact.
    pub async fn clear_data_rows(&self) -> ResultLedger<()> {
        match self {
            Ledger::Sheets(sheets) => sheets.clear_data_rows().await,
            Ledger::Memory(memory) => memory.clear_data_rows().await,
        }
    }
}

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Google Sheets backend. One spreadsheet, one named sheet.
#[derive(Clone, Debug)]
pub struct SheetsLedger {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    token: String,
    // Numeric id of the named sheet, looked up once from the spreadsheet
    // metadata. The values endpoints address sheets by name, but
    // batchUpdate only takes the id.
    sheet_id: Arc<Mutex<Option<i64>>>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

fn find_sheet_id(meta: &SpreadsheetMeta, title: &str) -> Option<i64> {
    meta.sheets
        .iter()
        .find(|sheet| sheet.properties.title == title)
        .map(|sheet| sheet.properties.sheet_id)
}

/// A1-notation letter for a 1-based column index.
fn column_letter(index: usize) -> char {
    debug_assert!((1..=26).contains(&index));
    (b'A' + (index.saturating_sub(1).min(25) as u8)) as char
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl SheetsLedger {
    pub fn new(
        client: reqwest::Client,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: SHEETS_BASE_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            token: token.into(),
            sheet_id: Arc::new(Mutex::new(None)),
        }
    }

    /// Point at a different API host. Used by tests against a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn check(response: reqwest::Response) -> ResultLedger<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "unknown error".to_string(),
        };
        Err(LedgerError::Api { status, message })
    }

    async fn rows(&self) -> ResultLedger<Vec<Vec<String>>> {
        let url = format!(
            "{}/{}/values/{}",
            self.base_url, self.spreadsheet_id, self.sheet_name
        );
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let range: ValueRange = Self::check(response).await?.json().await?;
        Ok(range.values)
    }

    async fn column(&self, index: usize) -> ResultLedger<Vec<String>> {
        let letter = column_letter(index);
        let url = format!(
            "{}/{}/values/{}!{letter}:{letter}",
            self.base_url, self.spreadsheet_id, self.sheet_name
        );
        let response = self
            .client
            .get(url)
            .query(&[("majorDimension", "COLUMNS")])
            .bearer_auth(&self.token)
            .send()
            .await?;
        let range: ValueRange = Self::check(response).await?.json().await?;
        Ok(range.values.into_iter().next().unwrap_or_default())
    }

    async fn append_rows(&self, rows: Vec<Vec<String>>) -> ResultLedger<()> {
        let url = format!(
            "{}/{}/values/{}:append",
            self.base_url, self.spreadsheet_id, self.sheet_name
        );
        let response = self
            .client
            .post(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Numeric id of the configured sheet, resolved from the spreadsheet
    /// metadata on first use and cached for the lifetime of the client.
    async fn sheet_id(&self) -> ResultLedger<i64> {
        let mut cached = self.sheet_id.lock().await;
        if let Some(id) = *cached {
            return Ok(id);
        }
        let url = format!("{}/{}", self.base_url, self.spreadsheet_id);
        let response = self
            .client
            .get(url)
            .query(&[("fields", "sheets.properties")])
            .bearer_auth(&self.token)
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(response).await?.json().await?;
        let id = find_sheet_id(&meta, &self.sheet_name).ok_or_else(|| {
            LedgerError::Unavailable(format!(
                "sheet '{}' not found in spreadsheet",
                self.sheet_name
            ))
        })?;
        *cached = Some(id);
        Ok(id)
    }

    async fn delete_row(&self, index: usize) -> ResultLedger<()> {
        let sheet_id = self.sheet_id().await?;
        let url = format!("{}/{}:batchUpdate", self.base_url, self.spreadsheet_id);
        // deleteDimension takes a 0-based half-open row range.
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": index - 1,
                        "endIndex": index,
                    }
                }
            }]
        });
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn clear_data_rows(&self) -> ResultLedger<()> {
        let url = format!(
            "{}/{}/values/{}!A2:J:clear",
            self.base_url, self.spreadsheet_id, self.sheet_name
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// In-memory backend used by tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<Vec<String>>,
    unavailable: bool,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with rows, the first of which is typically a header.
    #[must_use]
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                rows,
                unavailable: false,
            })),
        }
    }

    /// Make every operation fail, simulating a dead backend.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    async fn guard(&self) -> ResultLedger<tokio::sync::MutexGuard<'_, MemoryState>> {
        let state = self.state.lock().await;
        if state.unavailable {
            return Err(LedgerError::Unavailable("memory ledger offline".to_string()));
        }
        Ok(state)
    }

    pub async fn rows(&self) -> ResultLedger<Vec<Vec<String>>> {
        Ok(self.guard().await?.rows.clone())
    }

    async fn column(&self, index: usize) -> ResultLedger<Vec<String>> {
        let state = self.guard().await?;
        Ok(state
            .rows
            .iter()
            .map(|row| row.get(index - 1).cloned().unwrap_or_default())
            .collect())
    }

    pub async fn append_rows(&self, rows: Vec<Vec<String>>) -> ResultLedger<()> {
        self.guard().await?.rows.extend(rows);
        Ok(())
    }

    async fn delete_row(&self, index: usize) -> ResultLedger<()> {
        let mut state = self.guard().await?;
        if index >= 1 && index <= state.rows.len() {
            state.rows.remove(index - 1);
        }
        Ok(())
    }

    async fn clear_data_rows(&self) -> ResultLedger<()> {
        let mut state = self.guard().await?;
        state.rows.truncate(crate::record::HEADER_ROWS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryLedger {
        MemoryLedger::with_rows(vec![
            vec!["Tanggal".to_string(), "Waktu".to_string()],
            vec!["2025-03-01".to_string(), "09:00".to_string()],
            vec!["2025-03-02".to_string(), "10:00".to_string()],
        ])
    }

    #[tokio::test]
    async fn memory_column_is_one_based() {
        let ledger = seeded();
        let column = ledger.column(2).await.unwrap();
        assert_eq!(column, vec!["Waktu", "09:00", "10:00"]);
    }

    #[tokio::test]
    async fn memory_delete_and_clear_keep_header() {
        let ledger = seeded();
        ledger.delete_row(3).await.unwrap();
        assert_eq!(ledger.rows().await.unwrap().len(), 2);

        ledger.clear_data_rows().await.unwrap();
        let rows = ledger.rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "Tanggal");
    }

    #[test]
    fn sheet_id_is_resolved_by_title_not_position() {
        let meta: SpreadsheetMeta = serde_json::from_value(json!({
            "sheets": [
                { "properties": { "sheetId": 0, "title": "Dashboard" } },
                { "properties": { "sheetId": 1_234_567, "title": "Data" } },
            ]
        }))
        .unwrap();
        assert_eq!(find_sheet_id(&meta, "Data"), Some(1_234_567));
        assert_eq!(find_sheet_id(&meta, "Missing"), None);
    }

    #[test]
    fn column_letters_are_one_based() {
        assert_eq!(column_letter(1), 'A');
        assert_eq!(column_letter(4), 'D');
        assert_eq!(column_letter(10), 'J');
    }

    #[tokio::test]
    async fn memory_unavailable_errors() {
        let ledger = seeded();
        ledger.set_unavailable(true).await;
        assert!(matches!(
            ledger.rows().await,
            Err(LedgerError::Unavailable(_))
        ));
    }
}
