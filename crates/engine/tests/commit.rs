//! End-to-end engine tests against the in-memory ledger and stub providers.

use std::time::Duration;

use engine::{
    CommitOutcome, Direction, Engine, EngineError, ImageData, Ledger, MemoryLedger, Provider,
    ProviderError, Source,
};

/// Provider stub: replies with a canned payload or fails.
#[derive(Clone, Debug)]
struct StaticProvider {
    name: &'static str,
    reply: Option<String>,
}

impl StaticProvider {
    fn replying(name: &'static str, reply: &str) -> Self {
        Self {
            name,
            reply: Some(reply.to_string()),
        }
    }

    fn failing(name: &'static str) -> Self {
        Self { name, reply: None }
    }
}

impl Provider for StaticProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn generate(
        &self,
        _prompt: &str,
        _text: &str,
        _image: Option<&ImageData>,
    ) -> Result<String, ProviderError> {
        self.reply.clone().ok_or(ProviderError::NotConfigured)
    }
}

fn header() -> Vec<String> {
    vec![
        "Tanggal", "Jam", "Tipe", "Kantong", "Nama", "Satuan", "Volume", "Harga Satuan",
        "Kategori", "Harga Total",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn data_row(direction: &str, account: &str, description: &str, total: &str) -> Vec<String> {
    vec![
        "2025-03-01".to_string(),
        "09:00".to_string(),
        direction.to_string(),
        account.to_string(),
        description.to_string(),
        "x".to_string(),
        "1".to_string(),
        "0".to_string(),
        "Lainnya".to_string(),
        total.to_string(),
    ]
}

fn engine_with(
    memory: MemoryLedger,
    primary: Option<StaticProvider>,
    fallback: Option<StaticProvider>,
) -> Engine<StaticProvider, StaticProvider> {
    Engine::builder()
        .ledger(Ledger::Memory(memory))
        .primary_provider(primary)
        .fallback_provider(fallback)
        .cache_ttl(Duration::ZERO)
        .build()
        .unwrap()
}

const OUTFLOW_REPLY: &str = r#"{ "transaksi": [ { "tanggal": "2025-03-02", "jam": "12:00", "tipe": "Keluar", "kantong": "bca", "nama": "Kopi", "satuan": "x", "volume": 1, "harga_satuan": 18000, "kategori": "Makan", "harga_total": 18000 } ] }"#;

#[tokio::test]
async fn commit_saves_and_canonicalizes_account() {
    let memory = MemoryLedger::with_rows(vec![
        header(),
        data_row("Masuk", "BCA", "Saldo awal", "100000"),
    ]);
    let engine = engine_with(
        memory.clone(),
        Some(StaticProvider::replying("Gemini", OUTFLOW_REPLY)),
        None,
    );

    let outcome = engine.commit("kopi 18rb pake bca", None, Source::Telegram).await.unwrap();
    let CommitOutcome::Saved {
        provider,
        transactions,
    } = outcome
    else {
        panic!("expected a saved batch");
    };
    assert_eq!(provider, "Gemini");
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].account, "BCA");
    assert_eq!(transactions[0].direction, Direction::Outflow);

    let rows = memory.rows().await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][3], "BCA");
    assert_eq!(rows[2][9], "18000");
}

#[tokio::test]
async fn fallback_takes_over_when_primary_fails() {
    let memory = MemoryLedger::with_rows(vec![header()]);
    let engine = engine_with(
        memory,
        Some(StaticProvider::failing("Gemini")),
        Some(StaticProvider::replying("Groq Llama", OUTFLOW_REPLY)),
    );

    let outcome = engine.commit("kopi", None, Source::Webhook).await.unwrap();
    let CommitOutcome::Saved { provider, .. } = outcome else {
        panic!("expected a saved batch");
    };
    assert_eq!(provider, "Groq Llama");
}

#[tokio::test]
async fn both_providers_failing_is_exhaustion() {
    let engine = engine_with(
        MemoryLedger::with_rows(vec![header()]),
        Some(StaticProvider::failing("Gemini")),
        Some(StaticProvider::failing("Groq Llama")),
    );
    assert!(matches!(
        engine.commit("kopi", None, Source::Telegram).await,
        Err(EngineError::ProvidersExhausted { .. })
    ));
}

#[tokio::test]
async fn no_providers_configured() {
    let engine = engine_with(MemoryLedger::with_rows(vec![header()]), None, None);
    assert!(matches!(
        engine.commit("kopi", None, Source::Telegram).await,
        Err(EngineError::NoProvider)
    ));
}

#[tokio::test]
async fn placeholder_input_saves_nothing() {
    let memory = MemoryLedger::with_rows(vec![header()]);
    let engine = engine_with(
        memory.clone(),
        Some(StaticProvider::replying("Gemini", r#"{ "transaksi": [] }"#)),
        None,
    );

    let outcome = engine
        .commit("[notification_title]", None, Source::Webhook)
        .await
        .unwrap();
    assert!(matches!(outcome, CommitOutcome::NoTransactions));
    assert_eq!(memory.rows().await.unwrap().len(), 1);
}

#[tokio::test]
async fn garbage_reply_is_a_parse_error() {
    let engine = engine_with(
        MemoryLedger::with_rows(vec![header()]),
        Some(StaticProvider::replying("Gemini", "maaf, bukan JSON")),
        None,
    );
    assert!(matches!(
        engine.commit("kopi", None, Source::Telegram).await,
        Err(EngineError::Parse(_))
    ));
}

#[tokio::test]
async fn set_balance_appends_signed_correction() {
    let memory = MemoryLedger::with_rows(vec![
        header(),
        data_row("Masuk", "BCA", "Saldo awal", "70000"),
    ]);
    let engine = engine_with(memory.clone(), None, None);

    let adjustment = engine.set_balance("bca", 50_000).await.unwrap();
    assert_eq!(adjustment.account, "BCA");
    assert_eq!(adjustment.previous, 70_000);
    let entry = adjustment.entry.expect("a correction row");
    assert_eq!(entry.direction, Direction::Outflow);
    assert_eq!(entry.total_amount, 20_000);
    assert_eq!(entry.description, engine::CORRECTION_DESCRIPTION);

    assert_eq!(engine.balance("BCA").await.unwrap(), 50_000);

    // Balance already matches: no second row.
    let again = engine.set_balance("BCA", 50_000).await.unwrap();
    assert!(again.entry.is_none());
    assert_eq!(memory.rows().await.unwrap().len(), 3);
}

#[tokio::test]
async fn set_balance_upwards_is_an_inflow() {
    let memory = MemoryLedger::with_rows(vec![header()]);
    let engine = engine_with(memory, None, None);

    let adjustment = engine.set_balance("Jenius", 125_000).await.unwrap();
    let entry = adjustment.entry.unwrap();
    assert_eq!(entry.direction, Direction::Inflow);
    assert_eq!(entry.total_amount, 125_000);
}

#[tokio::test]
async fn balance_summary_groups_raw_accounts() {
    let memory = MemoryLedger::with_rows(vec![
        header(),
        data_row("Masuk", "BCA", "Gaji", "1000000"),
        data_row("Keluar", "BCA", "Kopi", "20000"),
        data_row("Masuk", "GoPay", "Top Up", "50000"),
        data_row("Keluar", "", "Tanpa kantong", "99999"),
    ]);
    let engine = engine_with(memory, None, None);

    let summary = engine.balance_summary().await.unwrap();
    assert_eq!(
        summary.accounts,
        vec![("BCA".to_string(), 980_000), ("GoPay".to_string(), 50_000)]
    );
    assert_eq!(summary.total, 1_030_000);
}

#[tokio::test]
async fn undo_removes_only_the_last_row() {
    let memory = MemoryLedger::with_rows(vec![
        header(),
        data_row("Masuk", "BCA", "Gaji", "1000000"),
        data_row("Keluar", "BCA", "Kopi", "20000"),
    ]);
    let engine = engine_with(memory.clone(), None, None);

    let undone = engine.undo_last().await.unwrap();
    assert_eq!(undone.row_index, 3);
    assert_eq!(undone.description, "Kopi");
    assert_eq!(memory.rows().await.unwrap().len(), 2);
}

#[tokio::test]
async fn undo_on_empty_ledger_errors() {
    let engine = engine_with(MemoryLedger::with_rows(vec![header()]), None, None);
    assert!(matches!(
        engine.undo_last().await,
        Err(EngineError::EmptyLedger)
    ));
}

#[tokio::test]
async fn reset_keeps_only_the_header() {
    let memory = MemoryLedger::with_rows(vec![
        header(),
        data_row("Masuk", "BCA", "Gaji", "1000000"),
        data_row("Keluar", "GoPay", "Kopi", "20000"),
    ]);
    let engine = engine_with(memory.clone(), None, None);

    engine.reset().await.unwrap();
    let rows = memory.rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Tanggal");
}

#[tokio::test]
async fn ledger_outage_surfaces_as_ledger_error() {
    let memory = MemoryLedger::with_rows(vec![header()]);
    memory.set_unavailable(true).await;
    let engine = engine_with(memory, None, None);
    assert!(matches!(
        engine.balance("BCA").await,
        Err(EngineError::Ledger(_))
    ));
}
