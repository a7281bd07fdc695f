//! AI extraction pipeline.
//!
//! A [`Provider`] turns natural-language input (optionally with an image)
//! into raw model output. The [`Extractor`] chains a primary and a fallback
//! provider and parses whatever comes back into [`Transaction`]s.

use std::future::Future;

use base64::Engine as _;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::record::{DEFAULT_ACCOUNT, DEFAULT_UNIT};
use crate::{Category, Direction, EngineError, ProviderError, Transaction};

mod gemini;
mod groq;
pub mod prompt;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;

/// Image attachment forwarded to vision-capable models.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    #[must_use]
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            bytes,
        }
    }

    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// A single AI backend.
///
/// `generate` returns the raw model text; parsing happens in the
/// [`Extractor`] so every provider shares the same tolerance for fenced or
/// bare JSON. `transcribe` is optional and defaults to unsupported.
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(
        &self,
        prompt: &str,
        text: &str,
        image: Option<&ImageData>,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;

    fn transcribe(
        &self,
        _audio: Vec<u8>,
        _filename: &str,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send {
        async { Err(ProviderError::Unsupported) }
    }
}

/// Primary/fallback provider chain.
#[derive(Clone, Debug)]
pub struct Extractor<P, F> {
    primary: Option<P>,
    fallback: Option<F>,
}

impl<P: Provider, F: Provider> Extractor<P, F> {
    #[must_use]
    pub fn new(primary: Option<P>, fallback: Option<F>) -> Self {
        Self { primary, fallback }
    }

    /// Extract transactions from `text` (plus an optional image).
    ///
    /// The primary provider is tried first; on failure the fallback takes
    /// over. A parse failure of a *successful* response is not retried on
    /// the other provider, matching the rule that garbage output at
    /// temperature zero is a prompt problem, not a transient one.
    ///
    /// Returns the transactions and the name of the provider that answered.
    pub async fn extract(
        &self,
        text: &str,
        image: Option<&ImageData>,
        now: DateTime<Tz>,
    ) -> Result<(Vec<Transaction>, &'static str), EngineError> {
        let prompt = prompt::system_prompt(now);

        let mut primary_error = "not configured".to_string();
        if let Some(primary) = &self.primary {
            match primary.generate(&prompt, text, image).await {
                Ok(raw) => {
                    let transactions = parse_transactions(&raw, now)?;
                    return Ok((transactions, primary.name()));
                }
                Err(err) => {
                    tracing::warn!(provider = primary.name(), error = %err, "primary provider failed, switching over");
                    primary_error = err.to_string();
                }
            }
        }

        let mut fallback_error = "not configured".to_string();
        if let Some(fallback) = &self.fallback {
            match fallback.generate(&prompt, text, image).await {
                Ok(raw) => {
                    let transactions = parse_transactions(&raw, now)?;
                    return Ok((transactions, fallback.name()));
                }
                Err(err) => {
                    tracing::error!(provider = fallback.name(), error = %err, "fallback provider failed");
                    fallback_error = err.to_string();
                }
            }
        }

        if self.primary.is_none() && self.fallback.is_none() {
            return Err(EngineError::NoProvider);
        }
        Err(EngineError::ProvidersExhausted {
            primary: primary_error,
            fallback: fallback_error,
        })
    }

    /// Transcribe voice audio, preferring the fallback chain member that
    /// actually supports it.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        filename: &str,
    ) -> Result<String, EngineError> {
        let mut primary_error = "not configured".to_string();
        if let Some(primary) = &self.primary {
            match primary.transcribe(audio.clone(), filename).await {
                Ok(text) => return Ok(text),
                Err(ProviderError::Unsupported) => {
                    primary_error = "transcription unsupported".to_string();
                }
                Err(err) => {
                    tracing::warn!(provider = primary.name(), error = %err, "transcription failed on primary");
                    primary_error = err.to_string();
                }
            }
        }

        let mut fallback_error = "not configured".to_string();
        if let Some(fallback) = &self.fallback {
            match fallback.transcribe(audio, filename).await {
                Ok(text) => return Ok(text),
                Err(err) => fallback_error = err.to_string(),
            }
        }

        if self.primary.is_none() && self.fallback.is_none() {
            return Err(EngineError::NoProvider);
        }
        Err(EngineError::ProvidersExhausted {
            primary: primary_error,
            fallback: fallback_error,
        })
    }
}

/// Provider output, either wrapped in the documented object or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtractionPayload {
    Wrapped { transaksi: Vec<RawTransaction> },
    Bare(Vec<RawTransaction>),
}

fn default_account() -> String {
    DEFAULT_ACCOUNT.to_string()
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

fn default_volume() -> f64 {
    1.0
}

/// One transaction exactly as the model emits it.
#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    tanggal: String,
    #[serde(default)]
    jam: String,
    tipe: String,
    #[serde(default = "default_account")]
    kantong: String,
    #[serde(default)]
    nama: String,
    #[serde(default = "default_unit")]
    satuan: String,
    #[serde(default = "default_volume")]
    volume: f64,
    #[serde(default)]
    harga_satuan: f64,
    #[serde(default)]
    kategori: String,
    // Models sometimes emit the total as a string ("15.000") or a float.
    #[serde(default)]
    harga_total: serde_json::Value,
}

/// Strip optional markdown code fences around the JSON body.
fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

fn parse_transactions(raw: &str, now: DateTime<Tz>) -> Result<Vec<Transaction>, EngineError> {
    let body = strip_fences(raw);
    let payload: ExtractionPayload = serde_json::from_str(&body)
        .map_err(|err| EngineError::Parse(format!("{err}: {body}")))?;
    let raw_transactions = match payload {
        ExtractionPayload::Wrapped { transaksi } => transaksi,
        ExtractionPayload::Bare(list) => list,
    };

    raw_transactions
        .into_iter()
        .map(|raw| materialize(raw, now))
        .collect()
}

/// Normalize one raw transaction into ledger form.
fn materialize(raw: RawTransaction, now: DateTime<Tz>) -> Result<Transaction, EngineError> {
    let direction = Direction::try_from(raw.tipe.as_str())?;

    let mut category = Category::coerce(&raw.kategori);
    // Non-top-up income is always Pemasukan.
    if direction == Direction::Inflow && category != Category::Lainnya {
        category = Category::Pemasukan;
    }

    let date = if raw.tanggal.trim().is_empty() {
        now.format("%Y-%m-%d").to_string()
    } else {
        raw.tanggal.trim().to_string()
    };
    let time = if raw.jam.trim().is_empty() {
        now.format("%H:%M").to_string()
    } else {
        raw.jam.trim().to_string()
    };

    let total = total_amount(&raw.harga_total);

    Ok(Transaction {
        date,
        time,
        direction,
        account: raw.kantong.trim().to_string(),
        description: raw.nama.trim().to_string(),
        unit: raw.satuan,
        quantity: raw.volume,
        unit_price: raw.harga_satuan,
        category,
        total_amount: total.max(0),
    })
}

fn total_amount(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or_else(|| {
            n.as_f64().map(|f| f.round() as i64).unwrap_or(0)
        }),
        serde_json::Value::String(s) => crate::record::clean_amount(s),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jakarta_now() -> DateTime<Tz> {
        chrono_tz::Asia::Jakarta
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_fenced_wrapped_payload() {
        let raw = r#"```json
        { "transaksi": [ { "tanggal": "2025-03-01", "jam": "08:15", "tipe": "Keluar", "kantong": "BCA", "nama": "Bensin Pertalite", "satuan": "liter", "volume": 2, "harga_satuan": 10000, "kategori": "Transportasi", "harga_total": 20000 } ] }
        ```"#;
        let txs = parse_transactions(raw, jakarta_now()).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].direction, Direction::Outflow);
        assert_eq!(txs[0].account, "BCA");
        assert_eq!(txs[0].category, Category::Transportasi);
        assert_eq!(txs[0].total_amount, 20000);
    }

    #[test]
    fn parses_bare_list_payload() {
        let raw = r#"[ { "tipe": "Masuk", "nama": "Gajian", "kategori": "Pemasukan", "harga_total": "5.000.000" } ]"#;
        let txs = parse_transactions(raw, jakarta_now()).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].account, "Tunai");
        assert_eq!(txs[0].total_amount, 5_000_000);
        assert_eq!(txs[0].date, "2025-03-01");
        assert_eq!(txs[0].time, "12:00");
    }

    #[test]
    fn empty_payload_is_no_transactions() {
        let txs = parse_transactions(r#"{ "transaksi": [] }"#, jakarta_now()).unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn unknown_direction_fails_the_batch() {
        let raw = r#"{ "transaksi": [ { "tipe": "Transfer", "nama": "x", "harga_total": 100 } ] }"#;
        assert!(matches!(
            parse_transactions(raw, jakarta_now()),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn inflow_category_is_coerced_to_pemasukan() {
        let raw = r#"{ "transaksi": [ { "tipe": "Masuk", "nama": "Bonus", "kategori": "Hiburan", "harga_total": 100000 } ] }"#;
        let txs = parse_transactions(raw, jakarta_now()).unwrap();
        assert_eq!(txs[0].category, Category::Pemasukan);
    }

    #[test]
    fn inflow_top_up_stays_lainnya() {
        let raw = r#"{ "transaksi": [ { "tipe": "Masuk", "nama": "Top Up GoPay", "kategori": "Lainnya", "harga_total": 50000 } ] }"#;
        let txs = parse_transactions(raw, jakarta_now()).unwrap();
        assert_eq!(txs[0].category, Category::Lainnya);
    }

    #[test]
    fn negative_total_is_clamped() {
        let raw = r#"{ "transaksi": [ { "tipe": "Keluar", "nama": "Refund ganda", "harga_total": -5000 } ] }"#;
        let txs = parse_transactions(raw, jakarta_now()).unwrap();
        assert_eq!(txs[0].total_amount, 0);
    }

    #[test]
    fn non_json_is_a_parse_error() {
        assert!(matches!(
            parse_transactions("maaf, saya tidak mengerti", jakarta_now()),
            Err(EngineError::Parse(_))
        ));
    }
}
