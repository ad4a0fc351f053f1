//! # Futures Quotes
//!
//! Reshapes the quote API rows into the fixed output table and aggregates
//! several roots into one report.
//!
//! ## Key Features:
//! - **Fixed schema**: ten upstream fields are renamed and `Root` is appended,
//!   always in the same column order.
//! - **Pass-through values**: upstream values are not validated; whatever the
//!   site sends (numbers, formatted strings, nulls) is copied as is.
//! - **All-or-nothing aggregation**: roots are fetched one after another in the
//!   order given and the first failure aborts the whole report.

use crate::loggers::loggerlocal::LoggerLocal;
use crate::markets::barchart::apicall::{normalize_root, ApiCallBarchart};
use crate::markets::error::MarketError;
use crate::utils::time::iso_utc_z;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// One contract line in the output table.
///
/// Field order here is the column order of the serialized JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRow {
    #[serde(rename = "Contract")]
    pub contract: Value,
    #[serde(rename = "Last")]
    pub last: Value,
    #[serde(rename = "Change")]
    pub change: Value,
    #[serde(rename = "Open")]
    pub open: Value,
    #[serde(rename = "High")]
    pub high: Value,
    #[serde(rename = "Low")]
    pub low: Value,
    #[serde(rename = "Previous")]
    pub previous: Value,
    #[serde(rename = "Volume")]
    pub volume: Value,
    #[serde(rename = "Open_Int")]
    pub open_int: Value,
    #[serde(rename = "Time")]
    pub time: Value,
    #[serde(rename = "Root")]
    pub root: String,
}

/// Output column names in serialization order.
pub const OUTPUT_COLUMNS: [&str; 11] = [
    "Contract", "Last", "Change", "Open", "High", "Low", "Previous", "Volume", "Open_Int", "Time", "Root",
];

/// Reads one upstream field.
///
/// Numeric columns prefer the unformatted `raw` object the API adds when asked
/// with `raw=1`; labels (contract, time) keep the site's display text.
fn pick(row: &Value, field: &str, prefer_raw: bool) -> Value {
    if prefer_raw {
        if let Some(v) = row.get("raw").and_then(|raw| raw.get(field)) {
            return v.clone();
        }
    }
    row.get(field).cloned().unwrap_or(Value::Null)
}

/// Projects one upstream row onto the output schema and tags it with `root`.
pub fn reshape_row(row: &Value, root: &str) -> QuoteRow {
    QuoteRow {
        contract: pick(row, "symbol", false),
        last: pick(row, "lastPrice", true),
        change: pick(row, "priceChange", true),
        open: pick(row, "openPrice", true),
        high: pick(row, "highPrice", true),
        low: pick(row, "lowPrice", true),
        previous: pick(row, "previousPrice", true),
        volume: pick(row, "volume", true),
        open_int: pick(row, "openInterest", true),
        time: pick(row, "tradeTime", false),
        root: root.to_string(),
    }
}

pub fn reshape_rows(rows: &[Value], root: &str) -> Vec<QuoteRow> {
    rows.iter().map(|row| reshape_row(row, root)).collect()
}

/// Splits a `roots` query value on commas, trimming and uppercasing each item.
///
/// Blank items are dropped; duplicates and order are kept.
pub fn parse_roots(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(normalize_root)
        .filter(|r| !r.is_empty())
        .collect()
}

/// Anything that can produce reshaped rows for a single root.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quotes(&self, root: &str) -> Result<Vec<QuoteRow>, MarketError>;
}

/// The `/futures` response body.
#[derive(Debug, Clone, Serialize)]
pub struct FuturesReport {
    /// Generation time, ISO-8601 UTC with a trailing `Z`.
    pub timestamp: String,
    pub roots: Vec<String>,
    pub rows: usize,
    pub data: Vec<QuoteRow>,
}

/// Fetches every root in order and concatenates the rows.
///
/// The first failing root aborts the report; no partial result is returned.
pub async fn collect_roots(source: &dyn QuoteSource, roots: &[String]) -> Result<FuturesReport, MarketError> {
    let mut data = Vec::new();
    for root in roots {
        let rows = source.fetch_quotes(root).await?;
        data.extend(rows);
    }

    Ok(FuturesReport {
        timestamp: iso_utc_z(&Utc::now()),
        roots: roots.to_vec(),
        rows: data.len(),
        data,
    })
}

/// Barchart-backed `QuoteSource`.
pub struct FuturesQuotes {
    api_call: Arc<ApiCallBarchart>,
    logger: Arc<LoggerLocal>,
}

impl FuturesQuotes {
    pub fn new(api_call: Arc<ApiCallBarchart>, logger: Arc<LoggerLocal>) -> Self {
        Self { api_call, logger }
    }
}

#[async_trait]
impl QuoteSource for FuturesQuotes {
    async fn fetch_quotes(&self, root: &str) -> Result<Vec<QuoteRow>, MarketError> {
        let root = normalize_root(root);
        match self.api_call.fetch_root(&root).await {
            Ok(raw) => Ok(reshape_rows(&raw, &root)),
            Err(e) => {
                self.logger
                    .error(
                        &format!("Futures fetch failed for {}: {}", root, e),
                        Some(json!({"root": root, "kind": e.kind()})),
                    )
                    .await;
                Err(e)
            }
        }
    }
}
