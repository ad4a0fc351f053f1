//! # Investing Real-Time Dollar Rate
//!
//! Primary USD/BRL source. The real-time endpoint lives on the API host but
//! only answers AJAX-looking requests from a session that has loaded the
//! currency page first, so both calls share one `ApiClient`.

use crate::loggers::loggerlocal::LoggerLocal;
use crate::markets::currency::rate::{RateProvider, RateSample, RateSource};
use crate::markets::error::MarketError;
use crate::retrieve::ky_http::{header_map, ApiClient, RetrieveError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Site host serving the currency page.
pub const INVESTING_PAGE_URL: &str = "https://br.investing.com/";
/// Host serving the real-time JSON API.
pub const INVESTING_API_URL: &str = "https://api.investing.com/";
/// Instrument id of USD/BRL.
pub const USD_BRL_PAIR_ID: u32 = 2103;
/// Regional domain the API scopes prices to.
pub const DOMAIN_ID: &str = "br";
/// Timeout applied to each of the two calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const PAGE_PATH: &str = "currencies/usd-brl";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Parses a price that may use a decimal comma ("5,4321") or be a JSON number.
pub fn parse_localized_price(value: &Value) -> Result<f64, MarketError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MarketError::MalformedUpstreamResponse(format!("price out of range: {}", n))),
        Value::String(s) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|e| MarketError::MalformedUpstreamResponse(format!("price {:?} not numeric: {}", s, e))),
        other => Err(MarketError::MalformedUpstreamResponse(format!("price has unexpected type: {}", other))),
    }
}

/// Parses Unix epoch seconds given as a JSON number or numeric string.
pub fn parse_epoch_seconds(value: &Value) -> Result<DateTime<Utc>, MarketError> {
    let secs = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| MarketError::MalformedUpstreamResponse(format!("timestamp not numeric: {}", value)))?;

    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| MarketError::MalformedUpstreamResponse(format!("timestamp out of range: {}", secs)))
}

pub struct ApiCallInvesting {
    page_url: String,
    api_url: String,
    timeout: Duration,
    logger: Arc<LoggerLocal>,
}

impl ApiCallInvesting {
    pub fn new(logger: Arc<LoggerLocal>) -> Self {
        Self::with_urls(INVESTING_PAGE_URL, INVESTING_API_URL, logger)
    }

    pub fn with_urls(page_url: &str, api_url: &str, logger: Arc<LoggerLocal>) -> Self {
        Self {
            page_url: page_url.to_string(),
            api_url: api_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
            logger,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn realtime_url(&self) -> Result<Url, MarketError> {
        let path = format!("api/financialdata/{}/realtime", USD_BRL_PAIR_ID);
        let url = Url::parse(&self.api_url)
            .and_then(|base| base.join(&path))
            .map_err(RetrieveError::from)?;
        Ok(url)
    }

    /// Loads the currency page, then reads `last` and `lastUpdateTimestamp`
    /// from the real-time endpoint.
    pub async fn fetch_usd_brl(&self) -> Result<RateSample, MarketError> {
        let client = ApiClient::new(&self.page_url, Some(self.timeout))?;

        let page = client
            .get(PAGE_PATH, Some(header_map(&[("user-agent", USER_AGENT)])))
            .await?;
        if !page.success {
            self.logger
                .warn(
                    &format!("Investing currency page returned status {}", page.status),
                    Some(json!({"url": page.url.to_string()})),
                )
                .await;
        }

        let referer = page.url.to_string();
        let realtime_url = self.realtime_url()?;
        let headers = header_map(&[
            ("accept", "application/json, text/plain, */*"),
            ("user-agent", USER_AGENT),
            ("x-requested-with", "XMLHttpRequest"),
            ("domain-id", DOMAIN_ID),
            ("referer", referer.as_str()),
        ]);
        let response = client.get(realtime_url.as_str(), Some(headers)).await?;

        if response.status != 200 {
            return Err(MarketError::UpstreamHttp {
                status: response.status,
                url: response.url.to_string(),
            });
        }

        let body: Value = response
            .json()
            .map_err(|e| MarketError::MalformedUpstreamResponse(format!("realtime body is not JSON: {}", e)))?;

        let last = body
            .get("last")
            .ok_or_else(|| MarketError::MalformedUpstreamResponse("missing field `last`".into()))?;
        let updated = body
            .get("lastUpdateTimestamp")
            .ok_or_else(|| MarketError::MalformedUpstreamResponse("missing field `lastUpdateTimestamp`".into()))?;

        let sample = RateSample {
            source: RateSource::Investing,
            price: parse_localized_price(last)?,
            datetime: parse_epoch_seconds(updated)?,
        };

        self.logger
            .debug(
                "Investing dollar rate fetched",
                Some(json!({"price": sample.price, "datetime": sample.datetime.to_rfc3339()})),
            )
            .await;
        Ok(sample)
    }
}

#[async_trait]
impl RateProvider for ApiCallInvesting {
    async fn fetch_rate(&self) -> Result<RateSample, MarketError> {
        self.fetch_usd_brl().await
    }
}
