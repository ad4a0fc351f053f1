//! # AwesomeAPI Dollar Rate
//!
//! Fallback USD/BRL source: a public aggregator with a plain JSON endpoint.

use crate::loggers::loggerlocal::LoggerLocal;
use crate::markets::currency::investing::parse_localized_price;
use crate::markets::currency::rate::{RateProvider, RateSample, RateSource};
use crate::markets::error::MarketError;
use crate::retrieve::ky_http::ApiClient;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const AWESOMEAPI_URL: &str = "https://economia.awesomeapi.com.br/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const LAST_PATH: &str = "json/last/USD-BRL";
const PAIR_KEY: &str = "USDBRL";
const CREATE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses `create_date` ("2025-10-14 17:59:58").
///
/// The aggregator reports local (Brasilia) wall-clock time, but the value is
/// tagged as UTC without conversion, so the result can be off by the local
/// offset.
pub fn parse_create_date(raw: &str) -> Result<DateTime<Utc>, MarketError> {
    NaiveDateTime::parse_from_str(raw.trim(), CREATE_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| MarketError::MalformedUpstreamResponse(format!("create_date {:?}: {}", raw, e)))
}

pub struct ApiCallAwesome {
    base_url: String,
    timeout: Duration,
    logger: Arc<LoggerLocal>,
}

impl ApiCallAwesome {
    pub fn new(logger: Arc<LoggerLocal>) -> Self {
        Self::with_base_url(AWESOMEAPI_URL, logger)
    }

    pub fn with_base_url(base_url: &str, logger: Arc<LoggerLocal>) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
            logger,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Single GET; any non-success status is an error.
    pub async fn fetch_usd_brl(&self) -> Result<RateSample, MarketError> {
        let client = ApiClient::new(&self.base_url, Some(self.timeout))?;
        let response = client.get(LAST_PATH, None).await?;

        if !response.success {
            self.logger
                .error(
                    &format!("AwesomeAPI request failed: Status {}", response.status),
                    Some(json!({"status": response.status})),
                )
                .await;
            return Err(MarketError::UpstreamHttp {
                status: response.status,
                url: response.url.to_string(),
            });
        }

        let body: Value = response
            .json()
            .map_err(|e| MarketError::MalformedUpstreamResponse(format!("AwesomeAPI body is not JSON: {}", e)))?;
        let pair = body
            .get(PAIR_KEY)
            .ok_or_else(|| MarketError::MalformedUpstreamResponse(format!("missing `{}`", PAIR_KEY)))?;

        let bid = pair
            .get("bid")
            .ok_or_else(|| MarketError::MalformedUpstreamResponse("missing field `bid`".into()))?;
        let create_date = pair
            .get("create_date")
            .and_then(Value::as_str)
            .ok_or_else(|| MarketError::MalformedUpstreamResponse("missing field `create_date`".into()))?;

        Ok(RateSample {
            source: RateSource::Awesomeapi,
            price: parse_localized_price(bid)?,
            datetime: parse_create_date(create_date)?,
        })
    }
}

#[async_trait]
impl RateProvider for ApiCallAwesome {
    async fn fetch_rate(&self) -> Result<RateSample, MarketError> {
        self.fetch_usd_brl().await
    }
}
