//! # Dollar Rate Selection
//!
//! Two providers, one answer. The primary sample is used only while it is
//! fresh; anything else (a failed fetch or an old quote) moves on to the
//! fallback provider, whose own failure is final.
//!
//! The decision is made on an explicit `PrimaryOutcome` value rather than by
//! catching errors, so the stale-but-successful case is visible in the code.

use crate::loggers::loggerlocal::LoggerLocal;
use crate::markets::error::MarketError;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Default freshness window for the primary sample.
pub const MAX_SAMPLE_AGE_SECS: i64 = 600;

/// Which provider produced a sample. Serialized as the provider name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Investing,
    Awesomeapi,
}

/// One USD/BRL quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSample {
    pub source: RateSource,
    pub price: f64,
    pub datetime: DateTime<Utc>,
}

impl RateSample {
    /// Wall-clock difference between `now` and the sample's own timestamp.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.datetime
    }
}

/// A provider of dollar rate samples.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rate(&self) -> Result<RateSample, MarketError>;
}

/// Result of asking the primary provider.
#[derive(Debug)]
pub enum PrimaryOutcome {
    /// Sample is within the freshness window and is returned as is.
    Fresh(RateSample),
    /// Fetch succeeded but the quote is too old; the fallback is used.
    Stale(RateSample),
    /// Fetch failed; the fallback is used.
    Failed(MarketError),
}

/// Classifies a primary fetch result. An age equal to `max_age` is still fresh.
pub fn evaluate_primary(
    result: Result<RateSample, MarketError>,
    now: DateTime<Utc>,
    max_age: TimeDelta,
) -> PrimaryOutcome {
    match result {
        Ok(sample) if sample.age(now) <= max_age => PrimaryOutcome::Fresh(sample),
        Ok(sample) => PrimaryOutcome::Stale(sample),
        Err(e) => PrimaryOutcome::Failed(e),
    }
}

/// The `/dolar` service: primary provider with a single fallback.
pub struct DollarRate {
    primary: Arc<dyn RateProvider>,
    fallback: Arc<dyn RateProvider>,
    max_age: TimeDelta,
    logger: Arc<LoggerLocal>,
}

impl DollarRate {
    pub fn new(primary: Arc<dyn RateProvider>, fallback: Arc<dyn RateProvider>, logger: Arc<LoggerLocal>) -> Self {
        Self {
            primary,
            fallback,
            max_age: TimeDelta::seconds(MAX_SAMPLE_AGE_SECS),
            logger,
        }
    }

    /// Overrides the freshness window.
    pub fn with_max_age(mut self, max_age: TimeDelta) -> Self {
        self.max_age = max_age;
        self
    }

    /// Current dollar rate.
    ///
    /// Errors only when the fallback provider fails.
    pub async fn current(&self) -> Result<RateSample, MarketError> {
        let result = self.primary.fetch_rate().await;

        match evaluate_primary(result, Utc::now(), self.max_age) {
            PrimaryOutcome::Fresh(sample) => Ok(sample),
            PrimaryOutcome::Stale(sample) => {
                self.logger
                    .warn(
                        "Primary dollar rate is stale, using fallback",
                        Some(json!({
                            "datetime": sample.datetime.to_rfc3339(),
                            "max_age_secs": self.max_age.num_seconds()
                        })),
                    )
                    .await;
                self.fallback.fetch_rate().await
            }
            PrimaryOutcome::Failed(e) => {
                self.logger
                    .error(
                        &format!("Primary dollar rate failed, using fallback: {}", e),
                        Some(json!({"kind": e.kind()})),
                    )
                    .await;
                self.fallback.fetch_rate().await
            }
        }
    }
}
