//! # Barchart API Client
//!
//! Session-based client for the futures quote site. The site's internal quote
//! API only answers requests that present the anti-forgery token handed out
//! as a cookie by a regular page load, so every root costs two calls on one
//! fresh session: the listing page, then the data endpoint.

use crate::loggers::loggerlocal::LoggerLocal;
use crate::markets::error::MarketError;
use crate::retrieve::ky_http::{header_map, ApiClient};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;

/// Production site root.
pub const BARCHART_BASE_URL: &str = "https://www.barchart.com/";
/// Cookie carrying the anti-forgery token.
pub const TOKEN_COOKIE: &str = "XSRF-TOKEN";
/// Header the data endpoint expects the decoded token in.
pub const TOKEN_HEADER: &str = "x-xsrf-token";
/// Fields requested from the quote API, one per output column except `Root`.
pub const QUOTE_FIELDS: &str =
    "symbol,lastPrice,priceChange,openPrice,highPrice,lowPrice,previousPrice,volume,openInterest,tradeTime";

const DATA_PATH: &str = "proxies/core-api/v1/quotes/get";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Trims and uppercases a root symbol as typed by a caller.
pub fn normalize_root(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// The cookie value is percent-encoded twice by the site.
pub fn decode_token(raw: &str) -> Result<String, MarketError> {
    let once = urlencoding::decode(raw)
        .map_err(|e| MarketError::MalformedUpstreamResponse(format!("token cookie is not UTF-8: {}", e)))?;
    let twice = urlencoding::decode(&once)
        .map_err(|e| MarketError::MalformedUpstreamResponse(format!("token cookie is not UTF-8: {}", e)))?;
    Ok(twice.into_owned())
}

pub struct ApiCallBarchart {
    base_url: String,
    logger: Arc<LoggerLocal>,
}

impl ApiCallBarchart {
    pub fn new(logger: Arc<LoggerLocal>) -> Self {
        Self::with_base_url(BARCHART_BASE_URL, logger)
    }

    /// Points the client at another host, e.g. a mock server.
    pub fn with_base_url(base_url: &str, logger: Arc<LoggerLocal>) -> Self {
        Self {
            base_url: base_url.to_string(),
            logger,
        }
    }

    /// Fetches the raw contract rows for one root.
    ///
    /// ## Logic:
    /// 1. Open a new session and load the root's futures listing page.
    /// 2. Look up the `XSRF-TOKEN` cookie in the session jar and decode it.
    /// 3. Call the quote API with the token header and the root.
    /// 4. Return the `data` array; an absent or empty array is `NoDataForRoot`.
    ///
    /// There is no retry. Each call opens its own session.
    pub async fn fetch_root(&self, root: &str) -> Result<Vec<Value>, MarketError> {
        let root = normalize_root(root);
        let client = ApiClient::new(&self.base_url, None)?;

        let listing_path = format!("futures/quotes/{}*0/futures-prices", root);
        let page = client.get(&listing_path, Some(Self::browser_headers())).await?;
        if !page.success {
            self.logger
                .error(
                    &format!("Barchart listing page failed for {}: Status {}", root, page.status),
                    Some(json!({"root": root, "status": page.status})),
                )
                .await;
            return Err(MarketError::UpstreamHttp {
                status: page.status,
                url: page.url.to_string(),
            });
        }

        // The token may arrive on a redirect hop, so read the jar rather than the last response.
        let Some(raw_token) = client.session_cookie(&page.url, TOKEN_COOKIE) else {
            let msg = format!("{} cookie not found in session", TOKEN_COOKIE);
            self.logger.fatal(&msg, Some(json!({"root": root}))).await;
            return Err(MarketError::ConfigurationOrSiteChanged(msg));
        };
        let token = decode_token(&raw_token)?;

        let query = [
            ("fields", QUOTE_FIELDS),
            ("list", "futures.contractInRoot"),
            ("root", root.as_str()),
            ("hasOptions", "true"),
            ("raw", "1"),
        ];
        let response = client
            .request(Method::GET, DATA_PATH, &query, Some(Self::api_headers(&token, page.url.as_str())))
            .await?;

        if !response.success {
            self.logger
                .error(
                    &format!("Barchart quote API failed for {}: Status {}", root, response.status),
                    Some(json!({"root": root, "status": response.status})),
                )
                .await;
            return Err(MarketError::UpstreamHttp {
                status: response.status,
                url: response.url.to_string(),
            });
        }

        let body: Value = response
            .json()
            .map_err(|e| MarketError::MalformedUpstreamResponse(format!("quote API body is not JSON: {}", e)))?;

        match body.get("data").and_then(Value::as_array) {
            Some(rows) if !rows.is_empty() => {
                self.logger
                    .debug(&format!("Barchart returned {} rows for {}", rows.len(), root), None)
                    .await;
                Ok(rows.clone())
            }
            _ => {
                self.logger
                    .warn(&format!("Barchart returned no data for {}", root), Some(json!({"root": root})))
                    .await;
                Err(MarketError::NoDataForRoot(root))
            }
        }
    }

    fn browser_headers() -> HeaderMap {
        header_map(&[
            ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
            ("accept-language", "en-US,en;q=0.9"),
            ("cache-control", "no-cache"),
            ("user-agent", USER_AGENT),
        ])
    }

    fn api_headers(token: &str, referer: &str) -> HeaderMap {
        header_map(&[
            ("accept", "application/json, text/plain, */*"),
            ("accept-language", "en-US,en;q=0.9"),
            ("referer", referer),
            ("user-agent", USER_AGENT),
            (TOKEN_HEADER, token),
        ])
    }
}
