use crate::quotes_logic::cors::CorsConfig;
use crate::quotes_logic::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use lib_quotes::markets::barchart::futures::{collect_roots, parse_roots};
use lib_quotes::markets::currency::rate::RateSample;
use lib_quotes::markets::error::MarketError;
use serde::Deserialize;
use serde_json::{json, Value};

pub const ENDPOINTS: [&str; 4] = ["/", "/ping", "/futures?roots=CC,SB", "/dolar"];

/// Provider failures surface as a plain 500.
pub struct AppError(MarketError);

impl From<MarketError> for AppError {
    fn from(e: MarketError) -> Self {
        AppError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("Request failed ({}): {}", self.0.kind(), self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal Server Error: {}", self.0)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct FuturesParams {
    roots: Option<String>,
}

pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/ping", get(ping_handler).head(ping_head_handler))
        .route("/futures", get(futures_handler))
        .route("/dolar", get(dolar_handler))
        .layer(cors.layer())
        .with_state(state)
}

async fn index_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "futures and dollar quotes proxy",
        "endpoints": ENDPOINTS,
    }))
}

async fn ping_handler() -> Json<Value> {
    Json(json!({"ping": "pong"}))
}

async fn ping_head_handler() -> StatusCode {
    StatusCode::OK
}

async fn futures_handler(
    State(state): State<AppState>,
    Query(params): Query<FuturesParams>,
) -> Result<Response, AppError> {
    let roots = parse_roots(params.roots.as_deref());
    if roots.is_empty() {
        return Ok(Json(json!({"error": "missing `roots` query parameter, e.g. /futures?roots=CC,SB"})).into_response());
    }

    log::info!("Fetching futures for roots {:?}", roots);
    let report = collect_roots(state.quotes.as_ref(), &roots).await?;
    log::info!("Returning {} futures rows for {} roots", report.rows, report.roots.len());
    Ok(Json(report).into_response())
}

async fn dolar_handler(State(state): State<AppState>) -> Result<Json<RateSample>, AppError> {
    let sample = state.dollar.current().await?;
    log::info!("Dollar rate {} from {:?}", sample.price, sample.source);
    Ok(Json(sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use chrono::{TimeDelta, Utc};
    use lib_quotes::loggers::loggerlocal::LoggerLocal;
    use lib_quotes::markets::barchart::futures::{reshape_row, QuoteRow, QuoteSource};
    use lib_quotes::markets::currency::rate::{DollarRate, RateProvider, RateSource};
    use std::sync::{Arc, OnceLock};
    use tower::ServiceExt;

    struct StubQuotes;

    #[async_trait]
    impl QuoteSource for StubQuotes {
        async fn fetch_quotes(&self, root: &str) -> Result<Vec<QuoteRow>, MarketError> {
            let count = match root {
                "CC" => 2,
                "SB" => 3,
                _ => return Err(MarketError::NoDataForRoot(root.to_string())),
            };
            Ok((0..count)
                .map(|i| reshape_row(&json!({"symbol": format!("{root}{i}"), "lastPrice": i}), root))
                .collect())
        }
    }

    struct StubRate(fn() -> Result<RateSample, MarketError>);

    #[async_trait]
    impl RateProvider for StubRate {
        async fn fetch_rate(&self) -> Result<RateSample, MarketError> {
            (self.0)()
        }
    }

    /// Captured once so the served sample can be compared field for field.
    fn fresh_sample() -> RateSample {
        static SAMPLE: OnceLock<RateSample> = OnceLock::new();
        SAMPLE
            .get_or_init(|| RateSample {
                source: RateSource::Investing,
                price: 5.4321,
                datetime: Utc::now() - TimeDelta::minutes(2),
            })
            .clone()
    }

    fn fresh_primary() -> Result<RateSample, MarketError> {
        Ok(fresh_sample())
    }

    fn stale_primary() -> Result<RateSample, MarketError> {
        Ok(RateSample {
            source: RateSource::Investing,
            price: 5.4321,
            datetime: Utc::now() - TimeDelta::minutes(30),
        })
    }

    fn failing_primary() -> Result<RateSample, MarketError> {
        Err(MarketError::ConfigurationOrSiteChanged("blocked".into()))
    }

    fn fallback() -> Result<RateSample, MarketError> {
        Ok(RateSample {
            source: RateSource::Awesomeapi,
            price: 5.5,
            datetime: Utc::now(),
        })
    }

    fn failing_fallback() -> Result<RateSample, MarketError> {
        Err(MarketError::UpstreamHttp {
            status: 503,
            url: "https://fallback.test".into(),
        })
    }

    fn app(
        primary: fn() -> Result<RateSample, MarketError>,
        secondary: fn() -> Result<RateSample, MarketError>,
    ) -> Router {
        let dollar = DollarRate::new(
            Arc::new(StubRate(primary)),
            Arc::new(StubRate(secondary)),
            Arc::new(LoggerLocal::silent("test")),
        );
        let state = AppState::new(Arc::new(StubQuotes), Arc::new(dollar));
        build_router(state, &CorsConfig::default())
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let resp = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let (status, body) = get_json(app(fresh_primary, fallback), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["endpoints"].as_array().unwrap().len(), ENDPOINTS.len());
    }

    #[tokio::test]
    async fn ping_get_returns_pong() {
        let (status, body) = get_json(app(fresh_primary, fallback), "/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ping": "pong"}));
    }

    #[tokio::test]
    async fn ping_head_is_empty_200() {
        let resp = app(fresh_primary, fallback)
            .oneshot(Request::head("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn futures_concatenates_in_root_order() {
        let (status, body) = get_json(app(fresh_primary, fallback), "/futures?roots=sb,%20CC").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["roots"], json!(["SB", "CC"]));
        assert_eq!(body["rows"], 5);
        let contracts: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["Contract"].as_str().unwrap())
            .collect();
        assert_eq!(contracts, vec!["SB0", "SB1", "SB2", "CC0", "CC1"]);
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(body["data"][0]["Root"], "SB");
    }

    #[tokio::test]
    async fn futures_without_roots_returns_error_object() {
        for uri in ["/futures", "/futures?roots=", "/futures?roots=%20%20"] {
            let (status, body) = get_json(app(fresh_primary, fallback), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn futures_failure_aborts_with_500() {
        let resp = app(fresh_primary, fallback)
            .oneshot(Request::get("/futures?roots=CC,XX").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn dolar_uses_fresh_primary() {
        let expected = fresh_sample();
        let (status, body) = get_json(app(fresh_primary, fallback), "/dolar").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::to_value(&expected).unwrap());
        assert_eq!(body["source"], "investing");
        let datetime: chrono::DateTime<Utc> = body["datetime"].as_str().unwrap().parse().unwrap();
        assert_eq!(datetime, expected.datetime);
    }

    #[tokio::test]
    async fn dolar_falls_back_on_primary_error() {
        let (_, body) = get_json(app(failing_primary, fallback), "/dolar").await;
        assert_eq!(body["source"], "awesomeapi");
        assert_eq!(body["price"], 5.5);
    }

    #[tokio::test]
    async fn dolar_falls_back_on_stale_primary() {
        let (_, body) = get_json(app(stale_primary, fallback), "/dolar").await;
        assert_eq!(body["source"], "awesomeapi");
    }

    #[tokio::test]
    async fn dolar_fallback_failure_is_500() {
        let resp = app(failing_primary, failing_fallback)
            .oneshot(Request::get("/dolar").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn cors_mirrors_origin_with_credentials() {
        let resp = app(fresh_primary, fallback)
            .oneshot(
                Request::get("/ping")
                    .header(header::ORIGIN, "https://app.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = resp.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn cors_restricted_origin_is_not_echoed() {
        let cors = CorsConfig {
            allow_origins: vec!["https://only.example".into()],
            ..CorsConfig::default()
        };
        let dollar = DollarRate::new(
            Arc::new(StubRate(fresh_primary)),
            Arc::new(StubRate(fallback)),
            Arc::new(LoggerLocal::silent("test")),
        );
        let router = build_router(AppState::new(Arc::new(StubQuotes), Arc::new(dollar)), &cors);

        let resp = router
            .oneshot(
                Request::get("/ping")
                    .header(header::ORIGIN, "https://other.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
