//! # HTTP Retrieval Utilities
//!
//! An asynchronous session client around `reqwest`. Each `ApiClient` owns its
//! own cookie jar, so one instance corresponds to one upstream browser-like
//! session: cookies set by any response, redirect hops included, are kept in
//! the jar and replayed on the following calls.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures below the provider level: bad URLs and transport problems.
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// The base URL or a joined path could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// Connection, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A standardized container for API responses.
///
/// The body is always kept as text; callers decide whether it must be JSON.
#[derive(Debug)]
pub struct ApiResponse {
    /// The final URL of the request, after redirects.
    pub url: Url,
    /// The raw response body.
    pub body: String,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
}

impl ApiResponse {
    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// A session-scoped asynchronous HTTP client.
pub struct ApiClient {
    /// The underlying client, wired to `jar`.
    inner: reqwest::Client,
    /// Cookies collected over the whole session.
    jar: Arc<Jar>,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
}

impl ApiClient {
    /// Creates a new session.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL (e.g., "https://www.barchart.com/").
    /// * `timeout` - Optional per-request timeout. `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, RetrieveError> {
        let url = Url::parse(base_url)?;
        let jar = Arc::new(Jar::default());

        let mut builder = reqwest::Client::builder().cookie_provider(jar.clone());
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        Ok(Self {
            inner: builder.build()?,
            jar,
            base_url: url,
        })
    }

    /// Performs an HTTP request and captures status and body.
    ///
    /// `path` is joined onto the base URL; an absolute URL replaces it, which
    /// lets one session span several hosts of the same provider.
    ///
    /// Non-2xx statuses are not errors here: they come back with `success == false`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse, RetrieveError> {
        let full_url = self.base_url.join(path)?;
        let mut req = self.inner.request(method, full_url);

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(h) = headers {
            req = req.headers(h);
        }

        let response: reqwest::Response = req.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        Ok(ApiResponse {
            url,
            body,
            status: status.as_u16(),
            success: status.is_success(),
        })
    }

    /// Shorthand for a `GET` without query parameters.
    pub async fn get(&self, path: &str, headers: Option<HeaderMap>) -> Result<ApiResponse, RetrieveError> {
        self.request(Method::GET, path, &[], headers).await
    }

    /// Raw value of the session cookie `name` that the jar would send to `url`.
    ///
    /// Values are returned exactly as the server set them, without decoding.
    pub fn session_cookie(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.jar.cookies(url)?;
        let pairs = header.to_str().ok()?;
        pairs
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.to_string())
    }
}

/// Builds a `HeaderMap` from static pairs, skipping any that are not valid header text.
pub fn header_map(pairs: &[(&str, &str)]) -> HeaderMap {
    use reqwest::header::{HeaderName, HeaderValue};

    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        if let (Ok(h_name), Ok(h_value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            headers.insert(h_name, h_value);
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn session_keeps_cookies_and_status() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200)
                    .header("set-cookie", "SESSION=abc%253D; Path=/")
                    .body("<html></html>");
            })
            .await;

        let client = ApiClient::new(&server.base_url(), None).unwrap();
        let resp = client.get("/page", None).await.unwrap();

        page.assert_async().await;
        assert!(resp.success);
        assert_eq!(resp.status, 200);
        assert_eq!(client.session_cookie(&resp.url, "SESSION").as_deref(), Some("abc%253D"));
        assert_eq!(client.session_cookie(&resp.url, "MISSING"), None);
    }

    #[tokio::test]
    async fn cookies_from_redirect_hops_stay_in_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/start");
                then.status(302)
                    .header("set-cookie", "HOP=1; Path=/")
                    .header("location", "/landing");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/landing");
                then.status(200).body("landed");
            })
            .await;
        let echo = server
            .mock_async(|when, then| {
                when.method(GET).path("/next").header("cookie", "HOP=1");
                then.status(200);
            })
            .await;

        let client = ApiClient::new(&server.base_url(), None).unwrap();
        let resp = client.get("/start", None).await.unwrap();

        assert_eq!(resp.url.path(), "/landing");
        assert_eq!(client.session_cookie(&resp.url, "HOP").as_deref(), Some("1"));

        client.get("/next", None).await.unwrap();
        echo.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_is_not_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404).body("nope");
            })
            .await;

        let client = ApiClient::new(&server.base_url(), None).unwrap();
        let resp = client.get("/gone", None).await.unwrap();

        assert!(!resp.success);
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, "nope");
    }

    #[tokio::test]
    async fn query_and_headers_are_sent() {
        let server = MockServer::start_async().await;
        let api = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api")
                    .query_param("root", "CC")
                    .header("x-test", "1");
                then.status(200).json_body(serde_json::json!({"ok": true}));
            })
            .await;

        let client = ApiClient::new(&server.base_url(), None).unwrap();
        let resp = client
            .request(Method::GET, "/api", &[("root", "CC")], Some(header_map(&[("x-test", "1")])))
            .await
            .unwrap();

        api.assert_async().await;
        let body: serde_json::Value = resp.json().unwrap();
        assert_eq!(body["ok"], true);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(ApiClient::new("not a url", None), Err(RetrieveError::Url(_))));
    }

    #[test]
    fn header_map_skips_invalid_names() {
        let headers = header_map(&[("good", "v"), ("bad name", "v")]);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("good"));
    }
}
