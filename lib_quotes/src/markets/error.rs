use crate::retrieve::ky_http::RetrieveError;
use thiserror::Error;

/// Errors raised by the market provider clients.
#[derive(Debug, Error)]
pub enum MarketError {
    /// An expected cookie or token was absent; the provider site most likely changed.
    #[error("configuration or site changed: {0}")]
    ConfigurationOrSiteChanged(String),

    #[error("upstream HTTP error: status {status} from {url}")]
    UpstreamHttp { status: u16, url: String },

    #[error("no data for root {0}")]
    NoDataForRoot(String),

    /// Body was not JSON, or required keys were missing or unparsable.
    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error(transparent)]
    Retrieve(#[from] RetrieveError),
}

impl MarketError {
    /// Short machine-friendly tag, used in structured log extras.
    pub fn kind(&self) -> &'static str {
        match self {
            MarketError::ConfigurationOrSiteChanged(_) => "configuration_or_site_changed",
            MarketError::UpstreamHttp { .. } => "upstream_http",
            MarketError::NoDataForRoot(_) => "no_data_for_root",
            MarketError::MalformedUpstreamResponse(_) => "malformed_upstream_response",
            MarketError::Retrieve(_) => "retrieve",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_url() {
        let err = MarketError::UpstreamHttp {
            status: 503,
            url: "https://example.test/x".into(),
        };
        assert_eq!(err.to_string(), "upstream HTTP error: status 503 from https://example.test/x");
        assert_eq!(err.kind(), "upstream_http");
    }
}
