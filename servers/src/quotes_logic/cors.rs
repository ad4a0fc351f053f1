use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

const WILDCARD: &str = "*";

/// Cross-origin policy handed to `build_router`.
///
/// `*` in any list means "everything". Browsers reject a literal `*` together
/// with credentials, so with credentials on the wildcard is answered by
/// mirroring the request's origin, method or headers.
#[derive(Debug, Clone, PartialEq)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec![WILDCARD.to_string()],
            allow_methods: vec![WILDCARD.to_string()],
            allow_headers: vec![WILDCARD.to_string()],
            allow_credentials: true,
        }
    }
}

fn is_wildcard(items: &[String]) -> bool {
    items.iter().any(|i| i.trim() == WILDCARD)
}

impl CorsConfig {
    /// Builds the tower-http layer. Entries that are not valid header text are skipped.
    pub fn layer(&self) -> CorsLayer {
        let origins = if is_wildcard(&self.allow_origins) {
            if self.allow_credentials { AllowOrigin::mirror_request() } else { Any.into() }
        } else {
            AllowOrigin::list(
                self.allow_origins
                    .iter()
                    .filter_map(|o| HeaderValue::from_str(o.trim()).ok()),
            )
        };

        let methods = if is_wildcard(&self.allow_methods) {
            if self.allow_credentials { AllowMethods::mirror_request() } else { Any.into() }
        } else {
            AllowMethods::list(
                self.allow_methods
                    .iter()
                    .filter_map(|m| Method::from_bytes(m.trim().to_uppercase().as_bytes()).ok()),
            )
        };

        let headers = if is_wildcard(&self.allow_headers) {
            if self.allow_credentials { AllowHeaders::mirror_request() } else { Any.into() }
        } else {
            AllowHeaders::list(
                self.allow_headers
                    .iter()
                    .filter_map(|h| HeaderName::from_bytes(h.trim().as_bytes()).ok()),
            )
        };

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(self.allow_credentials)
    }
}
