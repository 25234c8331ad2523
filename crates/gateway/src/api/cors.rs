//! CORS for browser clients of the liveness endpoints.
//!
//! Browsers only call the API with `GET`/`POST` plus the multipart
//! `Content-Type` and the bearer `Authorization` header, so nothing else is
//! allowed through. Origins ending in `:*` match any numeric port on that
//! host. A lone `"*"` allows every origin but never credentials.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use lv_domain::config::CorsConfig;

const ALLOWED_METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if cors.allowed_origins.len() == 1 && cors.allowed_origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard \"*\", all origins allowed");
        return base.allow_origin(tower_http::cors::Any);
    }

    let matcher = OriginMatcher::new(&cors.allowed_origins);
    base.allow_origin(AllowOrigin::predicate(move |origin, _| {
        origin.to_str().map(|o| matcher.matches(o)).unwrap_or(false)
    }))
    .allow_credentials(true)
}

/// Exact origins plus `scheme://host:` prefixes taken from `:*` entries.
#[derive(Debug, Clone, Default)]
struct OriginMatcher {
    exact: Vec<String>,
    any_port: Vec<String>,
}

impl OriginMatcher {
    fn new(origins: &[String]) -> Self {
        let mut matcher = Self::default();
        for origin in origins {
            if let Some(prefix) = origin.strip_suffix('*').filter(|p| p.ends_with(':')) {
                matcher.any_port.push(prefix.to_owned());
            } else if origin.parse::<HeaderValue>().is_ok() {
                matcher.exact.push(origin.clone());
            } else {
                tracing::warn!(origin = %origin, "invalid CORS origin, skipping");
            }
        }
        matcher
    }

    fn matches(&self, origin: &str) -> bool {
        if self.exact.iter().any(|e| e == origin) {
            return true;
        }
        self.any_port.iter().any(|prefix| {
            origin
                .strip_prefix(prefix.as_str())
                .map(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or(false)
        })
    }
}
