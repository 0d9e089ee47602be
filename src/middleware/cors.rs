//! CORS policy for browser clients.
//!
//! Policy:
//! - Development: any origin, no credentials (bearer-token clients only).
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`, with
//!   credentials so the session cookie travels on cross-origin calls.
//!   An empty allowlist emits no CORS headers at all.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

pub fn apply(router: Router, config: &Config) -> Router {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(std::time::Duration::from_secs(60 * 10));

    let cors = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        // Never combine credentials with a wildcard origin.
        base.allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req| allowed.iter().any(|v| v == origin),
        ))
        .allow_credentials(true)
    } else {
        base.allow_origin(Any)
    };

    router.layer(cors)
}
