//! `Authorization: Bearer <token>` extraction.
//!
//! Only the header shape is checked here. Whether the token is any good is the
//! verifier's (and ultimately the backend's) business.

use axum::http::{HeaderMap, header};

const BEARER_PREFIX: &str = "Bearer ";

/// Returns the token after `Bearer ` when the header is present and well-formed.
///
/// The scheme match is case-sensitive and an empty remainder is treated as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
}
