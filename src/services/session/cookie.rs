//! Session cookie codec.
//!
//! Format (compatible with the backend's browser/SSR client libraries):
//! - name: `<prefix>-auth-token`
//! - value: `base64-` + base64url(JSON session), or bare JSON from older clients
//! - values longer than `MAX_CHUNK_LEN` are split into `<name>.0`, `<name>.1`, ...

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;
use thiserror::Error;

use crate::config::CookieSettings;
use crate::services::backend::Session;

const BASE64_MARKER: &str = "base64-";
const MAX_CHUNK_LEN: usize = 3180;
const MAX_CHUNKS: usize = 32;
// 400 days, the longest lifetime browsers accept.
const SESSION_MAX_AGE: time::Duration = time::Duration::days(400);
const VERIFIER_MAX_AGE: time::Duration = time::Duration::hours(1);

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("session cookie is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("session cookie is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session cookie is not utf-8")]
    Utf8,
}

/// The subset of the stored session this service needs.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
}

pub fn decode_value(raw: &str) -> Result<StoredSession, CookieError> {
    let json = match raw.strip_prefix(BASE64_MARKER) {
        Some(encoded) => {
            let bytes = URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('='))?;
            String::from_utf8(bytes).map_err(|_| CookieError::Utf8)?
        }
        None => raw.to_string(),
    };
    Ok(serde_json::from_str(&json)?)
}

pub fn encode_value(session: &Session) -> Result<String, CookieError> {
    let json = serde_json::to_vec(session)?;
    Ok(format!("{BASE64_MARKER}{}", URL_SAFE_NO_PAD.encode(json)))
}

/// Read the (possibly chunked) raw cookie value.
pub fn read_raw(jar: &CookieJar, name: &str) -> Option<String> {
    if let Some(cookie) = jar.get(name) {
        return Some(cookie.value().to_string());
    }

    let mut value = String::new();
    for i in 0..MAX_CHUNKS {
        match jar.get(&format!("{name}.{i}")) {
            Some(chunk) => value.push_str(chunk.value()),
            None => break,
        }
    }

    (!value.is_empty()).then_some(value)
}

/// Split `value` into cookie-sized pieces. A short value stays a single cookie.
pub fn chunk(name: &str, value: &str) -> Vec<(String, String)> {
    if value.len() <= MAX_CHUNK_LEN {
        return vec![(name.to_string(), value.to_string())];
    }

    // base64url output is ASCII, so byte offsets are char boundaries.
    value
        .as_bytes()
        .chunks(MAX_CHUNK_LEN)
        .enumerate()
        .map(|(i, part)| {
            (
                format!("{name}.{i}"),
                String::from_utf8_lossy(part).into_owned(),
            )
        })
        .collect()
}

fn base_cookie(name: String, value: String, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure)
        .build()
}

/// Removal cookies for the session cookie and every chunk the client sent.
fn expire_session(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    let name = settings.session_name();
    let chunk_prefix = format!("{name}.");

    let stale: Vec<String> = jar
        .iter()
        .map(|c| c.name().to_string())
        .filter(|n| *n == name || n.starts_with(&chunk_prefix))
        .collect();

    stale.into_iter().fold(jar, |jar, n| {
        jar.remove(Cookie::build((n, "")).path("/"))
    })
}

/// Replace whatever session the client holds with `session`.
pub fn store_session(
    jar: CookieJar,
    session: &Session,
    settings: &CookieSettings,
) -> Result<CookieJar, CookieError> {
    let value = encode_value(session)?;
    let jar = expire_session(jar, settings);

    Ok(chunk(&settings.session_name(), &value)
        .into_iter()
        .fold(jar, |jar, (name, part)| {
            let mut cookie = base_cookie(name, part, settings);
            cookie.set_max_age(SESSION_MAX_AGE);
            jar.add(cookie)
        }))
}

pub fn clear_session(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    expire_session(jar, settings)
}

pub fn store_verifier(jar: CookieJar, verifier: &str, settings: &CookieSettings) -> CookieJar {
    let mut cookie = base_cookie(settings.verifier_name(), verifier.to_string(), settings);
    cookie.set_max_age(VERIFIER_MAX_AGE);
    jar.add(cookie)
}

pub fn read_verifier(jar: &CookieJar, settings: &CookieSettings) -> Option<String> {
    jar.get(&settings.verifier_name())
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub fn clear_verifier(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.remove(Cookie::build((settings.verifier_name(), "")).path("/"))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};
    use serde_json::json;

    use super::*;

    fn settings() -> CookieSettings {
        CookieSettings {
            prefix: "sb".into(),
            secure: false,
        }
    }

    fn session(access_token: &str) -> Session {
        serde_json::from_value(json!({
            "access_token": access_token,
            "refresh_token": "refresh-1",
            "expires_in": 3600,
            "expires_at": 1_900_000_000,
            "token_type": "bearer",
            "user": { "id": "8d0fd2b4-5a1e-4a34-9d4e-0c1f2a3b4c5d", "email": "ada@example.com" }
        }))
        .unwrap()
    }

    fn jar_from_cookie_header(value: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn decodes_base64_value() {
        let raw = encode_value(&session("access-1")).unwrap();
        assert!(raw.starts_with("base64-"));

        let stored = decode_value(&raw).unwrap();
        assert_eq!(stored.access_token, "access-1");
    }

    #[test]
    fn decodes_bare_json_value() {
        let stored = decode_value(r#"{"access_token":"legacy","refresh_token":"r"}"#).unwrap();
        assert_eq!(stored.access_token, "legacy");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_value("base64-***"), Err(CookieError::Base64(_))));
        assert!(matches!(decode_value("not json"), Err(CookieError::Json(_))));
    }

    #[test]
    fn short_values_are_not_chunked() {
        let parts = chunk("sb-auth-token", "abc");
        assert_eq!(parts, vec![("sb-auth-token".to_string(), "abc".to_string())]);
    }

    #[test]
    fn long_values_are_chunked_and_reassembled() {
        let value = "x".repeat(MAX_CHUNK_LEN * 2 + 10);
        let parts = chunk("sb-auth-token", &value);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].0, "sb-auth-token.2");

        let header = parts
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        let jar = jar_from_cookie_header(&header);
        assert_eq!(read_raw(&jar, "sb-auth-token").as_deref(), Some(value.as_str()));
    }

    #[test]
    fn missing_cookie_reads_as_none() {
        let jar = jar_from_cookie_header("other=1");
        assert_eq!(read_raw(&jar, "sb-auth-token"), None);
    }

    #[test]
    fn store_session_sets_hardened_cookie() {
        let jar = store_session(CookieJar::new(), &session("access-1"), &settings()).unwrap();
        let cookie = jar.get("sb-auth-token").unwrap();

        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            decode_value(cookie.value()).unwrap().access_token,
            "access-1"
        );
    }

    #[test]
    fn clear_session_drops_every_chunk() {
        let jar = jar_from_cookie_header("sb-auth-token.0=a; sb-auth-token.1=b; keep=1");
        let jar = clear_session(jar, &settings());

        assert!(jar.get("sb-auth-token.0").is_none());
        assert!(jar.get("sb-auth-token.1").is_none());
        assert!(jar.get("keep").is_some());
    }

    #[test]
    fn verifier_cookie_round_trip() {
        let jar = store_verifier(CookieJar::new(), "verifier-1", &settings());
        assert_eq!(read_verifier(&jar, &settings()).as_deref(), Some("verifier-1"));

        let jar = clear_verifier(jar, &settings());
        assert_eq!(read_verifier(&jar, &settings()), None);
    }
}
