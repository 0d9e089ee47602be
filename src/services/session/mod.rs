/*
 * Responsibility
 * - The ambient cookie session the backend client works from
 * - Cookie codec (read/write/chunk/clear)
 */
pub mod cookie;

use axum_extra::extract::cookie::CookieJar;
use secrecy::SecretString;

use crate::config::CookieSettings;

pub use cookie::CookieError;

/// Access token recovered from the request's session cookie.
///
/// A missing or unreadable cookie is simply an empty session; it is never an
/// error for the caller.
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    pub access_token: Option<SecretString>,
}

impl SessionCookies {
    pub fn from_jar(jar: &CookieJar, settings: &CookieSettings) -> Self {
        let Some(raw) = cookie::read_raw(jar, &settings.session_name()) else {
            return Self::default();
        };

        match cookie::decode_value(&raw) {
            Ok(stored) => Self {
                access_token: Some(stored.access_token)
                    .filter(|t| !t.is_empty())
                    .map(SecretString::from),
            },
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unreadable session cookie");
                Self::default()
            }
        }
    }
}
