/*
 * Responsibility
 * - GET /auth/callback: landing page for the backend's email links
 * - Trade `code` + the PKCE verifier cookie for a session, then redirect
 */
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{error::AppError, services::session::cookie, state::AppState};

const DEFAULT_NEXT: &str = "/dashboard";
const FAILURE_LOCATION: &str = "/auth/error?error=Authentication%20failed";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed; anything else falls back to
/// the dashboard so the callback cannot be used as an open redirect.
/// Control characters would not survive as a `Location` header.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => DEFAULT_NEXT,
    }
}

pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let code = query.code.as_deref().filter(|c| !c.is_empty());

    let Some(code) = code else {
        tracing::info!("auth callback without code");
        return Ok(Redirect::temporary(FAILURE_LOCATION).into_response());
    };

    let Some(verifier) = cookie::read_verifier(&jar, state.cookies()) else {
        tracing::info!("auth callback without code verifier cookie");
        return Ok(Redirect::temporary(FAILURE_LOCATION).into_response());
    };

    match state.backend().exchange_code_for_session(code, &verifier).await {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "auth callback completed");
            let jar = cookie::clear_verifier(jar, state.cookies());
            let jar = cookie::store_session(jar, &session, state.cookies())?;
            let next = safe_next(query.next.as_deref());
            Ok((jar, Redirect::temporary(next)).into_response())
        }
        Err(err) => {
            tracing::warn!(error = %err, "auth code exchange failed");
            Ok(Redirect::temporary(FAILURE_LOCATION).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_followed() {
        assert_eq!(safe_next(Some("/auth/update-password")), "/auth/update-password");
        assert_eq!(safe_next(Some("/")), "/");
    }

    #[test]
    fn missing_next_goes_to_dashboard() {
        assert_eq!(safe_next(None), "/dashboard");
    }

    #[test]
    fn off_site_targets_are_refused() {
        for target in [
            "https://evil.example",
            "//evil.example",
            "/\\evil.example",
            "dashboard",
            "/x\r\nSet-Cookie: a=b",
            "/tab\there",
        ] {
            assert_eq!(safe_next(Some(target)), "/dashboard", "followed {target:?}");
        }
    }
}
