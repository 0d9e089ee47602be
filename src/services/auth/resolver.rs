use std::sync::Arc;

use axum::http::HeaderMap;
use secrecy::SecretString;
use serde::Serialize;

use crate::services::auth::bearer::bearer_token;
use crate::services::auth::verifier::TokenVerifier;
use crate::services::backend::{AuthBackend, User};
use crate::services::session::SessionCookies;

/// Where the identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentitySource {
    Session,
    Bearer,
}

/// A backend-confirmed principal for the current request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub source: IdentitySource,
    // The credential the backend accepted; handlers reuse it for user-scoped calls.
    pub access_token: SecretString,
}

/// Cookie session first, bearer token second.
///
/// Every failure collapses to `None`; callers turn that into 401.
#[derive(Clone)]
pub struct IdentityResolver {
    backend: Arc<dyn AuthBackend>,
    verifier: TokenVerifier,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("backend", &self.backend.backend_name())
            .field("verifier", &self.verifier)
            .finish()
    }
}

impl IdentityResolver {
    pub fn new(backend: Arc<dyn AuthBackend>, verifier: TokenVerifier) -> Self {
        Self { backend, verifier }
    }

    pub fn backend(&self) -> &dyn AuthBackend {
        self.backend.as_ref()
    }

    /// False when no signing secret is configured (bearer path always fails).
    pub fn bearer_enabled(&self) -> bool {
        self.verifier.has_secret()
    }

    pub async fn resolve(&self, headers: &HeaderMap, session: &SessionCookies) -> Option<Identity> {
        // 1. cookie session (short-circuits)
        if let Some(access_token) = &session.access_token {
            match self.backend.user_from_session(session).await {
                Ok(Some(user)) => {
                    return Some(Identity {
                        user,
                        source: IdentitySource::Session,
                        access_token: access_token.clone(),
                    });
                }
                Ok(None) => tracing::debug!("session cookie not accepted by backend"),
                Err(err) => tracing::debug!(error = %err, "session lookup failed"),
            }
        }

        // 2. bearer token
        let token = bearer_token(headers)?;

        // 3. local signature check before any network round trip
        if !self.verifier.is_valid(token) {
            tracing::debug!("bearer token failed local verification");
            return None;
        }

        // 4. the backend has the final word
        match self.backend.user_from_token(token).await {
            Ok(Some(user)) => Some(Identity {
                user,
                source: IdentitySource::Bearer,
                access_token: SecretString::from(token.to_string()),
            }),
            Ok(None) => {
                tracing::debug!("bearer token not accepted by backend");
                None
            }
            Err(err) => {
                tracing::debug!(error = %err, "bearer lookup failed");
                None
            }
        }
    }
}
