//! Auth backend interface used by the identity resolver and the auth handlers.
//!
//! The hosted backend owns users, passwords, email delivery and session
//! issuance. This crate only ever asks it questions.
use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::services::auth::pkce::PkceChallenge;
use crate::services::session::SessionCookies;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend-layer errors.
///
/// Note:
/// - Independent from `AppError` so the resolver can swallow them (fail closed)
///   while handlers surface them.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("auth backend returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("auth backend transport error: {0}")]
    Transport(String),
    #[error("auth backend response could not be decoded: {0}")]
    Decode(String),
}

/// A user record as reported by the backend.
///
/// Known fields are typed; anything else the backend sends is kept in `extra`
/// and serialized back out untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A session issued by the backend (password grant, PKCE exchange, sign-up).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Email + password pair. The password never shows up in Debug output.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Sign-up either yields a live session (auto-confirm) or a user awaiting
/// email confirmation.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    Session(Session),
    ConfirmationRequired(User),
}

/// Operations consumed from the hosted auth backend.
///
/// Implementations must be cheap to share (`Arc<dyn AuthBackend>`).
#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // "Who is the current user" from the ambient cookie session.
    //
    // Returns:
    // - Ok(Some(user)) if the session's access token is accepted
    // - Ok(None) if there is no session or the backend rejects it
    async fn user_from_session(&self, session: &SessionCookies) -> BackendResult<Option<User>>;

    // "Who is this" for a bearer access token.
    async fn user_from_token(&self, access_token: &str) -> BackendResult<Option<User>>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> BackendResult<Session>;

    async fn sign_up(
        &self,
        credentials: &Credentials,
        redirect_to: &str,
        pkce: &PkceChallenge,
    ) -> BackendResult<SignUpOutcome>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
        pkce: &PkceChallenge,
    ) -> BackendResult<()>;

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> BackendResult<Session>;

    async fn update_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> BackendResult<User>;

    // Revoke the session behind `access_token`. An already-dead session is not an error.
    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;
}
