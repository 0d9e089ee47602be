//! In-memory `AuthBackend` for tests. Counts every call so tests can assert
//! which backend operations a flow actually touched.
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::services::auth::pkce::PkceChallenge;
use crate::services::backend::client::{
    AuthBackend, BackendError, BackendResult, Credentials, Session, SignUpOutcome, User,
};
use crate::services::session::SessionCookies;

pub fn user(id: &str, email: &str) -> User {
    serde_json::from_value(json!({ "id": id, "email": email, "aud": "authenticated" })).unwrap()
}

pub fn session_for(user: &User, access_token: &str) -> Session {
    Session {
        access_token: access_token.to_string(),
        token_type: "bearer".into(),
        expires_in: Some(3600),
        expires_at: Some(1_900_000_000),
        refresh_token: format!("refresh-{access_token}"),
        user: user.clone(),
    }
}

fn outage() -> BackendError {
    BackendError::Transport("connection refused".into())
}

#[derive(Default)]
pub struct FakeBackend {
    /// Access token accepted from the session cookie, and who it belongs to.
    pub session: Option<(String, User)>,
    /// Access token accepted as a bearer credential, and who it belongs to.
    pub token: Option<(String, User)>,
    pub fail_session_lookup: bool,
    pub fail_token_lookup: bool,
    pub fail_sign_out: bool,
    /// Password accepted by `sign_in_with_password`.
    pub password: Option<String>,
    /// Verifier accepted by `exchange_code_for_session` for code `"code-1"`.
    pub code_verifier: Option<String>,
    pub autoconfirm: bool,

    pub session_lookups: AtomicUsize,
    pub token_lookups: AtomicUsize,
    pub sign_outs: AtomicUsize,
    pub last_redirect_to: Mutex<Option<String>>,
    pub last_password_update: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn session_lookups(&self) -> usize {
        self.session_lookups.load(Ordering::SeqCst)
    }

    pub fn token_lookups(&self) -> usize {
        self.token_lookups.load(Ordering::SeqCst)
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    fn known_user(&self, token: &str) -> Option<User> {
        [&self.session, &self.token]
            .into_iter()
            .flatten()
            .find(|(t, _)| t == token)
            .map(|(_, u)| u.clone())
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    async fn user_from_session(&self, session: &SessionCookies) -> BackendResult<Option<User>> {
        self.session_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_session_lookup {
            return Err(outage());
        }
        let Some(token) = &session.access_token else {
            return Ok(None);
        };
        Ok(self
            .session
            .as_ref()
            .filter(|(t, _)| t == token.expose_secret())
            .map(|(_, u)| u.clone()))
    }

    async fn user_from_token(&self, access_token: &str) -> BackendResult<Option<User>> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_token_lookup {
            return Err(outage());
        }
        Ok(self
            .token
            .as_ref()
            .filter(|(t, _)| t == access_token)
            .map(|(_, u)| u.clone()))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> BackendResult<Session> {
        match &self.password {
            Some(p) if p == credentials.password.expose_secret() => Ok(session_for(
                &user("8d0fd2b4-5a1e-4a34-9d4e-0c1f2a3b4c5d", &credentials.email),
                "login-access",
            )),
            _ => Err(BackendError::Api {
                status: StatusCode::BAD_REQUEST,
                message: "Invalid login credentials".into(),
            }),
        }
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        redirect_to: &str,
        _pkce: &PkceChallenge,
    ) -> BackendResult<SignUpOutcome> {
        *self.last_redirect_to.lock().unwrap() = Some(redirect_to.to_string());
        let user = user("5b7c2c4e-1f0a-4f55-8a59-4e1f3f6c2d10", &credentials.email);
        Ok(if self.autoconfirm {
            SignUpOutcome::Session(session_for(&user, "signup-access"))
        } else {
            SignUpOutcome::ConfirmationRequired(user)
        })
    }

    async fn reset_password_for_email(
        &self,
        _email: &str,
        redirect_to: &str,
        _pkce: &PkceChallenge,
    ) -> BackendResult<()> {
        *self.last_redirect_to.lock().unwrap() = Some(redirect_to.to_string());
        Ok(())
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> BackendResult<Session> {
        match &self.code_verifier {
            Some(v) if auth_code == "code-1" && v == code_verifier => Ok(session_for(
                &user("8d0fd2b4-5a1e-4a34-9d4e-0c1f2a3b4c5d", "ada@example.com"),
                "callback-access",
            )),
            _ => Err(BackendError::Api {
                status: StatusCode::NOT_FOUND,
                message: "invalid flow state, no valid flow state found".into(),
            }),
        }
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> BackendResult<User> {
        let user = self.known_user(access_token).ok_or(BackendError::Api {
            status: StatusCode::UNAUTHORIZED,
            message: "invalid JWT".into(),
        })?;
        *self.last_password_update.lock().unwrap() = Some(password.expose_secret().to_string());
        Ok(user)
    }

    async fn sign_out(&self, _access_token: &str) -> BackendResult<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out {
            return Err(BackendError::Api {
                status: StatusCode::BAD_REQUEST,
                message: "sign out rejected".into(),
            });
        }
        Ok(())
    }
}
