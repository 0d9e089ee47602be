use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::services::auth::pkce::PkceChallenge;
use crate::services::backend::client::{
    AuthBackend, BackendError, BackendResult, Credentials, Session, SignUpOutcome, User,
};
use crate::services::session::SessionCookies;

/// HTTP client for a GoTrue-compatible hosted auth API (`<base>/auth/v1/...`).
///
/// Every request carries the publishable `apikey`; user-scoped calls add
/// `Authorization: Bearer <access_token>`.
#[derive(Clone)]
pub struct GoTrueBackend {
    http: Client,
    base: String,
    api_key: SecretString,
}

impl std::fmt::Debug for GoTrueBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the api key
        f.debug_struct("GoTrueBackend")
            .field("base", &self.base)
            .finish()
    }
}

impl GoTrueBackend {
    pub fn new(base_url: &Url, api_key: SecretString, timeout: Duration) -> BackendResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base: base_url.as_str().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .header("apikey", self.api_key.expose_secret())
    }

    async fn send(&self, req: RequestBuilder) -> BackendResult<Response> {
        req.send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))
    }

    async fn json_or_error<T: DeserializeOwned>(res: Response) -> BackendResult<T> {
        let status = res.status();
        if !status.is_success() {
            return Err(api_error(status, res).await);
        }
        res.json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn fetch_user(&self, access_token: &str) -> BackendResult<Option<User>> {
        let res = self
            .send(
                self.request(reqwest::Method::GET, "user")
                    .bearer_auth(access_token),
            )
            .await?;

        match res.status() {
            // The backend does not know this token (expired, revoked, forged).
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            _ => Self::json_or_error::<User>(res).await.map(Some),
        }
    }
}

/// Pull a human-readable message out of a GoTrue error body.
async fn api_error(status: StatusCode, res: Response) -> BackendError {
    let body = res.text().await.unwrap_or_default();
    BackendError::Api {
        status,
        message: error_message(status, &body),
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("auth backend error")
                .to_string()
        })
}

#[async_trait]
impl AuthBackend for GoTrueBackend {
    fn backend_name(&self) -> &'static str {
        "gotrue"
    }

    async fn user_from_session(&self, session: &SessionCookies) -> BackendResult<Option<User>> {
        match &session.access_token {
            Some(token) => self.fetch_user(token.expose_secret()).await,
            None => Ok(None),
        }
    }

    async fn user_from_token(&self, access_token: &str) -> BackendResult<Option<User>> {
        self.fetch_user(access_token).await
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> BackendResult<Session> {
        let req = self
            .request(reqwest::Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password.expose_secret(),
            }));

        Self::json_or_error(self.send(req).await?).await
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        redirect_to: &str,
        pkce: &PkceChallenge,
    ) -> BackendResult<SignUpOutcome> {
        let req = self
            .request(reqwest::Method::POST, "signup")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password.expose_secret(),
                "data": {},
                "code_challenge": pkce.challenge,
                "code_challenge_method": pkce.method,
            }));

        let body: Value = Self::json_or_error(self.send(req).await?).await?;

        // With auto-confirm on, the backend answers with a full session;
        // otherwise it returns the pending user.
        let outcome = if body.get("access_token").is_some() {
            SignUpOutcome::Session(
                serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))?,
            )
        } else {
            SignUpOutcome::ConfirmationRequired(
                serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))?,
            )
        };
        Ok(outcome)
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
        pkce: &PkceChallenge,
    ) -> BackendResult<()> {
        let req = self
            .request(reqwest::Method::POST, "recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({
                "email": email,
                "code_challenge": pkce.challenge,
                "code_challenge_method": pkce.method,
            }));

        let res = self.send(req).await?;
        if !res.status().is_success() {
            return Err(api_error(res.status(), res).await);
        }
        Ok(())
    }

    async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> BackendResult<Session> {
        let req = self
            .request(reqwest::Method::POST, "token")
            .query(&[("grant_type", "pkce")])
            .json(&json!({
                "auth_code": auth_code,
                "code_verifier": code_verifier,
            }));

        Self::json_or_error(self.send(req).await?).await
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> BackendResult<User> {
        let req = self
            .request(reqwest::Method::PUT, "user")
            .bearer_auth(access_token)
            .json(&json!({ "password": password.expose_secret() }));

        Self::json_or_error(self.send(req).await?).await
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        let req = self
            .request(reqwest::Method::POST, "logout")
            .query(&[("scope", "global")])
            .bearer_auth(access_token);

        let res = self.send(req).await?;
        match res.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            s => Err(api_error(s, res).await),
        }
    }
}
