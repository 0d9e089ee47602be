/*
 * Responsibility
 * - /auth/... JSON endpoints the login, sign-up and password forms call
 * - Each one is a pass-through to the hosted auth backend plus cookie bookkeeping
 */
use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    api::v1::dto::auth::{
        ForgotPasswordRequest, LoginRequest, MessageResponse, SignUpRequest, SignUpResponse,
        UpdatePasswordRequest, UserResponse,
    },
    api::v1::extractors::CurrentUser,
    error::AppError,
    services::{
        auth::pkce::PkcePair,
        backend::{BackendError, SignUpOutcome},
        session::{SessionCookies, cookie},
    },
    state::AppState,
};

const SIGN_UP_NEXT: &str = "/auth/callback?next=/";
const RECOVERY_NEXT: &str = "/auth/callback?next=/auth/update-password";

fn invalid(message: &'static str) -> AppError {
    AppError::bad_request("INVALID_REQUEST", message)
}

/// GET /api/v1/auth/user
pub async fn current_user(CurrentUser(identity): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse {
        user: identity.user,
    })
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), AppError> {
    req.validate().map_err(invalid)?;

    let session = state
        .backend()
        .sign_in_with_password(&req.into_credentials())
        .await
        .map_err(|err| {
            tracing::info!(error = %err, "password sign-in failed");
            AppError::from(err)
        })?;

    tracing::info!(user_id = %session.user.id, "signed in");
    let jar = cookie::store_session(jar, &session, state.cookies())?;

    Ok((jar, Json(UserResponse { user: session.user })))
}

/// POST /api/v1/auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignUpRequest>,
) -> Result<(CookieJar, Json<SignUpResponse>), AppError> {
    req.validate().map_err(invalid)?;

    let pkce = PkcePair::generate();
    let redirect_to = state.config.site_link(SIGN_UP_NEXT);

    let outcome = state
        .backend()
        .sign_up(&req.into_credentials(), &redirect_to, pkce.challenge())
        .await
        .map_err(|err| {
            tracing::info!(error = %err, "sign-up failed");
            AppError::from(err)
        })?;

    let jar = cookie::store_verifier(jar, pkce.verifier().expose_secret(), state.cookies());

    match outcome {
        SignUpOutcome::Session(session) => {
            tracing::info!(user_id = %session.user.id, "signed up (auto-confirmed)");
            let jar = cookie::store_session(jar, &session, state.cookies())?;
            Ok((
                jar,
                Json(SignUpResponse {
                    user: session.user,
                    confirmation_required: false,
                }),
            ))
        }
        SignUpOutcome::ConfirmationRequired(user) => {
            tracing::info!(user_id = %user.id, "signed up, awaiting email confirmation");
            Ok((
                jar,
                Json(SignUpResponse {
                    user,
                    confirmation_required: true,
                }),
            ))
        }
    }
}

/// POST /api/v1/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    req.validate().map_err(invalid)?;

    let pkce = PkcePair::generate();
    let redirect_to = state.config.site_link(RECOVERY_NEXT);

    state
        .backend()
        .reset_password_for_email(req.email.trim(), &redirect_to, pkce.challenge())
        .await
        .map_err(|err| {
            tracing::info!(error = %err, "password recovery request failed");
            AppError::from(err)
        })?;

    let jar = cookie::store_verifier(jar, pkce.verifier().expose_secret(), state.cookies());

    Ok((
        jar,
        Json(MessageResponse {
            message: "Check your email for a password reset link",
        }),
    ))
}

/// POST /api/v1/auth/update-password (requires identity)
pub async fn update_password(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate().map_err(invalid)?;

    let password = SecretString::from(req.password);
    let user = state
        .backend()
        .update_password(identity.access_token.expose_secret(), &password)
        .await
        .map_err(|err| {
            tracing::info!(user_id = %identity.user.id, error = %err, "password update failed");
            AppError::from(err)
        })?;

    tracing::info!(user_id = %user.id, "password updated");
    Ok(Json(UserResponse { user }))
}

/// POST /api/v1/auth/signout
///
/// Revokes the cookie session at the backend (when there is one) and clears
/// the session cookies. A rejected revocation is reported as 400 and the
/// cookies are left alone.
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let session = SessionCookies::from_jar(&jar, state.cookies());

    if let Some(access_token) = &session.access_token {
        state
            .backend()
            .sign_out(access_token.expose_secret())
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "sign-out failed");
                match err {
                    BackendError::Api { message, .. } => {
                        AppError::bad_request("SIGN_OUT_FAILED", message)
                    }
                    other => AppError::bad_request("SIGN_OUT_FAILED", other.to_string()),
                }
            })?;
    }

    let jar = cookie::clear_verifier(cookie::clear_session(jar, state.cookies()), state.cookies());

    Ok((
        jar,
        Json(MessageResponse {
            message: "Signed out successfully",
        }),
    ))
}
