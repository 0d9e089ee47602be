/*
 * Responsibility
 * - The HTTP-facing AppError
 * - IntoResponse (status + JSON error body)
 * - Conversions from lower layers (backend client, cookie codec)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::backend::BackendError;
use crate::services::session::CookieError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("auth backend unavailable")]
    BadGateway,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "unauthorized".into(),
            ),
            AppError::BadGateway => (
                StatusCode::BAD_GATEWAY,
                "BAD_GATEWAY",
                "auth backend unavailable".into(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            // The backend rejected the request itself (bad credentials, weak password,
            // unknown code, ...). Its message is meant for the end user.
            BackendError::Api { status, message } if status.is_client_error() => {
                AppError::bad_request("AUTH_REJECTED", message)
            }
            BackendError::Api { .. } | BackendError::Transport(_) => AppError::BadGateway,
            BackendError::Decode(_) => AppError::BadGateway,
        }
    }
}

impl From<CookieError> for AppError {
    fn from(_: CookieError) -> Self {
        AppError::Internal
    }
}
