/*
 * Responsibility
 * - Request/response DTOs for the auth endpoints
 * - validate(): shape checks only; password policy is the backend's call
 */
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::services::auth::IdentitySource;
use crate::services::backend::{Credentials, User};

fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("email is required");
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err("email is invalid"),
    }
}

fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("password is required");
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }

    pub fn into_credentials(self) -> Credentials {
        Credentials {
            email: self.email.trim().to_string(),
            password: SecretString::from(self.password),
        }
    }
}

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(alias = "repeat-password")]
    pub repeat_password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.password != self.repeat_password {
            return Err("Passwords do not match");
        }
        Ok(())
    }

    pub fn into_credentials(self) -> Credentials {
        Credentials {
            email: self.email.trim().to_string(),
            password: SecretString::from(self.password),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ForgotPasswordRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)
    }
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

impl UpdatePasswordRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_password(&self.password)
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: User,
    pub confirmation_required: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: User,
    pub source: IdentitySource,
}
