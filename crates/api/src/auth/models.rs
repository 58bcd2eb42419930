//! Request and response payloads for the `/auth` endpoints.

use keygate_core::error::CoreError;
use keygate_core::validation::FieldValidator;
use serde::{Deserialize, Serialize};

use super::jwt::TokenPair;

/// Accepted name length on sign-up and profile update.
pub const NAME_LENGTH: (usize, usize) = (2, 100);
/// Accepted length for newly chosen passwords.
pub const NEW_PASSWORD_LENGTH: (usize, usize) = (6, 32);
/// Accepted length for passwords presented at sign-in.
pub const SIGN_IN_PASSWORD_LENGTH: (usize, usize) = (6, 100);

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut v = FieldValidator::new();
        v.length("name", &self.name, NAME_LENGTH.0, NAME_LENGTH.1)
            .email("email", &self.email)
            .length(
                "password",
                &self.password,
                NEW_PASSWORD_LENGTH.0,
                NEW_PASSWORD_LENGTH.1,
            );
        v.finish()
    }
}

/// Request body for `POST /auth/signin`.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignInRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut v = FieldValidator::new();
        v.email("email", &self.email).length(
            "password",
            &self.password,
            SIGN_IN_PASSWORD_LENGTH.0,
            SIGN_IN_PASSWORD_LENGTH.1,
        );
        v.finish()
    }
}

/// Request body for `POST /auth/renew-session`.
#[derive(Debug, Deserialize)]
pub struct RenewSessionRequest {
    #[serde(default)]
    pub refresh_token: String,
}

impl RenewSessionRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut v = FieldValidator::new();
        v.required("refresh_token", &self.refresh_token);
        v.finish()
    }
}

/// Credentials returned by sign-in and session renewal.
///
/// The token `jti` is intentionally not exposed.
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl From<TokenPair> for AuthTokens {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer",
            expires_in: pair.expires_in,
        }
    }
}
