//! Access-token signing/verification and refresh-token issuance.
//!
//! Access tokens are HS256-signed JWTs carrying an [`AccessClaims`] payload.
//! Refresh tokens are opaque random strings; only their SHA-256 hash is stored
//! server-side (see [`crate::auth::session`]). Nothing here consults the
//! database, so revocation is enforced by the auth extractor, not the signer.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use keygate_core::hashing::generate_secret_token;
use keygate_core::ids::new_token_id;
use keygate_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::config::{parse_bounded, parse_var, require_var, ConfigError, Lookup};

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh session expiry in days.
const DEFAULT_SESSION_EXPIRY_DAYS: i64 = 7;
/// Longest accepted access token lifetime (one year).
const MAX_ACCESS_EXPIRY_MINS: i64 = 365 * 24 * 60;
/// Longest accepted session lifetime (ten years).
const MAX_SESSION_EXPIRY_DAYS: i64 = 3650;
/// Default `iss` claim.
const DEFAULT_ISSUER: &str = "keygate";

/// Claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    /// Owner of the session, as a hyphenated UUID.
    pub user_id: String,
    /// Token id; matches the paired session's `access_jti` while it is live.
    pub jti: String,
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Issued-at time (UTC Unix timestamp).
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration time (UTC Unix timestamp).
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// Configuration for token generation and session lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Value of the `iss` claim; tokens from other issuers are rejected.
    pub issuer: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh session lifetime in days (default: 7).
    pub session_expiry_days: i64,
}

impl JwtConfig {
    /// Load JWT configuration.
    ///
    /// | Env Var                  | Required | Default   |
    /// |--------------------------|----------|-----------|
    /// | `JWT_SECRET`             | **yes**  | --        |
    /// | `JWT_ISSUER`             | no       | `keygate` |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `15`      |
    /// | `SESSION_EXPIRY_DAYS`    | no       | `7`       |
    ///
    /// Lifetimes are capped at one year (access) and ten years (session).
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: require_var(lookup, "JWT_SECRET")?,
            issuer: parse_var(lookup, "JWT_ISSUER", DEFAULT_ISSUER.to_string())?,
            access_token_expiry_mins: parse_bounded(
                lookup,
                "JWT_ACCESS_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
                MAX_ACCESS_EXPIRY_MINS,
            )?,
            session_expiry_days: parse_bounded(
                lookup,
                "SESSION_EXPIRY_DAYS",
                DEFAULT_SESSION_EXPIRY_DAYS,
                MAX_SESSION_EXPIRY_DAYS,
            )?,
        })
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_token_expiry_mins)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_expiry_days)
    }
}

/// Freshly issued credentials. The refresh token is only ever handed to the
/// client; callers must persist its hash, never the value.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Shared key linking the access token to its session row.
    pub jti: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Signing or verification failure.
///
/// Verification failures are deliberately collapsed into [`TokenError::Invalid`]
/// so callers cannot tell a bad signature from an expired token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signing error: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid token")]
    Invalid,
}

/// Issues and verifies access tokens with a key fixed at construction.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: chrono::Duration,
}

impl TokenSigner {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl: config.access_token_ttl(),
        }
    }

    /// Generate a new access token plus an opaque refresh token for `user_id`.
    pub fn generate_pair(&self, user_id: DbId) -> Result<TokenPair, TokenError> {
        let now = Utc::now().timestamp();
        let jti = new_token_id();

        let claims = AccessClaims {
            user_id: user_id.to_string(),
            jti: jti.clone(),
            issuer: self.issuer.clone(),
            issued_at: now,
            expires_at: now + self.access_ttl.num_seconds(),
        };

        let access_token = self.sign(&claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token: generate_secret_token(),
            jti,
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Verify signature, algorithm, issuer, and expiry, returning the claims.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                TokenError::Invalid
            })
    }

    fn sign(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }
}
