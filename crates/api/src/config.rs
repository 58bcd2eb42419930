use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

/// Startup configuration errors. The binary refuses to start on any of these.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Source of raw configuration values, keyed by variable name.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read a required, non-empty variable.
pub(crate) fn require_var(lookup: Lookup<'_>, var: &'static str) -> Result<String, ConfigError> {
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// Read and parse an optional variable, falling back to `default` when unset.
pub(crate) fn parse_var<T>(lookup: Lookup<'_>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

/// Like [`parse_var`] but rejects zero and negative values.
pub(crate) fn parse_positive<T>(
    lookup: Lookup<'_>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default + Copy,
    T::Err: Display,
{
    let value = parse_var(lookup, var, default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: lookup(var).unwrap_or_default(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(value)
}

/// Like [`parse_positive`] but also rejects values above `max`.
pub(crate) fn parse_bounded<T>(
    lookup: Lookup<'_>,
    var: &'static str,
    default: T,
    max: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default + Copy + Display,
    T::Err: Display,
{
    let value = parse_positive(lookup, var, default)?;
    if value > max {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: format!("must be at most {max}"),
        });
    }
    Ok(value)
}

/// Server configuration loaded once at startup.
///
/// Constructed from environment variables in production and built directly
/// in tests. Shared read-only through `Arc<ServerConfig>`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Per-call database deadline in milliseconds (default: `5000`).
    pub db_query_timeout_ms: u64,
    /// Connection pool size (default: `20`).
    pub db_max_connections: u32,
    /// How often expired sessions are purged, in seconds (default: `3600`).
    pub session_cleanup_interval_secs: u64,
    /// Token signing and lifetime configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                    |
    /// |---------------------------------|----------------------------|
    /// | `DATABASE_URL`                  | **required**               |
    /// | `HOST`                          | `0.0.0.0`                  |
    /// | `PORT`                          | `3000`                     |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                       |
    /// | `DB_QUERY_TIMEOUT_MS`           | `5000`                     |
    /// | `DB_MAX_CONNECTIONS`            | `20`                       |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                     |
    ///
    /// JWT variables are documented on [`JwtConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let database_url = require_var(lookup, "DATABASE_URL")?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_var(lookup, "PORT", 3000u16)?;

        let raw_origins = lookup("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into());
        let cors_origins: Vec<String> = raw_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: bad.clone(),
                reason: "not a valid header value".into(),
            });
        }

        Ok(Self {
            database_url,
            host,
            port,
            cors_origins,
            request_timeout_secs: parse_positive(lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            db_query_timeout_ms: parse_positive(lookup, "DB_QUERY_TIMEOUT_MS", 5000)?,
            db_max_connections: parse_positive(lookup, "DB_MAX_CONNECTIONS", 20)?,
            session_cleanup_interval_secs: parse_positive(
                lookup,
                "SESSION_CLEANUP_INTERVAL_SECS",
                3600,
            )?,
            jwt: JwtConfig::from_lookup(lookup)?,
        })
    }

    pub fn db_query_timeout(&self) -> Duration {
        Duration::from_millis(self.db_query_timeout_ms)
    }

    pub fn session_cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.session_cleanup_interval_secs)
    }
}
