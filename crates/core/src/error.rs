use crate::validation::FieldErrors;

/// Domain-level failures surfaced to API clients.
///
/// Every variant maps to exactly one HTTP status and error code at the API
/// boundary. Authentication variants carry no payload so that the response
/// never reveals which check failed.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid session")]
    InvalidSession,

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{entity} already exists")]
    AlreadyExists { entity: &'static str },

    #[error("Invalid identifier format")]
    InvalidIdentifierFormat,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Machine-readable error code, e.g. `"SESSION_NOT_FOUND"`.
    pub fn code(&self) -> String {
        match self {
            CoreError::Validation(_) => "VALIDATION_FAILED".into(),
            CoreError::InvalidCredentials => "INVALID_CREDENTIALS".into(),
            CoreError::InvalidToken => "INVALID_TOKEN".into(),
            CoreError::InvalidSession => "INVALID_SESSION".into(),
            CoreError::NotFound { entity } => format!("{}_NOT_FOUND", entity.to_uppercase()),
            CoreError::AlreadyExists { entity } => {
                format!("{}_ALREADY_EXISTS", entity.to_uppercase())
            }
            CoreError::InvalidIdentifierFormat => "INVALID_ID".into(),
            CoreError::Forbidden(_) => "FORBIDDEN".into(),
            CoreError::Internal(_) => "INTERNAL_ERROR".into(),
        }
    }
}
