//! Opaque identifier generation and format checks.
//!
//! Row identifiers are time-ordered UUID v7 values; token identifiers (`jti`)
//! are fully random UUID v4 values. Clients only ever see the hyphenated
//! string form.

use uuid::Uuid;

use crate::error::CoreError;
use crate::types::DbId;

/// Fresh primary key for a user or session row.
pub fn new_id() -> DbId {
    Uuid::now_v7()
}

/// Fresh access-token identifier.
pub fn new_token_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parse a client-supplied identifier, rejecting anything that is not a
/// hyphenated UUID.
pub fn parse_id(raw: &str) -> Result<DbId, CoreError> {
    // `Uuid::try_parse` also accepts simple/braced/urn forms; only the
    // hyphenated form is ever issued.
    if raw.len() != 36 {
        return Err(CoreError::InvalidIdentifierFormat);
    }
    Uuid::try_parse(raw).map_err(|_| CoreError::InvalidIdentifierFormat)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn generated_ids_round_trip_through_parse() {
        let id = new_id();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);

        let jti = new_token_id();
        assert_eq!(parse_id(&jti).unwrap().to_string(), jti);
    }

    #[test]
    fn row_ids_are_v7() {
        assert_eq!(new_id().get_version_num(), 7);
    }

    #[test]
    fn malformed_ids_are_rejected() {
        for raw in ["", "abc", "42", "not-a-uuid-not-a-uuid-not-a-uuid-xxxx"] {
            assert_matches!(parse_id(raw), Err(CoreError::InvalidIdentifierFormat));
        }
        let simple = new_id().simple().to_string();
        assert_matches!(parse_id(&simple), Err(CoreError::InvalidIdentifierFormat));
    }
}
