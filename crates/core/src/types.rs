/// Opaque identifiers for users and sessions are UUIDs (v7 for rows, v4 for token ids).
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
