use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Claims carried inside an encrypted token.
///
/// `id` is unique per issued token; for refresh tokens it doubles as the
/// session id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    pub id: Uuid,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expired_at: OffsetDateTime,
}

impl TokenPayload {
    /// Build a payload for `username` valid for `duration` from `now`.
    #[must_use]
    pub fn new(username: &str, duration: Duration, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            issued_at: now,
            expired_at: now + duration,
        }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expired_at
    }
}
