use std::fmt;
use time::OffsetDateTime;

use crate::store::Session;

/// Outcome of checking a stored session against a presented refresh token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    Blocked,
    Expired,
    Mismatched,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Valid => "valid",
            Self::Blocked => "blocked session",
            Self::Expired => "expired session",
            Self::Mismatched => "mismatched session",
        };
        f.write_str(text)
    }
}

/// Re-derive a session's validity for `username` presenting `refresh_token`.
///
/// Conditions are checked in a fixed order: blocked, expired, then owner and
/// token binding.
#[must_use]
pub fn check_session(
    session: &Session,
    username: &str,
    refresh_token: &str,
    now: OffsetDateTime,
) -> SessionStatus {
    if session.is_blocked {
        return SessionStatus::Blocked;
    }
    if now > session.expires_at {
        return SessionStatus::Expired;
    }
    if session.username != username || session.refresh_token != refresh_token {
        return SessionStatus::Mismatched;
    }
    SessionStatus::Valid
}
