use prost_types::Timestamp;
use time::OffsetDateTime;

use super::pb;
use crate::store::PublicUser;

pub(crate) fn timestamp(at: OffsetDateTime) -> Timestamp {
    Timestamp {
        seconds: at.unix_timestamp(),
        nanos: i32::try_from(at.nanosecond()).unwrap_or_default(),
    }
}

impl From<PublicUser> for pb::User {
    fn from(user: PublicUser) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: Some(timestamp(user.password_changed_at)),
            created_at: Some(timestamp(user.created_at)),
        }
    }
}
