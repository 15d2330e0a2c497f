//! Persistence boundary for users and sessions.
//!
//! The identity layer only talks to these traits. [`postgres::PgStore`] backs
//! the running service; [`memory::MemoryStore`] backs tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Conflict,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Stored user, including the password hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// User as returned to clients; never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PublicUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub password_changed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
}

/// Server-side record binding a refresh token to its client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct NewSession {
    pub id: Uuid,
    pub username: String,
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; [`Error::Conflict`] when username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    /// Fetch a user; [`Error::NotFound`] when absent.
    async fn get_user(&self, username: &str) -> Result<User, Error>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session; returns only once the write is acknowledged.
    async fn create_session(&self, session: NewSession) -> Result<Session, Error>;

    /// Fetch a session by id; [`Error::NotFound`] when absent.
    async fn get_session(&self, id: Uuid) -> Result<Session, Error>;

    /// Mark a session owned by `username` as blocked in a single conditional
    /// update. [`Error::NotFound`] when no such session belongs to `username`.
    async fn block_session(&self, id: Uuid, username: &str) -> Result<Session, Error>;
}

/// Everything the identity layer needs from persistence.
#[async_trait]
pub trait Store: UserStore + SessionStore {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), Error>;
}
