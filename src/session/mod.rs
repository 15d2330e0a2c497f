//! Session lifecycle: login, access-token renewal, blocking, and user
//! creation.
//!
//! [`SessionManager`] is the only writer of session records. A session is
//! created once per successful login, keyed by the refresh token's payload
//! id, and afterwards only ever flipped to blocked.

mod login;
mod renew;
mod status;
mod users;

pub use login::{ClientMetadata, LoginResult};
pub use renew::RenewResult;
pub use status::{check_session, SessionStatus};

use std::sync::Arc;
use thiserror::Error;
use time::Duration;
use tokio::task;

use crate::{
    password::{self, PasswordHasher},
    store::{self, Store},
    token::{self, TokenCodec},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("user not found")]
    UserNotFound,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username or email already exists")]
    UserExists,
    #[error("session not found")]
    SessionNotFound,
    #[error("session rejected: {0}")]
    SessionRejected(SessionStatus),
    #[error("failed to persist session")]
    SessionPersistence(#[source] store::Error),
    #[error(transparent)]
    Token(#[from] token::Error),
    #[error("store failure")]
    Store(#[source] store::Error),
    #[error("password hashing failure: {0}")]
    Hash(String),
}

impl From<password::Error> for Error {
    fn from(err: password::Error) -> Self {
        Self::Hash(err.to_string())
    }
}

/// Token lifetimes applied at login and renewal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenDurations {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenDurations {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::hours(24),
        }
    }
}

pub struct SessionManager {
    codec: Arc<TokenCodec>,
    store: Arc<dyn Store>,
    hasher: Arc<dyn PasswordHasher>,
    durations: TokenDurations,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("codec", &self.codec)
            .field("durations", &self.durations)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    #[must_use]
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn Store>,
        hasher: Arc<dyn PasswordHasher>,
        durations: TokenDurations,
    ) -> Self {
        Self {
            codec,
            store,
            hasher,
            durations,
        }
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    #[must_use]
    pub fn durations(&self) -> TokenDurations {
        self.durations
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Hash on the blocking pool; Argon2 is CPU-bound.
    async fn hash_password(&self, password: &str) -> Result<String, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::Hash(err.to_string()))?
            .map_err(Error::from)
    }

    async fn compare_password(&self, password: &str, hash: &str) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = hash.to_string();
        task::spawn_blocking(move || hasher.compare(&password, &hash))
            .await
            .map_err(|err| Error::Hash(err.to_string()))?
            .map_err(Error::from)
    }
}
