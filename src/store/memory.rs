//! In-process store used by tests and local experiments.

use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Error, NewSession, NewUser, Session, SessionStore, Store, User, UserStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        let mut users = self.users.lock().await;
        if users.contains_key(&user.username) || users.values().any(|u| u.email == user.email) {
            return Err(Error::Conflict);
        }

        let created = User {
            username: user.username,
            hashed_password: user.hashed_password,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: OffsetDateTime::UNIX_EPOCH,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(created.username.clone(), created.clone());
        Ok(created)
    }

    async fn get_user(&self, username: &str) -> Result<User, Error> {
        self.users
            .lock()
            .await
            .get(username)
            .cloned()
            .ok_or(Error::NotFound)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: NewSession) -> Result<Session, Error> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.id) {
            return Err(Error::Conflict);
        }

        let created = Session {
            id: session.id,
            username: session.username,
            refresh_token: session.refresh_token,
            user_agent: session.user_agent,
            client_ip: session.client_ip,
            is_blocked: session.is_blocked,
            expires_at: session.expires_at,
            created_at: OffsetDateTime::now_utc(),
        };
        sessions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_session(&self, id: Uuid) -> Result<Session, Error> {
        self.sessions
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn block_session(&self, id: Uuid, username: &str) -> Result<Session, Error> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&id) {
            Some(session) if session.username == username => {
                session.is_blocked = true;
                Ok(session.clone())
            }
            _ => Err(Error::NotFound),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), Error> {
        Ok(())
    }
}
