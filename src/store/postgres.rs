//! PostgreSQL store (see `sql/schema.sql`).

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use super::{Error, NewSession, NewUser, Session, SessionStore, Store, User, UserStore};

const USER_COLUMNS: &str =
    "username, hashed_password, full_name, email, password_changed_at, created_at";
const SESSION_COLUMNS: &str =
    "id, username, refresh_token, user_agent, client_ip, is_blocked, expires_at, created_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_span(operation: &str, statement: &str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().is_some_and(|code| code == "23505")
        }
        _ => false,
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        username: row.try_get("username")?,
        hashed_password: row.try_get("hashed_password")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        password_changed_at: row.try_get("password_changed_at")?,
        created_at: row.try_get("created_at")?,
    })
}

fn session_from_row(row: &PgRow) -> Result<Session, sqlx::Error> {
    Ok(Session {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        refresh_token: row.try_get("refresh_token")?,
        user_agent: row.try_get("user_agent")?,
        client_ip: row.try_get("client_ip")?,
        is_blocked: row.try_get("is_blocked")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        let query = format!(
            "INSERT INTO users (username, hashed_password, full_name, email) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query(&query)
            .bind(&user.username)
            .bind(&user.hashed_password)
            .bind(&user.full_name)
            .bind(&user.email)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", &query))
            .await;

        match result {
            Ok(row) => Ok(user_from_row(&row)?),
            Err(err) if is_unique_violation(&err) => Err(Error::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_user(&self, username: &str) -> Result<User, Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 LIMIT 1");
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?
            .ok_or(Error::NotFound)?;

        Ok(user_from_row(&row)?)
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(&self, session: NewSession) -> Result<Session, Error> {
        let query = format!(
            "INSERT INTO sessions \
             (id, username, refresh_token, user_agent, client_ip, is_blocked, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {SESSION_COLUMNS}"
        );
        let result = sqlx::query(&query)
            .bind(session.id)
            .bind(&session.username)
            .bind(&session.refresh_token)
            .bind(&session.user_agent)
            .bind(&session.client_ip)
            .bind(session.is_blocked)
            .bind(session.expires_at)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", &query))
            .await;

        match result {
            Ok(row) => Ok(session_from_row(&row)?),
            Err(err) if is_unique_violation(&err) => Err(Error::Conflict),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_session(&self, id: Uuid) -> Result<Session, Error> {
        let query = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 LIMIT 1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?
            .ok_or(Error::NotFound)?;

        Ok(session_from_row(&row)?)
    }

    async fn block_session(&self, id: Uuid, username: &str) -> Result<Session, Error> {
        let query = format!(
            "UPDATE sessions SET is_blocked = true \
             WHERE id = $1 AND username = $2 RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", &query))
            .await?
            .ok_or(Error::NotFound)?;

        Ok(session_from_row(&row)?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), Error> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}
