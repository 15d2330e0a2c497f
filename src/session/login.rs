use time::OffsetDateTime;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::{Error, SessionManager};
use crate::store::{self, NewSession, PublicUser};

/// Client details recorded with a new session; empty when unknown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    pub user_agent: String,
    pub client_ip: String,
}

#[derive(Clone, Debug)]
pub struct LoginResult {
    pub user: PublicUser,
    pub session_id: Uuid,
    pub access_token: String,
    pub access_token_expires_at: OffsetDateTime,
    pub refresh_token: String,
    pub refresh_token_expires_at: OffsetDateTime,
}

impl SessionManager {
    /// Authenticate `username`/`password` and open a refresh session.
    ///
    /// # Errors
    ///
    /// - [`Error::UserNotFound`] when the username is unknown; the password
    ///   is not checked in that case.
    /// - [`Error::InvalidCredentials`] when the password does not match.
    /// - [`Error::SessionPersistence`] when the session cannot be stored; the
    ///   minted tokens are discarded.
    #[instrument(
        skip(self, password, client),
        fields(user_agent = %client.user_agent, client_ip = %client.client_ip)
    )]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client: ClientMetadata,
    ) -> Result<LoginResult, Error> {
        let user = match self.store().get_user(username).await {
            Ok(user) => user,
            Err(store::Error::NotFound) => return Err(Error::UserNotFound),
            Err(err) => {
                error!("Failed to fetch user: {err}");
                return Err(Error::Store(err));
            }
        };

        if !self.compare_password(password, &user.hashed_password).await? {
            return Err(Error::InvalidCredentials);
        }

        let durations = self.durations();
        let (access_token, access_payload) =
            self.codec().create(&user.username, durations.access)?;
        let (refresh_token, refresh_payload) =
            self.codec().create(&user.username, durations.refresh)?;

        let session = self
            .store()
            .create_session(NewSession {
                id: refresh_payload.id,
                username: user.username.clone(),
                refresh_token: refresh_token.clone(),
                user_agent: client.user_agent,
                client_ip: client.client_ip,
                is_blocked: false,
                expires_at: refresh_payload.expired_at,
            })
            .await
            .map_err(|err| {
                error!("Failed to create session: {err}");
                Error::SessionPersistence(err)
            })?;

        info!(session_id = %session.id, "session created");

        Ok(LoginResult {
            user: user.into(),
            session_id: session.id,
            access_token,
            access_token_expires_at: access_payload.expired_at,
            refresh_token,
            refresh_token_expires_at: refresh_payload.expired_at,
        })
    }
}
