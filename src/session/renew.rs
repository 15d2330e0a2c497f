use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{check_session, Error, SessionManager, SessionStatus};
use crate::{
    store::{self, Session},
    token::TokenPayload,
};

#[derive(Clone, Debug)]
pub struct RenewResult {
    pub access_token: String,
    pub payload: TokenPayload,
}

impl SessionManager {
    /// Exchange a refresh token for a fresh access token.
    ///
    /// The session keyed by the refresh token's id is re-checked on every
    /// call, so blocking a session stops renewal immediately.
    ///
    /// # Errors
    ///
    /// Token errors when the refresh token does not verify,
    /// [`Error::SessionNotFound`] when no session matches, and
    /// [`Error::SessionRejected`] when the session is blocked, expired, or
    /// bound to another user or token.
    #[instrument(skip_all)]
    pub async fn renew_access_token(&self, refresh_token: &str) -> Result<RenewResult, Error> {
        let refresh = self.codec().verify(refresh_token)?;

        let session = match self.store().get_session(refresh.id).await {
            Ok(session) => session,
            Err(store::Error::NotFound) => return Err(Error::SessionNotFound),
            Err(err) => {
                error!("Failed to fetch session: {err}");
                return Err(Error::Store(err));
            }
        };

        let status = check_session(
            &session,
            &refresh.username,
            refresh_token,
            OffsetDateTime::now_utc(),
        );
        if status != SessionStatus::Valid {
            warn!(session_id = %session.id, %status, "refresh rejected");
            return Err(Error::SessionRejected(status));
        }

        let (access_token, payload) = self
            .codec()
            .create(&refresh.username, self.durations().access)?;

        Ok(RenewResult {
            access_token,
            payload,
        })
    }

    /// Block a session owned by `username`.
    ///
    /// # Errors
    ///
    /// [`Error::SessionNotFound`] when the session does not exist or belongs
    /// to someone else.
    #[instrument(skip(self))]
    pub async fn block_session(&self, id: Uuid, username: &str) -> Result<Session, Error> {
        match self.store().block_session(id, username).await {
            Ok(session) => {
                info!("session blocked");
                Ok(session)
            }
            Err(store::Error::NotFound) => Err(Error::SessionNotFound),
            Err(err) => {
                error!("Failed to block session: {err}");
                Err(Error::Store(err))
            }
        }
    }
}
