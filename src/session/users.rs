use tracing::{error, info, instrument};

use super::{Error, SessionManager};
use crate::store::{self, NewUser, PublicUser};

impl SessionManager {
    /// Register a user. Inputs are expected to be validated by the caller.
    ///
    /// # Errors
    ///
    /// [`Error::UserExists`] when the username or email is already taken.
    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        username: &str,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, Error> {
        let hashed_password = self.hash_password(password).await?;

        let user = self
            .store()
            .create_user(NewUser {
                username: username.to_string(),
                hashed_password,
                full_name: full_name.to_string(),
                email: email.to_string(),
            })
            .await
            .map_err(|err| match err {
                store::Error::Conflict => Error::UserExists,
                err => {
                    error!("Failed to create user: {err}");
                    Error::Store(err)
                }
            })?;

        info!("user created");

        Ok(user.into())
    }

    /// # Errors
    ///
    /// [`Error::UserNotFound`] when the username is unknown.
    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> Result<PublicUser, Error> {
        match self.store().get_user(username).await {
            Ok(user) => Ok(user.into()),
            Err(store::Error::NotFound) => Err(Error::UserNotFound),
            Err(err) => {
                error!("Failed to fetch user: {err}");
                Err(Error::Store(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::manager;
    use super::super::ClientMetadata;
    use super::*;
    use crate::store::UserStore;
    use anyhow::Result;

    #[tokio::test]
    async fn created_user_can_log_in() -> Result<()> {
        let (manager, store) = manager()?;

        let user = manager
            .create_user("alice", "Alice Doe", "alice@example.com", "secret-password")
            .await?;
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");

        let stored = store.get_user("alice").await?;
        assert_ne!(stored.hashed_password, "secret-password");

        let login = manager
            .login("alice", "secret-password", ClientMetadata::default())
            .await?;
        assert_eq!(login.user, user);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() -> Result<()> {
        let (manager, _store) = manager()?;
        manager
            .create_user("alice", "Alice Doe", "alice@example.com", "secret-password")
            .await?;

        let same_name = manager
            .create_user("alice", "Alice Other", "other@example.com", "secret-password")
            .await;
        assert!(matches!(same_name, Err(Error::UserExists)));

        let same_email = manager
            .create_user("alice2", "Alice Two", "alice@example.com", "secret-password")
            .await;
        assert!(matches!(same_email, Err(Error::UserExists)));
        Ok(())
    }

    #[tokio::test]
    async fn get_user_hides_hash_and_reports_missing() -> Result<()> {
        let (manager, _store) = manager()?;
        manager
            .create_user("alice", "Alice Doe", "alice@example.com", "secret-password")
            .await?;

        assert_eq!(manager.get_user("alice").await?.full_name, "Alice Doe");
        assert!(matches!(
            manager.get_user("bob").await,
            Err(Error::UserNotFound)
        ));
        Ok(())
    }
}
