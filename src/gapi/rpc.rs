use tonic::{Request, Response, Status};
use uuid::Uuid;

use super::{
    convert::timestamp,
    error::{invalid_argument, session_status},
    metadata, pb, SimpleBankService,
};
use crate::validate;

#[tonic::async_trait]
impl pb::simple_bank_server::SimpleBank for SimpleBankService {
    async fn create_user(
        &self,
        request: Request<pb::CreateUserRequest>,
    ) -> Result<Response<pb::CreateUserResponse>, Status> {
        let request = request.into_inner();

        let violations = validate::create_user(
            &request.username,
            &request.full_name,
            &request.email,
            &request.password,
        );
        if !violations.is_empty() {
            return Err(invalid_argument(&violations));
        }

        let user = self
            .manager
            .create_user(
                &request.username,
                &request.full_name,
                &request.email,
                &request.password,
            )
            .await
            .map_err(session_status)?;

        Ok(Response::new(pb::CreateUserResponse {
            user: Some(user.into()),
        }))
    }

    async fn login_user(
        &self,
        request: Request<pb::LoginUserRequest>,
    ) -> Result<Response<pb::LoginUserResponse>, Status> {
        let client = metadata::extract(request.metadata(), request.remote_addr());
        let request = request.into_inner();

        let violations = validate::login(&request.username, &request.password);
        if !violations.is_empty() {
            return Err(invalid_argument(&violations));
        }

        let result = self
            .manager
            .login(&request.username, &request.password, client)
            .await
            .map_err(session_status)?;

        Ok(Response::new(pb::LoginUserResponse {
            user: Some(result.user.into()),
            session_id: result.session_id.to_string(),
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            access_token_expires_at: Some(timestamp(result.access_token_expires_at)),
            refresh_token_expires_at: Some(timestamp(result.refresh_token_expires_at)),
        }))
    }

    async fn get_user(
        &self,
        request: Request<pb::GetUserRequest>,
    ) -> Result<Response<pb::GetUserResponse>, Status> {
        let payload = self.authorize_user(request.metadata())?;
        let request = request.into_inner();

        if let Err(reason) = validate::username(&request.username) {
            return Err(Status::invalid_argument(format!("username: {reason}")));
        }
        if payload.username != request.username {
            return Err(Status::permission_denied("cannot get other user's info"));
        }

        let user = self
            .manager
            .get_user(&request.username)
            .await
            .map_err(session_status)?;

        Ok(Response::new(pb::GetUserResponse {
            user: Some(user.into()),
        }))
    }

    async fn renew_access_token(
        &self,
        request: Request<pb::RenewAccessTokenRequest>,
    ) -> Result<Response<pb::RenewAccessTokenResponse>, Status> {
        let request = request.into_inner();
        if request.refresh_token.is_empty() {
            return Err(Status::invalid_argument("refresh_token: must not be empty"));
        }

        let renewed = self
            .manager
            .renew_access_token(&request.refresh_token)
            .await
            .map_err(session_status)?;

        Ok(Response::new(pb::RenewAccessTokenResponse {
            access_token: renewed.access_token,
            access_token_expires_at: Some(timestamp(renewed.payload.expired_at)),
        }))
    }

    async fn block_session(
        &self,
        request: Request<pb::BlockSessionRequest>,
    ) -> Result<Response<pb::BlockSessionResponse>, Status> {
        let payload = self.authorize_user(request.metadata())?;
        let request = request.into_inner();

        let id = Uuid::parse_str(&request.session_id)
            .map_err(|_| Status::invalid_argument("session_id: must be a UUID"))?;

        let session = self
            .manager
            .block_session(id, &payload.username)
            .await
            .map_err(session_status)?;

        Ok(Response::new(pb::BlockSessionResponse {
            session_id: session.id.to_string(),
            is_blocked: session.is_blocked,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        password::Argon2Hasher,
        session::{SessionManager, TokenDurations},
        store::{memory::MemoryStore, SessionStore},
        token::TokenCodec,
    };
    use anyhow::Result;
    use pb::simple_bank_server::SimpleBank;
    use std::sync::Arc;
    use time::Duration;
    use tonic::{metadata::MetadataValue, Code};

    const KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    async fn service() -> Result<SimpleBankService> {
        let manager = Arc::new(SessionManager::new(
            Arc::new(TokenCodec::new(KEY)?),
            Arc::new(MemoryStore::new()),
            Arc::new(Argon2Hasher),
            TokenDurations::default(),
        ));
        manager
            .create_user("alice", "Alice Doe", "alice@example.com", "secret-password")
            .await?;
        Ok(SimpleBankService::new(manager))
    }

    fn with_authorization<T>(message: T, value: &str) -> Result<Request<T>> {
        let mut request = Request::new(message);
        request
            .metadata_mut()
            .insert("authorization", MetadataValue::try_from(value)?);
        Ok(request)
    }

    async fn login(service: &SimpleBankService) -> Result<pb::LoginUserResponse> {
        let mut request = Request::new(pb::LoginUserRequest {
            username: "alice".to_string(),
            password: "secret-password".to_string(),
        });
        request
            .metadata_mut()
            .insert("user-agent", MetadataValue::from_static("grpc-rust/test"));
        Ok(service.login_user(request).await?.into_inner())
    }

    #[tokio::test]
    async fn login_user_binds_session() -> Result<()> {
        let service = service().await?;
        let response = login(&service).await?;

        let refresh = service.manager.codec().verify(&response.refresh_token)?;
        assert_eq!(response.session_id, refresh.id.to_string());
        assert_eq!(
            response.user.map(|user| user.username),
            Some("alice".to_string())
        );
        assert!(response.access_token_expires_at.is_some());

        let session = service.manager.store().get_session(refresh.id).await?;
        assert_eq!(session.user_agent, "grpc-rust/test");
        Ok(())
    }

    #[tokio::test]
    async fn login_user_errors() -> Result<()> {
        let service = service().await?;

        let cases = [
            ("alice", "wrong-password", Code::Unauthenticated),
            ("nobody", "secret-password", Code::NotFound),
            ("a!", "123", Code::InvalidArgument),
        ];
        for (username, password, code) in cases {
            let status = service
                .login_user(Request::new(pb::LoginUserRequest {
                    username: username.to_string(),
                    password: password.to_string(),
                }))
                .await
                .err()
                .map(|status| status.code());
            assert_eq!(status, Some(code), "{username}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn get_user_requires_owner_token() -> Result<()> {
        let service = service().await?;
        let (alice, _) = service.manager.codec().create("alice", Duration::minutes(5))?;
        let (bob, _) = service.manager.codec().create("bob", Duration::minutes(5))?;
        let get = || pb::GetUserRequest {
            username: "alice".to_string(),
        };

        let user = service
            .get_user(with_authorization(get(), &format!("Bearer {alice}"))?)
            .await?
            .into_inner()
            .user;
        assert_eq!(
            user.map(|user| user.email),
            Some("alice@example.com".to_string())
        );

        let status = service
            .get_user(with_authorization(get(), &format!("Bearer {bob}"))?)
            .await
            .err()
            .map(|status| status.code());
        assert_eq!(status, Some(Code::PermissionDenied));

        let status = service
            .get_user(Request::new(get()))
            .await
            .err()
            .map(|status| status.code());
        assert_eq!(status, Some(Code::Unauthenticated));
        Ok(())
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthenticated() -> Result<()> {
        let service = service().await?;
        let (expired, _) = service.manager.codec().create("alice", Duration::seconds(-1))?;

        for value in [
            String::new(),
            "abc.def".to_string(),
            "Basic abc.def".to_string(),
            "Bearer v4.local.garbage".to_string(),
            format!("Bearer {expired}"),
        ] {
            let status = service
                .get_user(with_authorization(
                    pb::GetUserRequest {
                        username: "alice".to_string(),
                    },
                    &value,
                )?)
                .await
                .err();
            let status = status.map(|status| status.code());
            assert_eq!(status, Some(Code::Unauthenticated), "{value:?}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn renew_and_block_session() -> Result<()> {
        let service = service().await?;
        let login = login(&service).await?;
        let renew = || pb::RenewAccessTokenRequest {
            refresh_token: login.refresh_token.clone(),
        };

        let renewed = service
            .renew_access_token(Request::new(renew()))
            .await?
            .into_inner();
        assert_eq!(
            service.manager.codec().verify(&renewed.access_token)?.username,
            "alice"
        );

        let blocked = service
            .block_session(with_authorization(
                pb::BlockSessionRequest {
                    session_id: login.session_id.clone(),
                },
                &format!("Bearer {}", login.access_token),
            )?)
            .await?
            .into_inner();
        assert!(blocked.is_blocked);

        let status = service
            .renew_access_token(Request::new(renew()))
            .await
            .err()
            .map(|status| status.code());
        assert_eq!(status, Some(Code::Unauthenticated));
        Ok(())
    }

    #[tokio::test]
    async fn block_session_validates_id() -> Result<()> {
        let service = service().await?;
        let (alice, _) = service.manager.codec().create("alice", Duration::minutes(5))?;

        let status = service
            .block_session(with_authorization(
                pb::BlockSessionRequest {
                    session_id: "not-a-uuid".to_string(),
                },
                &format!("Bearer {alice}"),
            )?)
            .await
            .err()
            .map(|status| status.code());
        assert_eq!(status, Some(Code::InvalidArgument));

        let status = service
            .block_session(with_authorization(
                pb::BlockSessionRequest {
                    session_id: Uuid::new_v4().to_string(),
                },
                &format!("Bearer {alice}"),
            )?)
            .await
            .err()
            .map(|status| status.code());
        assert_eq!(status, Some(Code::NotFound));
        Ok(())
    }
}
