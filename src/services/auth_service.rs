//! Authentication service - identity-token exchange and session tokens.
//!
//! The identity provider proves who the customer is; this service turns
//! that proof into a local user row and an HS256 session token.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, SESSION_TOKEN_TYPE};
use crate::domain::User;
use crate::errors::{AppError, AppResult};
use crate::infra::{IdentityVerifier, UnitOfWork};

/// Session JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Result of a successful sign-in
#[derive(Debug, Clone)]
pub struct Login {
    pub user: User,
    pub session_token: String,
    /// Session lifetime in seconds
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange an identity-provider token for a session.
    async fn login(&self, id_token: &str) -> AppResult<Login>;

    /// Verify a session token and return the user id it was issued for.
    fn verify_session(&self, token: &str) -> AppResult<Uuid>;

    /// Resolve a session token to an existing user.
    async fn current_user(&self, token: &str) -> AppResult<User>;
}

fn issue_session(user_id: Uuid, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::days(config.session_expiry_days);

    let claims = SessionClaims {
        sub: user_id,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        token_type: SESSION_TOKEN_TYPE.to_string(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret_bytes()),
    )?)
}

fn verify_session_internal(token: &str, config: &Config) -> AppResult<Uuid> {
    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.session_secret_bytes()),
        &Validation::default(),
    )?
    .claims;

    if claims.token_type != SESSION_TOKEN_TYPE {
        return Err(AppError::Unauthorized);
    }

    Ok(claims.sub)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    identity: Arc<dyn IdentityVerifier>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, identity: Arc<dyn IdentityVerifier>, config: Config) -> Self {
        Self {
            uow,
            identity,
            config,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(&self, id_token: &str) -> AppResult<Login> {
        let identity = self.identity.verify(id_token).await?;
        let user = self.uow.users().upsert_login(identity).await?;

        tracing::info!(user_id = %user.id, "User signed in");

        let session_token = issue_session(user.id, &self.config)?;
        Ok(Login {
            user,
            session_token,
            expires_in: self.config.session_max_age_seconds(),
        })
    }

    fn verify_session(&self, token: &str) -> AppResult<Uuid> {
        verify_session_internal(token, &self.config)
    }

    async fn current_user(&self, token: &str) -> AppResult<User> {
        let user_id = self.verify_session(token)?;
        self.uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VerifiedIdentity;
    use crate::infra::MockIdentityVerifier;
    use crate::services::test_support::{MockRepositories, TestUnitOfWork};

    fn config() -> Config {
        Config::development()
    }

    fn user(id: Uuid) -> User {
        let now = Utc::now();
        User {
            id,
            identity_uid: "dev_kunde_example.dk".into(),
            email: Some("kunde@example.dk".into()),
            phone: None,
            display_name: Some("Dev User".into()),
            is_admin: false,
            last_login_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn authenticator(
        repos: MockRepositories,
        identity: MockIdentityVerifier,
    ) -> Authenticator<TestUnitOfWork> {
        Authenticator::new(Arc::new(TestUnitOfWork::new(repos)), Arc::new(identity), config())
    }

    #[tokio::test]
    async fn test_login_upserts_user_and_issues_session() {
        let user_id = Uuid::new_v4();

        let mut identity = MockIdentityVerifier::new();
        identity
            .expect_verify()
            .withf(|token| token == "dev_email:kunde@example.dk")
            .returning(|_| {
                Ok(VerifiedIdentity {
                    uid: "dev_kunde_example.dk".into(),
                    email: Some("kunde@example.dk".into()),
                    phone: None,
                    display_name: Some("Dev User".into()),
                })
            });

        let mut repos = MockRepositories::default();
        repos.users
            .expect_upsert_login()
            .withf(|identity| identity.uid == "dev_kunde_example.dk")
            .returning(move |_| Ok(user(user_id)));

        let auth = authenticator(repos, identity);
        let login = auth.login("dev_email:kunde@example.dk").await.unwrap();

        assert_eq!(login.user.id, user_id);
        assert_eq!(login.expires_in, 7 * 86_400);
        assert_eq!(auth.verify_session(&login.session_token).unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_login_with_rejected_identity_creates_nothing() {
        let mut identity = MockIdentityVerifier::new();
        identity
            .expect_verify()
            .returning(|_| Err(AppError::Identity("expired".into())));

        let mut repos = MockRepositories::default();
        repos.users.expect_upsert_login().never();

        let auth = authenticator(repos, identity);
        assert!(matches!(auth.login("bad").await, Err(AppError::Identity(_))));
    }

    #[test]
    fn test_session_rejects_other_token_types() {
        let config = config();
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::default(),
            &SessionClaims {
                sub: Uuid::new_v4(),
                iat: now,
                exp: now + 3600,
                token_type: "refresh".into(),
            },
            &EncodingKey::from_secret(config.session_secret_bytes()),
        )
        .unwrap();

        assert!(matches!(verify_session_internal(&token, &config), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_session_rejects_expired_and_foreign_tokens() {
        let config = config();
        let now = Utc::now().timestamp();
        let expired = encode(
            &Header::default(),
            &SessionClaims {
                sub: Uuid::new_v4(),
                iat: now - 7200,
                exp: now - 3600,
                token_type: SESSION_TOKEN_TYPE.into(),
            },
            &EncodingKey::from_secret(config.session_secret_bytes()),
        )
        .unwrap();
        assert!(verify_session_internal(&expired, &config).is_err());

        let other = Config::development().with_secrets("another-secret-that-is-long-enough-123", "k");
        let foreign = issue_session(Uuid::new_v4(), &other).unwrap();
        assert!(verify_session_internal(&foreign, &config).is_err());
    }

    #[tokio::test]
    async fn test_current_user_requires_existing_user() {
        let mut repos = MockRepositories::default();
        repos.users.expect_find_by_id().returning(|_| Ok(None));

        let auth = authenticator(repos, MockIdentityVerifier::new());
        let token = issue_session(Uuid::new_v4(), &config()).unwrap();
        assert!(matches!(auth.current_user(&token).await, Err(AppError::Unauthorized)));
    }
}
