//! User repository: lookup and login upsert.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{User, VerifiedIdentity};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by internal id
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by identity-provider subject id
    async fn find_by_identity_uid(&self, uid: &str) -> AppResult<Option<User>>;

    /// Create the user on first login, otherwise stamp `last_login_at`.
    async fn upsert_login(&self, identity: VerifiedIdentity) -> AppResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_identity_uid(&self, uid: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::IdentityUid.eq(uid))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn upsert_login(&self, identity: VerifiedIdentity) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            identity_uid: Set(identity.uid),
            email: Set(identity.email),
            phone: Set(identity.phone),
            display_name: Set(identity.display_name),
            is_admin: Set(false),
            last_login_at: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Profile fields are only taken on first login
        let model = UserEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(user::Column::IdentityUid)
                    .update_columns([user::Column::LastLoginAt, user::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(User::from(model))
    }
}
