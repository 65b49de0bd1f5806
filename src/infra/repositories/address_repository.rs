//! Address repository.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::address::{self, ActiveModel, Entity as AddressEntity};
use crate::domain::Address;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

pub const ADDRESS_IN_USE_MESSAGE: &str =
    "This address is used by an existing order and cannot be deleted";

/// Address repository trait for dependency injection.
///
/// Every lookup is scoped to the owning user.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Default first, then newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Address>>;

    async fn find_for_user(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Address>>;

    async fn count_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Insert; a default address unsets the user's other defaults atomically.
    async fn create(&self, address: Address) -> AppResult<Address>;

    /// Overwrite; default handling as for `create`.
    async fn update(&self, address: Address) -> AppResult<Address>;

    /// Delete an owned address; `false` when nothing matched.
    /// Fails with a business error while an order references it.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool>;
}

/// Concrete implementation of AddressRepository
pub struct AddressStore {
    db: DatabaseConnection,
}

impl AddressStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn find_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<Option<Address>> {
    let result = AddressEntity::find_by_id(id)
        .filter(address::Column::UserId.eq(user_id))
        .one(conn)
        .await
        .map_err(AppError::from)?;

    Ok(result.map(Address::from))
}

async fn clear_other_defaults<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    keep: Uuid,
) -> AppResult<()> {
    AddressEntity::update_many()
        .col_expr(address::Column::IsDefault, Expr::value(false))
        .filter(address::Column::UserId.eq(user_id))
        .filter(address::Column::IsDefault.eq(true))
        .filter(address::Column::Id.ne(keep))
        .exec(conn)
        .await?;
    Ok(())
}

fn to_active_model(address: Address) -> ActiveModel {
    ActiveModel {
        id: Set(address.id),
        user_id: Set(address.user_id),
        label: Set(address.label),
        street: Set(address.street),
        building: Set(address.building),
        floor: Set(address.floor),
        apartment: Set(address.apartment),
        postcode: Set(address.postcode),
        city: Set(address.city),
        instructions: Set(address.instructions),
        is_default: Set(address.is_default),
        is_verified: Set(address.is_verified),
        created_at: Set(address.created_at),
        updated_at: Set(address.updated_at),
    }
}

#[async_trait]
impl AddressRepository for AddressStore {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Address>> {
        let models = AddressEntity::find()
            .filter(address::Column::UserId.eq(user_id))
            .order_by_desc(address::Column::IsDefault)
            .order_by_desc(address::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Address::from).collect())
    }

    async fn find_for_user(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Address>> {
        find_for_user(&self.db, user_id, id).await
    }

    async fn count_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        AddressEntity::find()
            .filter(address::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn create(&self, address: Address) -> AppResult<Address> {
        let txn = self.db.begin().await?;
        if address.is_default {
            clear_other_defaults(&txn, address.user_id, address.id).await?;
        }
        let model = to_active_model(address).insert(&txn).await?;
        txn.commit().await?;

        Ok(Address::from(model))
    }

    async fn update(&self, address: Address) -> AppResult<Address> {
        let txn = self.db.begin().await?;
        if address.is_default {
            clear_other_defaults(&txn, address.user_id, address.id).await?;
        }
        let model = to_active_model(address).update(&txn).await?;
        txn.commit().await?;

        Ok(Address::from(model))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = AddressEntity::delete_many()
            .filter(address::Column::Id.eq(id))
            .filter(address::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| AppError::from_restrict_violation(e, ADDRESS_IN_USE_MESSAGE))?;

        Ok(result.rows_affected > 0)
    }
}
