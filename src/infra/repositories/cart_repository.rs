//! Cart repository. Line writes are single statements keyed on
//! `(cart_id, product_id)`, so concurrent writers never duplicate a line.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::cart::{self, Entity as CartEntity};
use super::entities::cart_item::{self, Entity as CartItemEntity};
use super::entities::product::Entity as ProductEntity;
use crate::domain::{CartItem, CartLine, Product, QuantityMerge};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Id of the user's cart, created on first use
    async fn get_or_create(&self, user_id: Uuid) -> AppResult<Uuid>;

    /// Lines joined with their products, oldest first
    async fn lines(&self, cart_id: Uuid) -> AppResult<Vec<CartLine>>;

    /// Insert a line or merge `quantity` into the existing one
    async fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        merge: QuantityMerge,
    ) -> AppResult<()>;

    /// `false` when the product is not in the cart
    async fn set_quantity(&self, cart_id: Uuid, product_id: Uuid, quantity: i32)
        -> AppResult<bool>;

    /// `false` when the product is not in the cart
    async fn remove_item(&self, cart_id: Uuid, product_id: Uuid) -> AppResult<bool>;

    async fn clear(&self, cart_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CartRepository
pub struct CartStore {
    db: DatabaseConnection,
}

impl CartStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn lines<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
    let rows = CartItemEntity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .find_also_related(ProductEntity)
        .order_by_asc(cart_item::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(AppError::from)?;

    Ok(rows
        .into_iter()
        .map(|(item, product)| CartLine {
            item: CartItem::from(item),
            product: product.map(Product::from),
        })
        .collect())
}

/// Take the given lines out of the cart. A line whose quantity was raised
/// after it was read keeps the difference; a newer line is left alone.
pub(crate) async fn remove_taken<C: ConnectionTrait>(
    conn: &C,
    taken: &[CartLine],
) -> AppResult<()> {
    for CartLine { item, .. } in taken {
        let deleted = CartItemEntity::delete_many()
            .filter(cart_item::Column::Id.eq(item.id))
            .filter(cart_item::Column::Quantity.lte(item.quantity))
            .exec(conn)
            .await?;

        if deleted.rows_affected == 0 {
            CartItemEntity::update_many()
                .col_expr(
                    cart_item::Column::Quantity,
                    Expr::col(cart_item::Column::Quantity).sub(item.quantity),
                )
                .col_expr(cart_item::Column::UpdatedAt, Expr::current_timestamp().into())
                .filter(cart_item::Column::Id.eq(item.id))
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl CartRepository for CartStore {
    async fn get_or_create(&self, user_id: Uuid) -> AppResult<Uuid> {
        let now = Utc::now();
        let active_model = cart::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        CartEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(cart::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let cart = CartEntity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::internal("cart missing after upsert"))?;

        Ok(cart.id)
    }

    async fn lines(&self, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
        lines(&self.db, cart_id).await
    }

    async fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        merge: QuantityMerge,
    ) -> AppResult<()> {
        let now = Utc::now();
        let active_model = cart_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_at: Set(now),
            updated_at: Set(now),
        };

        CartItemEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([cart_item::Column::CartId, cart_item::Column::ProductId])
                    .value(cart_item::Column::Quantity, Expr::cust(merge.on_conflict_sql()))
                    .value(cart_item::Column::UpdatedAt, Expr::current_timestamp())
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn set_quantity(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<bool> {
        let result = CartItemEntity::update_many()
            .col_expr(cart_item::Column::Quantity, Expr::value(quantity))
            .col_expr(cart_item::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn remove_item(&self, cart_id: Uuid, product_id: Uuid) -> AppResult<bool> {
        let result = CartItemEntity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, cart_id: Uuid) -> AppResult<()> {
        CartItemEntity::delete_many()
            .filter(cart_item::Column::CartId.eq(cart_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
