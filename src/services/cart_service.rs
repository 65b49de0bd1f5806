//! Cart service - the per-user shopping cart.
//!
//! Every mutation returns the freshly priced cart view. Lines are merged
//! in the database by a single upsert on (cart, product), so concurrent
//! requests never produce duplicate lines.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CartItemAdd, CartSync, CartView, QuantityMerge};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

const PRODUCT_UNAVAILABLE_MESSAGE: &str = "Product not found or unavailable";
const ITEM_NOT_IN_CART_MESSAGE: &str = "Item not found in cart";

#[async_trait]
pub trait CartService: Send + Sync {
    async fn view(&self, user_id: Uuid) -> AppResult<CartView>;

    /// Add to the line's quantity, creating it if needed
    async fn add_item(&self, user_id: Uuid, item: CartItemAdd) -> AppResult<CartView>;

    /// Set a line's quantity; 0 removes it
    async fn update_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<CartView>;

    async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> AppResult<CartView>;

    /// Merge a guest cart, keeping the larger quantity per product
    async fn sync(&self, user_id: Uuid, cart: CartSync) -> AppResult<CartView>;

    async fn clear(&self, user_id: Uuid) -> AppResult<CartView>;
}

pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn view_of(&self, cart_id: Uuid) -> AppResult<CartView> {
        let lines = self.uow.carts().lines(cart_id).await?;
        Ok(CartView::build(&lines))
    }

    async fn is_sellable(&self, product_id: Uuid) -> AppResult<bool> {
        Ok(self
            .uow
            .catalog()
            .find_product(product_id)
            .await?
            .map(|product| product.is_active)
            .unwrap_or(false))
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn view(&self, user_id: Uuid) -> AppResult<CartView> {
        let cart_id = self.uow.carts().get_or_create(user_id).await?;
        self.view_of(cart_id).await
    }

    async fn add_item(&self, user_id: Uuid, item: CartItemAdd) -> AppResult<CartView> {
        if !self.is_sellable(item.product_id).await? {
            return Err(AppError::business(PRODUCT_UNAVAILABLE_MESSAGE));
        }

        let cart_id = self.uow.carts().get_or_create(user_id).await?;
        self.uow
            .carts()
            .upsert_item(cart_id, item.product_id, item.quantity, QuantityMerge::Sum)
            .await?;

        self.view_of(cart_id).await
    }

    async fn update_item(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<CartView> {
        let cart_id = self.uow.carts().get_or_create(user_id).await?;

        let found = if quantity == 0 {
            self.uow.carts().remove_item(cart_id, product_id).await?
        } else {
            self.uow.carts().set_quantity(cart_id, product_id, quantity).await?
        };

        if !found {
            return Err(AppError::business(ITEM_NOT_IN_CART_MESSAGE));
        }

        self.view_of(cart_id).await
    }

    async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> AppResult<CartView> {
        let cart_id = self.uow.carts().get_or_create(user_id).await?;
        self.uow.carts().remove_item(cart_id, product_id).await?;
        self.view_of(cart_id).await
    }

    async fn sync(&self, user_id: Uuid, cart: CartSync) -> AppResult<CartView> {
        let cart_id = self.uow.carts().get_or_create(user_id).await?;

        for (product_id, quantity) in cart.normalized() {
            if !self.is_sellable(product_id).await? {
                tracing::debug!(product_id = %product_id, "Skipping unavailable product in cart sync");
                continue;
            }
            self.uow
                .carts()
                .upsert_item(cart_id, product_id, quantity, QuantityMerge::Max)
                .await?;
        }

        self.view_of(cart_id).await
    }

    async fn clear(&self, user_id: Uuid) -> AppResult<CartView> {
        let cart_id = self.uow.carts().get_or_create(user_id).await?;
        self.uow.carts().clear(cart_id).await?;
        Ok(CartView::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CartItem, CartLine, CartSyncItem, Product};
    use crate::services::test_support::{MockRepositories, TestUnitOfWork};
    use chrono::Utc;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    fn service(repos: MockRepositories) -> CartManager<TestUnitOfWork> {
        CartManager::new(Arc::new(TestUnitOfWork::new(repos)))
    }

    fn product(id: Uuid, price: Decimal, is_active: bool) -> Product {
        let now = Utc::now();
        Product {
            id,
            sku: "SKU".into(),
            name: "Økologiske Bananer".into(),
            slug: "oko-bananer".into(),
            description: None,
            price,
            unit: "bundt".into(),
            unit_quantity: Decimal::ONE,
            image_url: None,
            category_id: None,
            is_active,
            is_featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(cart_id: Uuid, product: Product, quantity: i32) -> CartLine {
        CartLine {
            item: CartItem {
                id: Uuid::new_v4(),
                cart_id,
                product_id: product.id,
                quantity,
                created_at: Utc::now(),
            },
            product: Some(product),
        }
    }

    #[tokio::test]
    async fn test_add_inactive_product_rejected() {
        let product_id = Uuid::new_v4();
        let mut repos = MockRepositories::default();
        repos
            .catalog
            .expect_find_product()
            .returning(move |id| Ok(Some(product(id, Decimal::ONE, false))));
        repos.carts.expect_upsert_item().never();

        let err = service(repos)
            .add_item(Uuid::new_v4(), CartItemAdd { product_id, quantity: 1 })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), PRODUCT_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_add_sums_quantity_and_returns_view() {
        let cart_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let mut repos = MockRepositories::default();
        repos
            .catalog
            .expect_find_product()
            .returning(|id| Ok(Some(product(id, Decimal::new(2495, 2), true))));
        repos.carts.expect_get_or_create().returning(move |_| Ok(cart_id));
        repos
            .carts
            .expect_upsert_item()
            .with(eq(cart_id), eq(product_id), eq(2), eq(QuantityMerge::Sum))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        repos.carts.expect_lines().returning(move |cart_id| {
            Ok(vec![line(cart_id, product(product_id, Decimal::new(2495, 2), true), 2)])
        });

        let view = service(repos)
            .add_item(Uuid::new_v4(), CartItemAdd { product_id, quantity: 2 })
            .await
            .unwrap();

        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal.to_string(), "49.90");
    }

    #[tokio::test]
    async fn test_update_missing_line_rejected() {
        let mut repos = MockRepositories::default();
        repos.carts.expect_get_or_create().returning(|_| Ok(Uuid::new_v4()));
        repos.carts.expect_set_quantity().returning(|_, _, _| Ok(false));

        let err = service(repos)
            .update_item(Uuid::new_v4(), Uuid::new_v4(), 3)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), ITEM_NOT_IN_CART_MESSAGE);
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_line() {
        let mut repos = MockRepositories::default();
        repos.carts.expect_get_or_create().returning(|_| Ok(Uuid::new_v4()));
        repos.carts.expect_set_quantity().never();
        repos.carts.expect_remove_item().times(1).returning(|_, _| Ok(true));
        repos.carts.expect_lines().returning(|_| Ok(vec![]));

        let view = service(repos)
            .update_item(Uuid::new_v4(), Uuid::new_v4(), 0)
            .await
            .unwrap();
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn test_sync_skips_unavailable_and_keeps_max() {
        let available = Uuid::new_v4();
        let retired = Uuid::new_v4();
        let mut repos = MockRepositories::default();
        repos.carts.expect_get_or_create().returning(|_| Ok(Uuid::new_v4()));
        repos.catalog.expect_find_product().returning(move |id| {
            Ok(Some(product(id, Decimal::ONE, id == available)))
        });
        repos
            .carts
            .expect_upsert_item()
            .withf(move |_, product_id, quantity, merge| {
                *product_id == available && *quantity == 5 && *merge == QuantityMerge::Max
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        repos.carts.expect_lines().returning(|_| Ok(vec![]));

        service(repos)
            .sync(
                Uuid::new_v4(),
                CartSync {
                    items: vec![
                        CartSyncItem { product_id: available, quantity: 5 },
                        CartSyncItem { product_id: available, quantity: 2 },
                        CartSyncItem { product_id: retired, quantity: 1 },
                    ],
                },
            )
            .await
            .unwrap();
    }
}
