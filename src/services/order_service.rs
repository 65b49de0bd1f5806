//! Order service - checkout, order history and the status workflow.
//!
//! Checkout runs as one transaction: the customer's cart row is locked,
//! the lines are priced against current catalog prices, an invoice number
//! is drawn from the yearly sequence, and the order, its items, the first
//! history entry and the invoice row are written before the cart is
//! cleared. Any failure rolls everything back, including the drawn number.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::order::PLACED_BY_CUSTOMER_NOTE;
use crate::domain::{
    Address, AdminOrderSummary, Order, OrderCreate, OrderDetail, OrderDraft, OrderStatus,
    OrderStatusUpdate, OrderSummary,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PageRequest};

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Turn the customer's cart into an order.
    async fn checkout(&self, user_id: Uuid, request: OrderCreate) -> AppResult<OrderDetail>;

    /// One of the customer's own orders
    async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> AppResult<OrderDetail>;

    /// Customer order history, newest first
    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<OrderSummary>>;

    /// Back-office order list, newest first
    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> AppResult<Page<AdminOrderSummary>>;

    async fn get(&self, id: Uuid) -> AppResult<OrderDetail>;

    /// Move an order along the status workflow.
    async fn update_status(
        &self,
        id: Uuid,
        update: OrderStatusUpdate,
        changed_by: Option<Uuid>,
    ) -> AppResult<OrderDetail>;
}

pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
    delivery_fee: Decimal,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>, delivery_fee: Decimal) -> Self {
        Self { uow, delivery_fee }
    }
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn checkout(&self, user_id: Uuid, request: OrderCreate) -> AppResult<OrderDetail> {
        let delivery_fee = self.delivery_fee;
        let address_id = request.address_id;
        let notes = clean_notes(request.notes);

        let detail = crate::with_transaction!(self.uow, |ctx| {
            let cart_id = ctx.carts().lock_for_user(user_id).await?;

            let address =
                Address::deliverable(ctx.addresses().find_for_user(user_id, address_id).await?)?;

            let lines = match cart_id {
                Some(cart_id) => ctx.carts().lines(cart_id).await?,
                None => Vec::new(),
            };

            let draft = OrderDraft::price(&address, &lines, delivery_fee, notes)?;

            let now = Utc::now();
            let invoice_number = ctx.orders().next_invoice_number(now.year()).await?;
            let detail = ctx
                .orders()
                .insert(user_id, draft, &invoice_number, PLACED_BY_CUSTOMER_NOTE, now)
                .await?;

            ctx.carts().remove_lines(&lines).await?;

            Ok::<OrderDetail, AppError>(detail)
        })?;

        tracing::info!(
            order_id = %detail.order.id,
            user_id = %user_id,
            invoice_number = %detail.order.invoice_number,
            total = %detail.order.total,
            "Order placed"
        );

        Ok(detail)
    }

    async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> AppResult<OrderDetail> {
        self.uow
            .orders()
            .find_detail(id, Some(user_id))
            .await?
            .ok_or_not_found("Order")
    }

    async fn list_for_user(&self, user_id: Uuid, page: PageRequest) -> AppResult<Page<OrderSummary>> {
        let (items, total) = self.uow.orders().list_for_user(user_id, page).await?;
        Ok(Page::new(items, page, total))
    }

    async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> AppResult<Page<AdminOrderSummary>> {
        let (items, total) = self.uow.orders().list_all(status, page).await?;
        Ok(Page::new(items, page, total))
    }

    async fn get(&self, id: Uuid) -> AppResult<OrderDetail> {
        self.uow
            .orders()
            .find_detail(id, None)
            .await?
            .ok_or_not_found("Order")
    }

    async fn update_status(
        &self,
        id: Uuid,
        update: OrderStatusUpdate,
        changed_by: Option<Uuid>,
    ) -> AppResult<OrderDetail> {
        let OrderStatusUpdate { status, notes } = update;
        let notes = clean_notes(notes);

        let detail = crate::with_transaction!(self.uow, |ctx| {
            let order = ctx.orders().lock(id).await?.ok_or_not_found("Order")?;
            let next = order.status.transition_to(status)?;

            let now = Utc::now();
            ctx.orders()
                .record_transition(id, next, changed_by, notes, now)
                .await?;

            let order = Order {
                status: next,
                updated_at: now,
                ..order
            };
            let detail = ctx.orders().detail(order).await?;
            Ok::<OrderDetail, AppError>(detail)
        })?;

        tracing::info!(order_id = %id, status = %detail.order.status, "Order status changed");
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AddressSnapshot, StatusChange};
    use crate::services::test_support::{MockRepositories, TestUnitOfWork};
    use mockall::predicate::eq;

    fn service(repos: MockRepositories) -> OrderManager<TestUnitOfWork> {
        OrderManager::new(Arc::new(TestUnitOfWork::new(repos)), Decimal::new(2900, 2))
    }

    fn detail(id: Uuid, user_id: Uuid) -> OrderDetail {
        let now = Utc::now();
        OrderDetail {
            order: Order {
                id,
                user_id,
                address_id: Uuid::new_v4(),
                address_snapshot: AddressSnapshot {
                    id: Uuid::new_v4(),
                    label: "Home".into(),
                    street: "Jagtvej".into(),
                    building: Some("69".into()),
                    floor: None,
                    apartment: None,
                    postcode: "2200".into(),
                    city: "København N".into(),
                    instructions: None,
                },
                status: OrderStatus::Placed,
                subtotal: Decimal::new(6240, 2),
                delivery_fee: Decimal::new(2900, 2),
                total: Decimal::new(9140, 2),
                invoice_number: "INV-2025-000001".into(),
                invoice_generated_at: Some(now),
                notes: None,
                created_at: now,
                updated_at: now,
            },
            items: vec![],
            history: vec![StatusChange {
                id: 1,
                order_id: id,
                status: OrderStatus::Placed,
                changed_by: Some(user_id),
                notes: Some(PLACED_BY_CUSTOMER_NOTE.into()),
                created_at: now,
            }],
        }
    }

    #[test]
    fn test_notes_are_trimmed_and_blank_dropped() {
        assert_eq!(clean_notes(Some("  ring twice ".into())).as_deref(), Some("ring twice"));
        assert_eq!(clean_notes(Some("   ".into())), None);
        assert_eq!(clean_notes(None), None);
    }

    #[tokio::test]
    async fn test_get_for_user_is_owner_scoped() {
        let user_id = Uuid::new_v4();
        let order_id = Uuid::new_v4();
        let mut repos = MockRepositories::default();
        repos
            .orders
            .expect_find_detail()
            .with(eq(order_id), eq(Some(user_id)))
            .returning(|_, _| Ok(None));

        let result = service(repos).get_for_user(user_id, order_id).await;
        assert!(matches!(result, Err(AppError::NotFound("Order"))));
    }

    #[tokio::test]
    async fn test_admin_get_is_unscoped() {
        let order_id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let mut repos = MockRepositories::default();
        repos
            .orders
            .expect_find_detail()
            .with(eq(order_id), eq(None))
            .returning(move |id, _| Ok(Some(detail(id, owner))));

        let found = service(repos).get(order_id).await.unwrap();
        assert_eq!(found.order.user_id, owner);
        assert_eq!(found.history.len(), 1);
    }

    #[tokio::test]
    async fn test_list_for_user_wraps_page() {
        let mut repos = MockRepositories::default();
        repos
            .orders
            .expect_list_for_user()
            .returning(|_, _| Ok((vec![], 41)));

        let page = service(repos)
            .list_for_user(Uuid::new_v4(), PageRequest::new(3, 20))
            .await
            .unwrap();
        assert_eq!(page.total, 41);
        assert_eq!(page.page, 3);
        assert_eq!(page.pages, 3);
    }

    #[tokio::test]
    async fn test_list_all_passes_status_filter() {
        let mut repos = MockRepositories::default();
        repos
            .orders
            .expect_list_all()
            .withf(|status, page| *status == Some(OrderStatus::Packing) && page.limit == 50)
            .returning(|_, _| Ok((vec![], 0)));

        let page = service(repos)
            .list_all(Some(OrderStatus::Packing), PageRequest::new(1, 50))
            .await
            .unwrap();
        assert_eq!(page.pages, 0);
    }
}
