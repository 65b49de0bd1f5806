//! Unit of Work: repository access plus transaction lifecycle.
//!
//! Plain repositories run each call on the pool. Work that has to be
//! atomic (checkout, status changes) runs inside `transaction`, where the
//! `TransactionContext` hands out repositories bound to one database
//! transaction. The transaction commits when the closure returns `Ok`
//! and rolls back on `Err`. If the future is dropped before commit the
//! transaction is discarded and rolled back by the driver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sea_orm::{
    AccessMode, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel,
    QueryFilter, QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::cart::{self, Entity as CartEntity};
use super::repositories::shared;
use super::repositories::{
    AddressRepository, AddressStore, CartRepository, CartStore, CatalogRepository, CatalogStore,
    OrderRepository, OrderStore, ServiceAreaRepository, ServiceAreaStore, UserRepository,
    UserStore,
};
use crate::domain::{Address, CartLine, InvoiceNumber, Order, OrderDetail, OrderDraft, OrderStatus};
use crate::errors::{AppError, AppResult};

/// Future returned by a transaction closure
pub type TxFuture<'a, T> = BoxFuture<'a, AppResult<T>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic `transaction` method;
/// tests provide their own implementation around mocked repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn catalog(&self) -> Arc<dyn CatalogRepository>;

    fn service_area(&self) -> Arc<dyn ServiceAreaRepository>;

    fn addresses(&self) -> Arc<dyn AddressRepository>;

    fn carts(&self) -> Arc<dyn CartRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Execute a closure within a ReadCommitted transaction.
    ///
    /// Rows that must not change underneath the closure are locked
    /// explicitly through the context repositories.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn carts(&self) -> TxCartRepository<'a> {
        TxCartRepository { txn: self.txn }
    }

    pub fn addresses(&self) -> TxAddressRepository<'a> {
        TxAddressRepository { txn: self.txn }
    }

    pub fn orders(&self) -> TxOrderRepository<'a> {
        TxOrderRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    catalog_repo: Arc<CatalogStore>,
    service_area_repo: Arc<ServiceAreaStore>,
    address_repo: Arc<AddressStore>,
    cart_repo: Arc<CartStore>,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            catalog_repo: Arc::new(CatalogStore::new(db.clone())),
            service_area_repo: Arc::new(ServiceAreaStore::new(db.clone())),
            address_repo: Arc::new(AddressStore::new(db.clone())),
            cart_repo: Arc::new(CartStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog_repo.clone()
    }

    fn service_area(&self) -> Arc<dyn ServiceAreaRepository> {
        self.service_area_repo.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressRepository> {
        self.address_repo.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.cart_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let result = f(TransactionContext::new(&txn)).await;

        match result {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-bound cart access
pub struct TxCartRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxCartRepository<'a> {
    /// Lock the user's cart row (`SELECT .. FOR UPDATE`). A concurrent
    /// checkout of the same cart waits here until this transaction ends.
    pub async fn lock_for_user(&self, user_id: Uuid) -> AppResult<Option<Uuid>> {
        let cart = CartEntity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .lock_exclusive()
            .one(self.txn)
            .await?;

        Ok(cart.map(|cart| cart.id))
    }

    pub async fn lines(&self, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
        shared::cart_lines(self.txn, cart_id).await
    }

    /// Remove the lines a checkout priced, leaving anything added since.
    pub async fn remove_lines(&self, lines: &[CartLine]) -> AppResult<()> {
        shared::remove_cart_lines(self.txn, lines).await
    }
}

/// Transaction-bound address access
pub struct TxAddressRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAddressRepository<'a> {
    pub async fn find_for_user(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Address>> {
        shared::find_address_for_user(self.txn, user_id, id).await
    }
}

/// Transaction-bound order writes
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    pub async fn next_invoice_number(&self, year: i32) -> AppResult<InvoiceNumber> {
        let sequence = shared::next_invoice_sequence(self.txn, year).await?;
        Ok(InvoiceNumber::new(year, sequence))
    }

    pub async fn insert(
        &self,
        user_id: Uuid,
        draft: OrderDraft,
        invoice_number: &InvoiceNumber,
        placed_note: &str,
        now: DateTime<Utc>,
    ) -> AppResult<OrderDetail> {
        shared::insert_order(self.txn, user_id, draft, invoice_number, placed_note, now).await
    }

    /// Order row locked until the transaction ends
    pub async fn lock(&self, id: Uuid) -> AppResult<Option<Order>> {
        shared::lock_order(self.txn, id).await
    }

    /// Set the new status and append the matching history entry.
    pub async fn record_transition(
        &self,
        id: Uuid,
        status: OrderStatus,
        changed_by: Option<Uuid>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        shared::set_status(self.txn, id, status, now).await?;
        shared::append_history(self.txn, id, status, changed_by, notes, now).await
    }

    pub async fn detail(&self, order: Order) -> AppResult<OrderDetail> {
        shared::load_detail(self.txn, order).await
    }
}

/// Shorthand for running a block inside a transaction.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
