//! Unit of Work double for service tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::infra::repositories::{
    AddressRepository, CartRepository, CatalogRepository, MockAddressRepository,
    MockCartRepository, MockCatalogRepository, MockOrderRepository, MockServiceAreaRepository,
    MockUserRepository, OrderRepository, ServiceAreaRepository, UserRepository,
};
use crate::infra::{TransactionContext, TxFuture, UnitOfWork};

/// Mocked repositories; set expectations, then wrap in [`TestUnitOfWork`].
#[derive(Default)]
pub struct MockRepositories {
    pub users: MockUserRepository,
    pub catalog: MockCatalogRepository,
    pub service_area: MockServiceAreaRepository,
    pub addresses: MockAddressRepository,
    pub carts: MockCartRepository,
    pub orders: MockOrderRepository,
}

pub struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    catalog: Arc<MockCatalogRepository>,
    service_area: Arc<MockServiceAreaRepository>,
    addresses: Arc<MockAddressRepository>,
    carts: Arc<MockCartRepository>,
    orders: Arc<MockOrderRepository>,
}

impl TestUnitOfWork {
    pub fn new(repos: MockRepositories) -> Self {
        Self {
            users: Arc::new(repos.users),
            catalog: Arc::new(repos.catalog),
            service_area: Arc::new(repos.service_area),
            addresses: Arc::new(repos.addresses),
            carts: Arc::new(repos.carts),
            orders: Arc::new(repos.orders),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog.clone()
    }

    fn service_area(&self) -> Arc<dyn ServiceAreaRepository> {
        self.service_area.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressRepository> {
        self.addresses.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.carts.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        // Transactional paths are covered by the database tests in tests/
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}
