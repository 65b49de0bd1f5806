//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AddressService, AuthService, CartService, CatalogService, InvoiceService, OrderService,
    ServiceAreaService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub service_area_service: Arc<dyn ServiceAreaService>,
    pub address_service: Arc<dyn AddressService>,
    pub cart_service: Arc<dyn CartService>,
    pub order_service: Arc<dyn OrderService>,
    pub invoice_service: Arc<dyn InvoiceService>,
    /// Database connection, used by the health check
    pub database: Arc<Database>,
    /// Session cookie lifetime and the admin key
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config.clone());
        Self::new(&container, database, config)
    }

    /// Create application state from any service container.
    pub fn new(services: &dyn ServiceContainer, database: Arc<Database>, config: Config) -> Self {
        Self {
            auth_service: services.auth(),
            catalog_service: services.catalog(),
            service_area_service: services.service_area(),
            address_service: services.addresses(),
            cart_service: services.carts(),
            order_service: services.orders(),
            invoice_service: services.invoices(),
            database,
            config: Arc::new(config),
        }
    }
}
