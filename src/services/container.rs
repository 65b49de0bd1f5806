//! Service Container - Centralized service access.
//!
//! Handlers reach every use case through [`ServiceContainer`], so the web
//! layer can be tested against hand-written or mocked services.

use std::path::PathBuf;
use std::sync::Arc;

use super::{
    AddressManager, AddressService, AuthService, Authenticator, CartManager, CartService,
    CatalogManager, CatalogService, InvoiceBranding, InvoiceManager, InvoiceService, OrderManager,
    OrderService, ServiceAreaManager, ServiceAreaService,
};
use crate::config::Config;
use crate::infra::{HttpPdfConverter, JwksIdentityVerifier, PdfConverter, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn service_area(&self) -> Arc<dyn ServiceAreaService>;

    fn addresses(&self) -> Arc<dyn AddressService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn invoices(&self) -> Arc<dyn InvoiceService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    catalog: Arc<dyn CatalogService>,
    service_area: Arc<dyn ServiceAreaService>,
    addresses: Arc<dyn AddressService>,
    carts: Arc<dyn CartService>,
    orders: Arc<dyn OrderService>,
    invoices: Arc<dyn InvoiceService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db));

        let identity = Arc::new(JwksIdentityVerifier::new(
            config.identity.clone(),
            config.app_env.is_development(),
        ));
        if config.app_env.is_development() {
            tracing::warn!("Development identity tokens are accepted");
        }

        let converter = config.pdf_renderer_url.as_ref().map(|url| {
            tracing::info!(renderer = %url, "PDF invoices enabled");
            Arc::new(HttpPdfConverter::new(url.clone())) as Arc<dyn PdfConverter>
        });

        let invoices = InvoiceManager::new(
            uow.clone(),
            converter,
            InvoiceBranding::from(&config),
            config.invoice_storage_dir.as_ref().map(PathBuf::from),
        );

        Self {
            catalog: Arc::new(CatalogManager::new(uow.clone())),
            service_area: Arc::new(ServiceAreaManager::new(uow.clone())),
            addresses: Arc::new(AddressManager::new(uow.clone())),
            carts: Arc::new(CartManager::new(uow.clone())),
            orders: Arc::new(OrderManager::new(uow.clone(), config.delivery_fee)),
            invoices: Arc::new(invoices),
            auth: Arc::new(Authenticator::new(uow, identity, config)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    fn service_area(&self) -> Arc<dyn ServiceAreaService> {
        self.service_area.clone()
    }

    fn addresses(&self) -> Arc<dyn AddressService> {
        self.addresses.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.carts.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.orders.clone()
    }

    fn invoices(&self) -> Arc<dyn InvoiceService> {
        self.invoices.clone()
    }
}
