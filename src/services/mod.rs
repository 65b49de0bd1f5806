//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use the Unit of Work for repository access; checkout and
//! status changes run inside its transactions.

mod address_service;
mod auth_service;
mod cart_service;
mod catalog_service;
pub mod container;
mod invoice_service;
mod order_service;
mod service_area_service;

#[cfg(test)]
mod test_support;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use address_service::{AddressManager, AddressService};
pub use auth_service::{AuthService, Authenticator, Login, SessionClaims};
pub use cart_service::{CartManager, CartService};
pub use catalog_service::{CatalogManager, CatalogService};
pub use invoice_service::{
    render_invoice_html, InvoiceBranding, InvoiceDocument, InvoiceManager, InvoiceService,
};
pub use order_service::{OrderManager, OrderService};
pub use service_area_service::{ServiceAreaManager, ServiceAreaService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
