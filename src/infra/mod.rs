//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Unit of Work for transaction management
//! - Identity provider token verification
//! - HTML to PDF conversion for invoices

pub mod db;
pub mod identity;
pub mod pdf;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use identity::{IdentityVerifier, JwksIdentityVerifier};
pub use pdf::{HttpPdfConverter, PdfConverter};
pub use repositories::{
    AddressRepository, CartRepository, CatalogRepository, OrderRepository, ServiceAreaRepository,
    UserRepository,
};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use identity::MockIdentityVerifier;
#[cfg(any(test, feature = "test-utils"))]
pub use pdf::MockPdfConverter;
