//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod address_repository;
mod cart_repository;
mod catalog_repository;
pub(crate) mod entities;
mod order_repository;
mod service_area_repository;
mod user_repository;

pub use address_repository::{AddressRepository, AddressStore, ADDRESS_IN_USE_MESSAGE};
pub use cart_repository::{CartRepository, CartStore};
pub use catalog_repository::{CatalogRepository, CatalogStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use service_area_repository::{ServiceAreaRepository, ServiceAreaStore};
pub use user_repository::{UserRepository, UserStore};

/// Statement helpers shared with transaction-bound repositories
pub(crate) mod shared {
    pub(crate) use super::address_repository::find_for_user as find_address_for_user;
    pub(crate) use super::cart_repository::{lines as cart_lines, remove_taken as remove_cart_lines};
    pub(crate) use super::order_repository::{
        append_history, insert_order, load_detail, lock_order, next_invoice_sequence, set_status,
    };
}

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use address_repository::MockAddressRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use cart_repository::MockCartRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_repository::MockCatalogRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use service_area_repository::MockServiceAreaRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
