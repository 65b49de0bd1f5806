//! HTTP request handlers.

pub mod address_handler;
pub mod admin_handler;
pub mod auth_handler;
pub mod cart_handler;
pub mod catalog_handler;
pub mod order_handler;

pub use address_handler::address_routes;
pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use cart_handler::cart_routes;
pub use catalog_handler::catalog_routes;
pub use order_handler::order_routes;
