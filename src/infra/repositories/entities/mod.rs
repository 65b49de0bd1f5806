//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod address;
pub mod cart;
pub mod cart_item;
pub mod category;
pub mod invoice;
pub mod invoice_sequence;
pub mod order;
pub mod order_item;
pub mod order_status_history;
pub mod product;
pub mod service_address;
pub mod service_postcode;
pub mod user;
