//! Domain layer - Core business entities and logic
//!
//! Catalog, service area, addresses, carts and orders, independent of
//! persistence and transport. Pricing, the order state machine, invoice
//! numbering and category-tree assembly are pure functions here.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod category_tree;
pub mod invoice_number;
pub mod money;
pub mod order;
pub mod order_status;
pub mod service_area;
pub mod user;

pub use address::{Address, AddressChanges, AddressResponse, NewAddress};
pub use cart::{
    CartItem, CartItemAdd, CartItemUpdate, CartLine, CartLineView, CartSync, CartSyncItem,
    CartView, QuantityMerge,
};
pub use catalog::{Category, NewProduct, Product, ProductChanges, ProductFilter};
pub use category_tree::{build_category_tree, CategoryForest, CategoryNode};
pub use invoice_number::InvoiceNumber;
pub use order::{
    AddressSnapshot, AdminOrderSummary, Invoice, Order, OrderCreate, OrderDetail, OrderDraft,
    OrderItem, OrderItemResponse, OrderResponse, OrderStatusUpdate, OrderSummary, PricedLine,
    ProductSnapshot, StatusChange, StatusChangeResponse,
};
pub use order_status::OrderStatus;
pub use service_area::{NewServicePostcode, PostcodeCheck, ServiceAddressRule, ServicePostcode};
pub use user::{User, UserResponse, VerifiedIdentity};
