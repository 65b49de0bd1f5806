//! Shared request and response types.

mod pagination;
mod response;

pub use pagination::{
    AdminOrderPage, OrderPage, Page, PageRequest, PaginationParams, ProductPage,
};
pub use response::{Created, MessageResponse, NoContent};
