//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    address_handler, admin_handler, auth_handler, cart_handler, catalog_handler, order_handler,
};
use crate::config::{ADMIN_API_KEY_HEADER, SESSION_COOKIE_NAME};
use crate::domain::{
    AddressChanges, AddressResponse, AddressSnapshot, AdminOrderSummary, CartItemAdd,
    CartItemUpdate, CartLineView, CartSync, CartSyncItem, CartView, CategoryNode, NewAddress,
    NewProduct, NewServicePostcode, OrderCreate, OrderItemResponse, OrderResponse, OrderStatus,
    OrderStatusUpdate, OrderSummary, PostcodeCheck, Product, ProductChanges, ProductSnapshot,
    ServiceAddressRule, ServicePostcode, StatusChangeResponse, UserResponse,
};
use crate::types::{AdminOrderPage, MessageResponse, OrderPage, ProductPage};

/// OpenAPI documentation for the grocery backend
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Grocery Delivery API",
        version = "0.1.0",
        description = "Catalog, cart, checkout and back office for a local grocery delivery shop"
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        auth_handler::verify,
        auth_handler::logout,
        auth_handler::me,
        catalog_handler::list_products,
        catalog_handler::list_categories,
        catalog_handler::get_product,
        address_handler::verify_postcode,
        address_handler::service_addresses,
        address_handler::list_addresses,
        address_handler::create_address,
        address_handler::get_address,
        address_handler::update_address,
        address_handler::delete_address,
        cart_handler::get_cart,
        cart_handler::add_item,
        cart_handler::update_item,
        cart_handler::remove_item,
        cart_handler::sync_cart,
        cart_handler::clear_cart,
        order_handler::create_order,
        order_handler::list_orders,
        order_handler::get_order,
        order_handler::get_invoice,
        admin_handler::list_products,
        admin_handler::create_product,
        admin_handler::update_product,
        admin_handler::delete_product,
        admin_handler::list_orders,
        admin_handler::get_order,
        admin_handler::update_order_status,
        admin_handler::list_postcodes,
        admin_handler::add_postcode,
        admin_handler::remove_postcode,
    ),
    components(
        schemas(
            UserResponse,
            auth_handler::VerifyRequest,
            auth_handler::VerifyResponse,
            MessageResponse,
            Product,
            ProductPage,
            CategoryNode,
            NewProduct,
            ProductChanges,
            PostcodeCheck,
            ServicePostcode,
            ServiceAddressRule,
            NewServicePostcode,
            address_handler::VerifyPostcodeRequest,
            NewAddress,
            AddressChanges,
            AddressResponse,
            CartItemAdd,
            CartItemUpdate,
            CartSync,
            CartSyncItem,
            CartLineView,
            CartView,
            OrderStatus,
            OrderCreate,
            OrderStatusUpdate,
            OrderSummary,
            AdminOrderSummary,
            OrderPage,
            AdminOrderPage,
            OrderResponse,
            OrderItemResponse,
            StatusChangeResponse,
            AddressSnapshot,
            ProductSnapshot,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Identity token exchange and sessions"),
        (name = "Products", description = "Catalog browsing"),
        (name = "Addresses", description = "Address book and delivery area"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Checkout, order history and invoices"),
        (name = "Admin", description = "Back office, requires the admin API key")
    )
)]
pub struct ApiDoc;

/// Session and admin-key security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token returned by /api/auth/verify"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "admin_api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_API_KEY_HEADER))),
            );
        }
    }
}
