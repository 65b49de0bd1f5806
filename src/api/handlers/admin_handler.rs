//! Back-office handlers, gated by the admin API key.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, patch},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    NewProduct, NewServicePostcode, OrderResponse, OrderStatus, OrderStatusUpdate, Product,
    ProductChanges, ServicePostcode,
};
use crate::errors::AppResult;
use crate::types::{AdminOrderPage, Created, NoContent, PaginationParams};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AdminProductQuery {
    /// Include soft-deleted products
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AdminOrderQuery {
    pub page: Option<u64>,
    /// Page size, default 50
    pub limit: Option<u64>,
    pub status: Option<OrderStatus>,
}

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", patch(update_product).delete(delete_product))
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", patch(update_order_status))
        .route("/postcodes", get(list_postcodes).post(add_postcode))
        .route("/postcodes/:postcode", delete(remove_postcode))
}

/// List all products
#[utoipa::path(
    get,
    path = "/api/admin/products",
    tag = "Admin",
    params(AdminProductQuery),
    responses(
        (status = 200, description = "Products", body = [Product]),
        (status = 401, description = "Invalid or missing admin API key")
    ),
    security(("admin_api_key" = []))
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<AdminProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let products = state
        .catalog_service
        .admin_list_products(query.include_inactive)
        .await?;
    Ok(Json(products))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "Admin",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error"),
        (status = 409, description = "SKU or slug already in use")
    ),
    security(("admin_api_key" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewProduct>,
) -> AppResult<Created<Product>> {
    Ok(Created(state.catalog_service.create_product(payload).await?))
}

/// Update product fields
#[utoipa::path(
    patch,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductChanges,
    responses(
        (status = 200, description = "Updated product", body = Product),
        (status = 404, description = "Product not found")
    ),
    security(("admin_api_key" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProductChanges>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog_service.update_product(id, payload).await?))
}

/// Deactivate a product
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deactivated"),
        (status = 404, description = "Product not found")
    ),
    security(("admin_api_key" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.catalog_service.delete_product(id).await?;
    Ok(NoContent)
}

/// All orders, newest first
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "Admin",
    params(AdminOrderQuery),
    responses((status = 200, description = "One page of orders", body = AdminOrderPage)),
    security(("admin_api_key" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<AdminOrderQuery>,
) -> AppResult<Json<AdminOrderPage>> {
    let page = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .for_admin_orders();

    Ok(Json(state.order_service.list_all(query.status, page).await?))
}

/// Any order
#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Order not found")
    ),
    security(("admin_api_key" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderResponse>> {
    Ok(Json(OrderResponse::from(state.order_service.get(id).await?)))
}

/// Move an order along the status workflow
#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = OrderStatusUpdate,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Invalid status transition"),
        (status = 404, description = "Order not found")
    ),
    security(("admin_api_key" = []))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<OrderStatusUpdate>,
) -> AppResult<Json<OrderResponse>> {
    let order = state.order_service.update_status(id, payload, None).await?;
    Ok(Json(OrderResponse::from(order)))
}

/// Service-area postcodes
#[utoipa::path(
    get,
    path = "/api/admin/postcodes",
    tag = "Admin",
    responses((status = 200, description = "Postcodes", body = [ServicePostcode])),
    security(("admin_api_key" = []))
)]
pub async fn list_postcodes(State(state): State<AppState>) -> AppResult<Json<Vec<ServicePostcode>>> {
    Ok(Json(state.service_area_service.list_postcodes().await?))
}

/// Add a postcode to the service area
#[utoipa::path(
    post,
    path = "/api/admin/postcodes",
    tag = "Admin",
    request_body = NewServicePostcode,
    responses(
        (status = 201, description = "Postcode added", body = ServicePostcode),
        (status = 409, description = "Postcode already registered")
    ),
    security(("admin_api_key" = []))
)]
pub async fn add_postcode(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewServicePostcode>,
) -> AppResult<Created<ServicePostcode>> {
    Ok(Created(state.service_area_service.add_postcode(payload).await?))
}

/// Stop delivering to a postcode
#[utoipa::path(
    delete,
    path = "/api/admin/postcodes/{postcode}",
    tag = "Admin",
    params(("postcode" = String, Path, description = "Postcode")),
    responses(
        (status = 204, description = "Postcode deactivated"),
        (status = 404, description = "Postcode not found")
    ),
    security(("admin_api_key" = []))
)]
pub async fn remove_postcode(
    State(state): State<AppState>,
    Path(postcode): Path<String>,
) -> AppResult<NoContent> {
    state.service_area_service.deactivate_postcode(&postcode).await?;
    Ok(NoContent)
}
