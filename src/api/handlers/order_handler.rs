//! Customer order handlers.

use axum::{
    extract::{Path, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{OrderCreate, OrderResponse};
use crate::errors::AppResult;
use crate::types::{Created, OrderPage, PaginationParams};

/// Create order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/invoice", get(get_invoice))
}

/// Place an order from the cart
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = OrderCreate,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Unverified address, empty cart or no valid items")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<OrderCreate>,
) -> AppResult<Created<OrderResponse>> {
    let order = state.order_service.checkout(user.id(), payload).await?;
    Ok(Created(OrderResponse::from(order)))
}

/// Order history, newest first
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(PaginationParams),
    responses((status = 200, description = "One page of orders", body = OrderPage)),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<OrderPage>> {
    let orders = state
        .order_service
        .list_for_user(user.id(), params.for_orders())
        .await?;
    Ok(Json(orders))
}

/// One of the customer's orders
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Order not found")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderResponse>> {
    let order = state.order_service.get_for_user(user.id(), id).await?;
    Ok(Json(OrderResponse::from(order)))
}

/// Download the invoice, as PDF when a renderer is available
#[utoipa::path(
    get,
    path = "/api/orders/{id}/invoice",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Invoice as application/pdf, or text/html when PDF rendering is unavailable"),
        (status = 404, description = "Order not found")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let document = state.invoice_service.invoice_for(user.id(), id).await?;

    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    Ok((
        [
            (CONTENT_TYPE, document.content_type.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        document.body,
    )
        .into_response())
}
