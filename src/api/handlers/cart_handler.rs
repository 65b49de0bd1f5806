//! Shopping cart handlers. Every route returns the updated cart.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch, post},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CartItemAdd, CartItemUpdate, CartSync, CartView};
use crate::errors::AppResult;

/// Create cart routes
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:product_id", patch(update_item).delete(remove_item))
        .route("/sync", post(sync_cart))
}

/// Current cart with live prices
#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "Cart",
    responses((status = 200, description = "Cart", body = CartView)),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<CartView>> {
    Ok(Json(state.cart_service.view(user.id()).await?))
}

/// Add a product, summing with any existing line
#[utoipa::path(
    post,
    path = "/api/cart/items",
    tag = "Cart",
    request_body = CartItemAdd,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Invalid quantity or unavailable product")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn add_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CartItemAdd>,
) -> AppResult<Json<CartView>> {
    Ok(Json(state.cart_service.add_item(user.id(), payload).await?))
}

/// Set a line's quantity; 0 removes it
#[utoipa::path(
    patch,
    path = "/api/cart/items/{product_id}",
    tag = "Cart",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    request_body = CartItemUpdate,
    responses(
        (status = 200, description = "Updated cart", body = CartView),
        (status = 400, description = "Invalid quantity or item not in cart")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CartItemUpdate>,
) -> AppResult<Json<CartView>> {
    let cart = state
        .cart_service
        .update_item(user.id(), product_id, payload.quantity)
        .await?;
    Ok(Json(cart))
}

/// Remove a line
#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    tag = "Cart",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "Updated cart", body = CartView)),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<CartView>> {
    Ok(Json(state.cart_service.remove_item(user.id(), product_id).await?))
}

/// Merge a guest cart after sign-in
#[utoipa::path(
    post,
    path = "/api/cart/sync",
    tag = "Cart",
    request_body = CartSync,
    responses((status = 200, description = "Merged cart", body = CartView)),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn sync_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CartSync>,
) -> AppResult<Json<CartView>> {
    Ok(Json(state.cart_service.sync(user.id(), payload).await?))
}

/// Empty the cart
#[utoipa::path(
    delete,
    path = "/api/cart",
    tag = "Cart",
    responses((status = 200, description = "Empty cart", body = CartView)),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<CartView>> {
    Ok(Json(state.cart_service.clear(user.id()).await?))
}
