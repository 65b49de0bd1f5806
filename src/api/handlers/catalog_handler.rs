//! Product and category handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::AppState;
use crate::domain::{CategoryNode, Product, ProductFilter};
use crate::errors::AppResult;
use crate::types::{PaginationParams, ProductPage};

/// Product listing query
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, at most 100
    pub limit: Option<u64>,
    /// Category slug
    pub category: Option<String>,
    /// Free-text search on name, description or SKU
    pub q: Option<String>,
    pub featured: Option<bool>,
}

/// Create catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/categories", get(list_categories))
        .route("/:slug", get(get_product))
}

/// List active products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ProductQuery),
    responses((status = 200, description = "One page of products", body = ProductPage))
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ProductPage>> {
    let page = PaginationParams {
        page: query.page,
        limit: query.limit,
    }
    .for_products();

    let filter = ProductFilter {
        category_slug: query.category,
        search: query.q,
        featured: query.featured,
        include_inactive: false,
    };

    let products = state.catalog_service.list_products(filter, page).await?;
    Ok(Json(products))
}

/// Active categories as a tree
#[utoipa::path(
    get,
    path = "/api/products/categories",
    tag = "Products",
    responses((status = 200, description = "Category tree", body = [CategoryNode]))
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryNode>>> {
    Ok(Json(state.catalog_service.category_tree().await?))
}

/// Get a product by slug
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    tag = "Products",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog_service.get_product(&slug).await?))
}
