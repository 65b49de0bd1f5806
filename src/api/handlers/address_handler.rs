//! Address book and service-area lookup handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{AddressChanges, AddressResponse, NewAddress, PostcodeCheck, ServiceAddressRule};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Postcode eligibility request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyPostcodeRequest {
    #[validate(length(min = 4, max = 10, message = "Postcode must be 4-10 characters"))]
    #[schema(example = "2100")]
    pub postcode: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ServiceAddressQuery {
    pub postcode: String,
}

/// Create address routes. All of them require a session.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route("/verify-postcode", post(verify_postcode))
        .route("/service-addresses", get(service_addresses))
        .route(
            "/:id",
            get(get_address).patch(update_address).delete(delete_address),
        )
}

/// Check whether a postcode is in the delivery area
#[utoipa::path(
    post,
    path = "/api/addresses/verify-postcode",
    tag = "Addresses",
    request_body = VerifyPostcodeRequest,
    responses(
        (status = 200, description = "Eligibility result", body = PostcodeCheck),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not signed in")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn verify_postcode(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyPostcodeRequest>,
) -> AppResult<Json<PostcodeCheck>> {
    let check = state
        .service_area_service
        .check_postcode(&payload.postcode)
        .await?;
    Ok(Json(check))
}

/// Known street rules for a service postcode
#[utoipa::path(
    get,
    path = "/api/addresses/service-addresses",
    tag = "Addresses",
    params(ServiceAddressQuery),
    responses((status = 200, description = "Street rules", body = [ServiceAddressRule])),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn service_addresses(
    State(state): State<AppState>,
    Query(query): Query<ServiceAddressQuery>,
) -> AppResult<Json<Vec<ServiceAddressRule>>> {
    Ok(Json(state.service_area_service.street_rules(&query.postcode).await?))
}

/// List saved addresses, default first
#[utoipa::path(
    get,
    path = "/api/addresses",
    tag = "Addresses",
    responses((status = 200, description = "Saved addresses", body = [AddressResponse])),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<AddressResponse>>> {
    let addresses = state.address_service.list(user.id()).await?;
    Ok(Json(addresses.into_iter().map(AddressResponse::from).collect()))
}

/// Save a new address inside the service area
#[utoipa::path(
    post,
    path = "/api/addresses",
    tag = "Addresses",
    request_body = NewAddress,
    responses(
        (status = 201, description = "Address saved", body = AddressResponse),
        (status = 400, description = "Validation error or postcode outside the service area")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn create_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<NewAddress>,
) -> AppResult<Created<AddressResponse>> {
    let address = state.address_service.create(user.id(), payload).await?;
    Ok(Created(AddressResponse::from(address)))
}

/// Get one saved address
#[utoipa::path(
    get,
    path = "/api/addresses/{id}",
    tag = "Addresses",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address", body = AddressResponse),
        (status = 404, description = "Address not found")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn get_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AddressResponse>> {
    let address = state.address_service.get(user.id(), id).await?;
    Ok(Json(AddressResponse::from(address)))
}

/// Update an address
#[utoipa::path(
    patch,
    path = "/api/addresses/{id}",
    tag = "Addresses",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = AddressChanges,
    responses(
        (status = 200, description = "Updated address", body = AddressResponse),
        (status = 404, description = "Address not found")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn update_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddressChanges>,
) -> AppResult<Json<AddressResponse>> {
    let address = state.address_service.update(user.id(), id, payload).await?;
    Ok(Json(AddressResponse::from(address)))
}

/// Delete an address that no order refers to
#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    tag = "Addresses",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 400, description = "Address is used by an order"),
        (status = 404, description = "Address not found")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn delete_address(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.address_service.delete(user.id(), id).await?;
    Ok(NoContent)
}
