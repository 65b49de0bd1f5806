//! Authentication handlers.

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{session_middleware, CurrentUser};
use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Identity token exchange request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyRequest {
    /// ID token issued by the identity provider
    #[validate(length(min = 1, message = "id_token is required"))]
    #[schema(example = "dev_email:kunde@example.dk")]
    pub id_token: String,
}

/// Successful sign-in
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub user: UserResponse,
    pub session_token: String,
    /// Session lifetime in seconds
    #[schema(example = 604800)]
    pub expires_in: i64,
}

/// Create authentication routes
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/verify", post(verify))
        .route("/logout", post(logout))
        .merge(
            Router::new()
                .route("/me", get(me))
                .route_layer(middleware::from_fn_with_state(state, session_middleware)),
        )
}

fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .path("/")
        .max_age(time::Duration::seconds(max_age_seconds))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Exchange an identity token for a session
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    tag = "Authentication",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = VerifyResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid or expired identity token"),
        (status = 502, description = "Identity provider unavailable")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<VerifyRequest>,
) -> AppResult<(CookieJar, Json<VerifyResponse>)> {
    let login = state.auth_service.login(&payload.id_token).await?;

    let jar = jar.add(session_cookie(login.session_token.clone(), login.expires_in));
    let body = VerifyResponse {
        user: UserResponse::from(login.user),
        session_token: login.session_token,
        expires_in: login.expires_in,
    };

    Ok((jar, Json(body)))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Session cookie cleared", body = MessageResponse))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"));
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Signed-in user", body = UserResponse),
        (status = 401, description = "Not signed in")
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
