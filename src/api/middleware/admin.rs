//! Admin API-key gate.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::ADMIN_API_KEY_HEADER;
use crate::errors::AppError;

/// Rejects requests whose `X-Admin-API-Key` does not exactly match the
/// configured key.
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(ADMIN_API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if !key.is_empty() && key == state.config.admin_api_key() => {
            Ok(next.run(request).await)
        }
        _ => {
            tracing::warn!(path = %request.uri().path(), "Rejected admin request");
            Err(AppError::InvalidAdminKey)
        }
    }
}
