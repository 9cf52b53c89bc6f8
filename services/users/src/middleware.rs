//! HTTP Basic authentication middleware for the `/api` routes

use axum::{extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Reject requests that do not carry the configured Basic credential
pub async fn basic_auth_middleware(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(Authorization(basic)) = req.headers().typed_get::<Authorization<Basic>>() else {
        warn!(path = %req.uri().path(), "Missing Basic credentials");
        return Err(ApiError::Unauthorized);
    };

    if !state.credentials.matches(basic.username(), basic.password()) {
        warn!(
            path = %req.uri().path(),
            username = basic.username(),
            "Rejected Basic credentials"
        );
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}
