//! Users service routes

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    middleware::basic_auth_middleware,
    models::UserPayload,
    photos,
    state::AppState,
};

/// Multipart part that carries the uploaded photo
const PHOTO_FIELD: &str = "file";

/// Create the router for the users service
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/users", get(get_users).post(create_user))
        .route("/users/", get(get_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route(
            "/users/:id/photo",
            get(get_photo).post(upload_photo).delete(delete_photo),
        )
        .fallback(api_fallback)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            basic_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "users-service"
    }))
}

/// Unmatched `/api` paths, reached only after authentication
async fn api_fallback() -> ApiError {
    ApiError::NotFound("Resource not found")
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> ApiResult<impl IntoResponse> {
    let user = state.user_service.create_user(payload).await?;
    Ok(Json(user))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.user_service.get_all_users().await?;
    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    info!(user_id = id, "Fetching user");

    let user = state
        .user_service
        .get_user_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user))
}

/// Replace a user's fields
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_service
        .update_user(id, payload)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(user))
}

/// Delete a user by ID
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a photo for a user from the `file` multipart part
pub async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        state
            .user_service
            .attach_photo(id, &bytes, &file_name)
            .await?;

        return Ok(Json(json!({"message": "Photo uploaded successfully"})));
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart part '{}'",
        PHOTO_FIELD
    )))
}

/// Download a user's photo
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let photo = state.user_service.fetch_photo(id).await?;

    Ok((
        [(header::CONTENT_TYPE, photos::content_type(&photo.file_name))],
        photo.bytes,
    ))
}

/// Delete a user's photo
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.user_service.detach_photo(id).await?;
    Ok(Json(json!({"message": "Photo deleted successfully"})))
}
