//! 用户资源处理器

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};

use super::model::{CreateUser, User};
use crate::app::AppState;
use crate::core::error::CoreError;
use crate::core::extract::{JsonBody, ResourceId};
use crate::core::patch::{PatchDocument, PatchOperation};
use crate::core::response::ErrorResponse;

/// 查询用户
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, CoreError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

/// 查询用户详情
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get user",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "No user with this id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<User>, CoreError> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}

/// 创建用户
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create user",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User,
            headers(("Location" = String, description = "URL of the new user"))),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUser>,
) -> Result<impl IntoResponse, CoreError> {
    let user = state.user_service.create_user(payload).await?;
    let location = format!("/users/{}", user.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}

/// 更新用户
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    summary = "Patch user",
    params(("id" = i64, Path, description = "User id")),
    request_body(
        content = Vec<PatchOperation>,
        content_type = "application/json-patch+json",
        description = "JSON Patch operations applied in order"
    ),
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Patch or validation errors keyed by path", body = ErrorResponse),
        (status = 404, description = "No user with this id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn patch_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    JsonBody(patch): JsonBody<PatchDocument>,
) -> Result<StatusCode, CoreError> {
    state.user_service.patch_user(id, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 删除用户
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Delete user",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "No user with this id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, CoreError> {
    state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
