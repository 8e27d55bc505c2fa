//! OpenAPI 文档

use axum::{response::Json, routing::get, Router};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::users::handler;
use super::users::model::{CreateUser, User};
use crate::core::patch::{OperationKind, PatchOperation};
use crate::core::response::ErrorResponse;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";
pub const UI_PATH: &str = "/swagger";

#[derive(OpenApi)]
#[openapi(
    info(title = "Users API", version = "v1"),
    paths(
        handler::list_users,
        handler::get_user,
        handler::create_user,
        handler::patch_user,
        handler::delete_user,
    ),
    components(schemas(User, CreateUser, PatchOperation, OperationKind, ErrorResponse)),
    tags((name = "users", description = "User management"))
)]
pub struct ApiDoc;

/// 文档路由：JSON 文档与交互页面
pub fn routes() -> Router {
    Router::new()
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url(UI_PATH, ApiDoc::openapi()))
}
