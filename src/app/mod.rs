//! 应用层：路由、共享状态与各资源的处理器

pub mod docs;
pub mod health;
pub mod users;

use axum::{middleware, routing::get, Router};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::core::middleware::request_logging_middleware;
use users::{handler, SqliteUserStore, UserService};

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub db: SqlitePool,
}

impl AppState {
    /// 以 SQLite 存储装配状态
    pub fn new(db: SqlitePool) -> Self {
        let store = Arc::new(SqliteUserStore::new(db.clone()));
        Self {
            user_service: UserService::new(store),
            db,
        }
    }
}

/// 创建路由
pub fn build_router(state: AppState, enable_docs: bool) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/users",
            get(handler::list_users).post(handler::create_user),
        )
        .route(
            "/users/{id}",
            get(handler::get_user)
                .patch(handler::patch_user)
                .delete(handler::delete_user),
        )
        .with_state(state);

    let app = if enable_docs {
        api.merge(docs::routes())
    } else {
        api
    };

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_logging_middleware)),
    )
}
