use tokio::net::TcpListener;
use tracing::{error, info};

use user_patch_api::app::docs;
use user_patch_api::config::{find_config_file, load_config};
use user_patch_api::infrastructure::{DatabaseManager, Logger};
use user_patch_api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    config.validate()?;

    Logger::init(&config.logging);
    match find_config_file() {
        Some(path) => info!("从配置文件加载: {}", path),
        None => info!("未找到配置文件，使用默认配置"),
    }

    let db = DatabaseManager::connect(&config.database).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        e
    })?;
    db.ensure_schema().await?;

    let state = AppState::new(db.get_pool().clone());
    let app = build_router(state, config.http.enable_docs);

    let listener = TcpListener::bind(config.http.socket_addr()?).await?;
    let addr = listener.local_addr()?;

    info!("🚀 Users API running on http://{}", addr);
    info!("   GET    /users        - List users");
    info!("   GET    /users/{{id}}   - Get user by id");
    info!("   POST   /users        - Create user");
    info!("   PATCH  /users/{{id}}   - Apply a JSON Patch document");
    info!("   DELETE /users/{{id}}   - Delete user");
    if config.http.enable_docs {
        info!("📖 API docs: http://{}{}", addr, docs::UI_PATH);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.get_pool().close().await;
    info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("无法监听退出信号: {}", e);
    }
    info!("收到退出信号，正在关闭");
}
