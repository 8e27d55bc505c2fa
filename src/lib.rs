//! # Users API
//!
//! 基于 SQLite 的 Users 资源 CRUD 服务，部分更新使用 JSON Patch：
//! - `app`：路由、处理器、服务与存储
//! - `core`：错误、响应、提取器、中间件与补丁应用器
//! - `infrastructure`：数据库连接与日志
//! - `config`：配置加载

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::{build_router, AppState};
pub use config::{load_config, Config};
