//! Users 资源：模型、存储、服务与处理器

pub mod handler;
pub mod model;
pub mod service;
pub mod store;

pub use model::{CreateUser, NewUser, User};
pub use service::UserService;
pub use store::{SqliteUserStore, StoreError, UserStore};
