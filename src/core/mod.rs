//! 核心层：错误、响应、提取器、中间件与补丁应用器

pub mod error;
pub mod extract;
pub mod middleware;
pub mod patch;
pub mod response;

pub use error::CoreError;
pub use response::{ErrorResponse, FieldErrors};
