//! 自定义 Axum 提取器
//!
//! 请求体或路径参数无法解析时统一返回 400 和字段级错误。

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use super::error::CoreError;
use super::response::FieldErrors;

/// JSON 请求体，解析失败时错误键为 `$`
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(CoreError::Validation(FieldErrors::single(
                "$",
                rejection.body_text(),
            ))),
        }
    }
}

/// 路径中的整数资源 ID
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = CoreError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| CoreError::Validation(FieldErrors::single("id", e.body_text())))?;

        raw.parse::<i64>().map(Self).map_err(|_| {
            CoreError::Validation(FieldErrors::single(
                "id",
                format!("The value '{}' is not valid.", raw),
            ))
        })
    }
}
