//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;
use validator::ValidationErrors;

use super::patch::PatchError;
use super::response::{ErrorResponse, FieldErrors};

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("One or more validation errors occurred.")]
    Validation(FieldErrors),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl CoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Validation(_) => "VALIDATION_FAILED",
            CoreError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let CoreError::InternalServerError(msg) = &self {
            error!("请求处理失败: {}", msg);
        }

        let message = self.to_string();
        let error_response = ErrorResponse {
            error: self.kind().to_string(),
            message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            errors: match self {
                CoreError::Validation(errors) => Some(errors),
                _ => None,
            },
        };

        (status, axum::Json(error_response)).into_response()
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(err: ValidationErrors) -> Self {
        let mut fields: Vec<_> = err.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let mut errors = FieldErrors::new();
        for (field, field_errors) in fields {
            let key = wire_name(&field);
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid ({}).", key, error.code));
                errors.push(key.clone(), message);
            }
        }

        CoreError::Validation(errors)
    }
}

impl From<PatchError> for CoreError {
    fn from(err: PatchError) -> Self {
        match err {
            PatchError::Rejected(errors) => CoreError::Validation(errors),
            other => CoreError::InternalServerError(other.to_string()),
        }
    }
}

/// `snake_case` 字段名转为对外的 PascalCase 属性名
pub fn wire_name(field: &str) -> String {
    field
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
