//! 用户数据模型

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::patch::Patchable;

/// 用户记录，字段与 Users 表列一一对应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "PascalCase")]
#[sqlx(rename_all = "PascalCase")]
pub struct User {
    /// 由数据库分配，创建后不可修改
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub address: String,
}

impl Patchable for User {
    fn read_only_fields() -> &'static [&'static str] {
        &["Id"]
    }
}

/// 创建用户请求，调用方提供的 `Id` 会被忽略
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUser {
    #[validate(required(message = "The Name field is required."))]
    #[schema(example = "Ann")]
    pub name: Option<String>,

    #[validate(
        required(message = "The Email field is required."),
        email(message = "The Email field is not a valid e-mail address.")
    )]
    #[schema(example = "a@x.com")]
    pub email: Option<String>,

    #[validate(required(message = "The Age field is required."))]
    #[schema(example = 30)]
    pub age: Option<i32>,

    #[validate(required(message = "The Address field is required."))]
    #[schema(example = "1 Main St")]
    pub address: Option<String>,
}

/// 通过校验、待插入的用户
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub address: String,
}

impl CreateUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        age: i32,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            age: Some(age),
            address: Some(address.into()),
        }
    }

    /// 校验后转换为 [`NewUser`]
    pub fn into_new_user(self) -> Result<NewUser, validator::ValidationErrors> {
        self.validate()?;
        Ok(NewUser {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            age: self.age.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
        })
    }
}
