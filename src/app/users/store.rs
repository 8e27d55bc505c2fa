//! 用户记录存储
//!
//! 每个方法只执行一条参数化语句，不跨语句开启事务。

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use super::model::{NewUser, User};
use crate::core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::InternalServerError(err.to_string())
    }
}

/// 用户存储接口，构造时注入连接池
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// 插入并返回带有新 `Id` 的记录
    async fn insert(&self, user: &NewUser) -> Result<User, StoreError>;

    /// 按 `Id` 覆盖全部可变字段，行不存在时返回 `false`
    async fn update(&self, user: &User) -> Result<bool, StoreError>;

    /// 行不存在时返回 `false`
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users =
            sqlx::query_as::<_, User>("SELECT Id, Name, Email, Age, Address FROM Users ORDER BY Id")
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    async fn find(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT Id, Name, Email, Age, Address FROM Users WHERE Id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: &NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO Users (Name, Email, Age, Address) VALUES (?, ?, ?, ?) \
             RETURNING Id, Name, Email, Age, Address",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .bind(&user.address)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE Users SET Name = ?, Email = ?, Age = ?, Address = ? WHERE Id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .bind(&user.address)
        .bind(user.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM Users WHERE Id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::DatabaseManager;

    async fn store() -> SqliteUserStore {
        let db = DatabaseManager::in_memory().await.unwrap();
        db.ensure_schema().await.unwrap();
        SqliteUserStore::new(db.get_pool().clone())
    }

    fn ann() -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            age: 30,
            address: "1 Main St".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = store().await;
        let first = store.insert(&ann()).await.unwrap();
        let second = store.insert(&ann()).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(first.name, "Ann");
        assert_eq!(store.list().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_find_update_delete() {
        let store = store().await;
        let mut user = store.insert(&ann()).await.unwrap();

        user.age = 31;
        assert!(store.update(&user).await.unwrap());
        assert_eq!(store.find(user.id).await.unwrap(), Some(user.clone()));

        assert!(store.delete(user.id).await.unwrap());
        assert_eq!(store.find(user.id).await.unwrap(), None);
        assert!(!store.delete(user.id).await.unwrap());
        assert!(!store.update(&user).await.unwrap());
    }

    #[tokio::test]
    async fn test_values_are_bound_not_interpolated() {
        let store = store().await;
        let hostile = NewUser {
            name: "Robert'); DROP TABLE Users;--".to_string(),
            ..ann()
        };

        let created = store.insert(&hostile).await.unwrap();
        assert_eq!(created.name, hostile.name);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
