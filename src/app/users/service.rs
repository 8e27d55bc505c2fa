//! 用户业务服务

use std::sync::Arc;

use tracing::{info, warn};

use super::model::{CreateUser, User};
use super::store::UserStore;
use crate::core::error::CoreError;
use crate::core::patch::{PatchDocument, PatchError};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, CoreError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, CoreError> {
        self.store.find(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn create_user(&self, payload: CreateUser) -> Result<User, CoreError> {
        let new_user = payload.into_new_user()?;
        let user = self.store.insert(&new_user).await?;

        info!("Created user: {} ({})", user.name, user.id);
        Ok(user)
    }

    /// 读取、应用补丁、整行覆盖。任一操作失败都不会写库。
    pub async fn patch_user(&self, id: i64, patch: &PatchDocument) -> Result<(), CoreError> {
        let current = self.get_user(id).await?;

        let patched = patch.apply(current).map_err(|err| {
            if let PatchError::Rejected(errors) = &err {
                warn!(user_id = id, failed = errors.len(), "补丁被拒绝");
            }
            err
        })?;

        if !self.store.update(&patched).await? {
            return Err(not_found(id));
        }

        info!("Updated user: {} ({})", patched.name, patched.id);
        Ok(())
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), CoreError> {
        self.get_user(id).await?;

        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }

        info!("Deleted user: {}", id);
        Ok(())
    }
}

fn not_found(id: i64) -> CoreError {
    CoreError::NotFound(format!("User with id {} was not found.", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::users::model::NewUser;
    use crate::app::users::store::{SqliteUserStore, StoreError};
    use crate::core::patch::{OperationKind, PatchOperation};
    use crate::infrastructure::DatabaseManager;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    async fn service() -> UserService {
        let db = DatabaseManager::in_memory().await.unwrap();
        db.ensure_schema().await.unwrap();
        UserService::new(Arc::new(SqliteUserStore::new(db.get_pool().clone())))
    }

    fn replace(path: &str, value: serde_json::Value) -> PatchOperation {
        PatchOperation::new(OperationKind::Replace, path).with_value(value)
    }

    /// 记录 update 调用次数，用来确认失败的补丁不会写库
    struct CountingStore {
        user: User,
        updates: Mutex<u32>,
    }

    #[async_trait]
    impl UserStore for CountingStore {
        async fn list(&self) -> Result<Vec<User>, StoreError> {
            Ok(vec![self.user.clone()])
        }

        async fn find(&self, id: i64) -> Result<Option<User>, StoreError> {
            Ok((id == self.user.id).then(|| self.user.clone()))
        }

        async fn insert(&self, _user: &NewUser) -> Result<User, StoreError> {
            Ok(self.user.clone())
        }

        async fn update(&self, _user: &User) -> Result<bool, StoreError> {
            *self.updates.lock().unwrap() += 1;
            Ok(true)
        }

        async fn delete(&self, _id: i64) -> Result<bool, StoreError> {
            Ok(true)
        }
    }

    /// find 能读到记录，但写入时行已被删除
    struct VanishingStore {
        user: User,
    }

    #[async_trait]
    impl UserStore for VanishingStore {
        async fn list(&self) -> Result<Vec<User>, StoreError> {
            Ok(Vec::new())
        }

        async fn find(&self, _id: i64) -> Result<Option<User>, StoreError> {
            Ok(Some(self.user.clone()))
        }

        async fn insert(&self, _user: &NewUser) -> Result<User, StoreError> {
            Ok(self.user.clone())
        }

        async fn update(&self, _user: &User) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn delete(&self, _id: i64) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    fn ann(id: i64) -> User {
        User {
            id,
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            age: 30,
            address: "1 Main St".to_string(),
        }
    }

    #[tokio::test]
    async fn test_patch_round_trip() {
        let service = service().await;
        let created = service
            .create_user(CreateUser::new("Ann", "a@x.com", 30, "1 Main St"))
            .await
            .unwrap();

        let patch = PatchDocument(vec![replace("/Age", json!(31))]);
        service.patch_user(created.id, &patch).await.unwrap();
        service.patch_user(created.id, &patch).await.unwrap();

        let fetched = service.get_user(created.id).await.unwrap();
        assert_eq!(fetched, User { age: 31, ..created });
    }

    #[tokio::test]
    async fn test_failed_patch_never_reaches_the_store() {
        let store = Arc::new(CountingStore {
            user: ann(1),
            updates: Mutex::new(0),
        });
        let service = UserService::new(store.clone());

        let bad_type = PatchDocument(vec![
            replace("/Name", json!("Bob")),
            replace("/Age", json!("old")),
        ]);
        assert!(matches!(
            service.patch_user(1, &bad_type).await,
            Err(CoreError::Validation(_))
        ));

        let read_only = PatchDocument(vec![replace("/Id", json!(2))]);
        match service.patch_user(1, &read_only).await {
            Err(CoreError::Validation(errors)) => {
                assert_eq!(errors.messages_for("/Id").len(), 1)
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert!(matches!(
            service.patch_user(2, &PatchDocument::default()).await,
            Err(CoreError::NotFound(_))
        ));
        assert_eq!(*store.updates.lock().unwrap(), 0);

        service.patch_user(1, &PatchDocument::default()).await.unwrap();
        assert_eq!(*store.updates.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clean_patch_is_persisted_as_is() {
        let service = service().await;
        let created = service
            .create_user(CreateUser::new("Ann", "a@x.com", 30, "1 Main St"))
            .await
            .unwrap();

        let patch = PatchDocument(vec![
            replace("/Age", json!(200)),
            PatchOperation::new(OperationKind::Remove, "/Address"),
        ]);
        service.patch_user(created.id, &patch).await.unwrap();

        let fetched = service.get_user(created.id).await.unwrap();
        assert_eq!(fetched.age, 200);
        assert_eq!(fetched.address, "");
        assert_eq!(fetched.name, "Ann");
    }

    #[tokio::test]
    async fn test_row_deleted_before_write_is_not_found() {
        let service = UserService::new(Arc::new(VanishingStore { user: ann(1) }));

        let patch = PatchDocument(vec![replace("/Age", json!(31))]);
        assert!(matches!(
            service.patch_user(1, &patch).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(1).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service().await;
        let created = service
            .create_user(CreateUser::new("Ann", "a@x.com", 30, "1 Main St"))
            .await
            .unwrap();

        service.delete_user(created.id).await.unwrap();
        assert!(matches!(
            service.get_user(created.id).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(created.id).await,
            Err(CoreError::NotFound(_))
        ));

        let patch = PatchDocument(vec![replace("/Age", json!(40))]);
        assert!(matches!(
            service.patch_user(created.id, &patch).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(service.list_users().await.unwrap().is_empty());
    }
}
