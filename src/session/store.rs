use std::sync::Arc;

use super::keys::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_KEY};
use super::model::{Session, UserProfile};
use super::storage::LocalStorage;
use crate::error::Result;

/// 会话的唯一读写入口
///
/// 其他组件只通过这里读写令牌，不直接访问底层存储。
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// 读取当前会话；没有访问令牌时一律视为未登录
    pub async fn get(&self) -> Result<Option<Session>> {
        let Some(access_token) = self.access_token().await? else {
            return Ok(None);
        };
        let refresh_token = self.refresh_token().await?;

        let user = match self.storage.get_item(USER_KEY).await? {
            Some(json) => match serde_json::from_str::<UserProfile>(&json) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Stored user profile is unreadable, ignoring it: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Some(Session {
            access_token,
            refresh_token,
            user,
        }))
    }

    /// 登录成功后整体写入会话
    pub async fn set(&self, session: &Session) -> Result<()> {
        self.storage
            .set_item(ACCESS_TOKEN_KEY, &session.access_token)
            .await?;

        match &session.refresh_token {
            Some(token) => self.storage.set_item(REFRESH_TOKEN_KEY, token).await?,
            None => self.storage.remove_item(REFRESH_TOKEN_KEY).await?,
        }

        match &session.user {
            Some(user) => {
                let json = serde_json::to_string(user)?;
                self.storage.set_item(USER_KEY, &json).await?;
            }
            None => self.storage.remove_item(USER_KEY).await?,
        }

        Ok(())
    }

    /// 删除全部三个会话键
    pub async fn clear(&self) -> Result<()> {
        for key in SESSION_KEYS {
            self.storage.remove_item(key).await?;
        }
        tracing::debug!("Session cleared");
        Ok(())
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get_item(ACCESS_TOKEN_KEY)
            .await?
            .filter(|token| !token.is_empty()))
    }

    pub async fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get_item(REFRESH_TOKEN_KEY)
            .await?
            .filter(|token| !token.is_empty()))
    }

    /// 刷新后原地替换令牌；没有新的刷新令牌时保留旧的
    pub async fn update_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> Result<()> {
        self.storage.set_item(ACCESS_TOKEN_KEY, access_token).await?;
        if let Some(refresh_token) = refresh_token {
            self.storage
                .set_item(REFRESH_TOKEN_KEY, refresh_token)
                .await?;
        }
        Ok(())
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.access_token().await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStorage, Role};

    fn store() -> (Arc<MemoryStorage>, SessionStore) {
        let storage = Arc::new(MemoryStorage::new());
        (storage.clone(), SessionStore::new(storage))
    }

    fn admin_session() -> Session {
        Session {
            access_token: "access-1".into(),
            refresh_token: Some("refresh-1".into()),
            user: Some(UserProfile {
                id: "1".into(),
                name: "Camila".into(),
                role: Role::Admin,
            }),
        }
    }

    #[tokio::test]
    async fn stores_and_reads_back_a_session() {
        let (_, store) = store();
        store.set(&admin_session()).await.unwrap();

        assert_eq!(store.get().await.unwrap(), Some(admin_session()));
        assert!(store.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn missing_access_token_means_no_session() {
        let (storage, store) = store();
        storage.set_item(REFRESH_TOKEN_KEY, "refresh-1").await.unwrap();
        storage
            .set_item(USER_KEY, r#"{"id":"1","name":"Camila","role":"admin"}"#)
            .await
            .unwrap();

        assert_eq!(store.get().await.unwrap(), None);
        assert!(!store.is_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn clear_removes_every_key() {
        let (storage, store) = store();
        store.set(&admin_session()).await.unwrap();
        assert_eq!(storage.len(), 3);

        store.clear().await.unwrap();
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_refresh_token_unless_rotated() {
        let (_, store) = store();
        store.set(&admin_session()).await.unwrap();

        store.update_tokens("access-2", None).await.unwrap();
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("refresh-1"));

        store.update_tokens("access-3", Some("refresh-2")).await.unwrap();
        let session = store.get().await.unwrap().unwrap();
        assert_eq!(session.access_token, "access-3");
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-2"));
    }

    #[tokio::test]
    async fn corrupt_profile_keeps_the_tokens() {
        let (storage, store) = store();
        storage.set_item(ACCESS_TOKEN_KEY, "access-1").await.unwrap();
        storage.set_item(USER_KEY, "not json").await.unwrap();

        let session = store.get().await.unwrap().unwrap();
        assert_eq!(session.access_token, "access-1");
        assert!(session.user.is_none());
    }
}
