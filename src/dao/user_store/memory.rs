use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::dao::{
    models::UserEntity,
    storage::{StorageError, StorageResult},
    user_store::UserStore,
};

/// Ephemeral store keeping every account in process memory.
///
/// Backs tests and `memory` deployments where persistence across restarts
/// does not matter.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<String, UserEntity>>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn create_user(
        &self,
        username: String,
        password_hash: String,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut users = store.users.lock().await;
            if users.contains_key(&username) {
                return Err(StorageError::DuplicateUser { username });
            }
            users.insert(username, UserEntity::new(password_hash));
            Ok(())
        })
    }

    fn find_user(&self, username: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let users = store.users.lock().await;
            Ok(users.get(&username).cloned())
        })
    }

    fn add_score(&self, username: String, delta: i64) -> BoxFuture<'static, StorageResult<i64>> {
        let store = self.clone();
        Box::pin(async move {
            let mut users = store.users.lock().await;
            let Some(user) = users.get_mut(&username) else {
                return Err(StorageError::UnknownUser { username });
            };
            user.score += delta;
            Ok(user.score)
        })
    }

    fn list_scores(&self) -> BoxFuture<'static, StorageResult<Vec<(String, i64)>>> {
        let store = self.clone();
        Box::pin(async move {
            let users = store.users.lock().await;
            Ok(users
                .iter()
                .map(|(name, user)| (name.clone(), user.score))
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let store = MemoryUserStore::new();
        store.create_user("ada".into(), "hash".into()).await.unwrap();

        let user = store.find_user("ada".into()).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash");
        assert_eq!(user.score, 0);
        assert!(store.find_user("bob".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_score_updates_are_not_lost() {
        let store = MemoryUserStore::new();
        store.create_user("ada".into(), "hash".into()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add_score("ada".into(), 10).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let user = store.find_user("ada".into()).await.unwrap().unwrap();
        assert_eq!(user.score, 320);
    }
}
