use std::{collections::HashMap, io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::dao::{
    models::UserEntity,
    storage::{StorageError, StorageResult},
    user_store::UserStore,
};

/// On-disk schema of the users file: one JSON document keyed by username.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersDocument {
    #[serde(default)]
    users: HashMap<String, UserEntity>,
}

/// Borrowed view over the live map, serialized on every persist.
#[derive(Serialize)]
struct UsersDocumentRef<'a> {
    users: &'a HashMap<String, UserEntity>,
}

/// File-backed store rewriting the whole users document on every mutation.
///
/// All access funnels through one async mutex; holding it across the
/// modify-then-persist sequence is what makes `add_score` atomic between
/// concurrently finishing game sessions.
#[derive(Clone)]
pub struct JsonUserStore {
    path: Arc<PathBuf>,
    users: Arc<Mutex<HashMap<String, UserEntity>>>,
}

impl JsonUserStore {
    /// Open the users file, creating an empty document when none exists yet.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let (users, fresh) = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let document: UsersDocument = serde_json::from_str(&contents)
                    .map_err(|source| StorageError::corrupt(&path, source))?;
                (document.users, false)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "users file not found; starting empty");
                (HashMap::new(), true)
            }
            Err(source) => return Err(StorageError::io(&path, source)),
        };

        let count = users.len();
        let store = Self {
            path: Arc::new(path),
            users: Arc::new(Mutex::new(users)),
        };

        if fresh {
            let guard = store.users.lock().await;
            store.persist(&guard).await?;
        } else {
            info!(path = %store.path.display(), count, "loaded users file");
        }

        Ok(store)
    }

    /// Serialize the full document to disk. Callers must hold the users lock.
    async fn persist(&self, users: &HashMap<String, UserEntity>) -> StorageResult<()> {
        let payload = serde_json::to_string_pretty(&UsersDocumentRef { users })
            .map_err(|source| StorageError::Encode { source })?;
        tokio::fs::write(self.path.as_ref(), payload)
            .await
            .map_err(|source| StorageError::io(self.path.as_ref(), source))
    }
}

impl UserStore for JsonUserStore {
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
            store.persist(&users).await
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
            let total = user.score;
            store.persist(&users).await?;
            Ok(total)
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

    async fn open_temp() -> (tempfile::TempDir, JsonUserStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonUserStore::open(dir.path().join("users.json"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn missing_file_is_created_empty() {
        let (dir, store) = open_temp().await;
        assert!(dir.path().join("users.json").exists());
        assert!(store.list_scores().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_duplicate_usernames() {
        let (_dir, store) = open_temp().await;
        store.create_user("ada".into(), "h1".into()).await.unwrap();

        let err = store.create_user("ada".into(), "h2".into()).await;
        assert!(matches!(err, Err(StorageError::DuplicateUser { .. })));
    }

    #[tokio::test]
    async fn scores_accumulate_and_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let store = JsonUserStore::open(&path).await.unwrap();
        store.create_user("ada".into(), "h".into()).await.unwrap();
        assert_eq!(store.add_score("ada".into(), 10).await.unwrap(), 10);
        assert_eq!(store.add_score("ada".into(), -5).await.unwrap(), 5);

        let reopened = JsonUserStore::open(&path).await.unwrap();
        let user = reopened.find_user("ada".into()).await.unwrap().unwrap();
        assert_eq!(user.score, 5);
    }

    #[tokio::test]
    async fn unknown_user_score_update_fails() {
        let (_dir, store) = open_temp().await;
        let err = store.add_score("ghost".into(), 10).await;
        assert!(matches!(err, Err(StorageError::UnknownUser { .. })));
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        tokio::fs::write(&path, "definitely not json").await.unwrap();

        let err = JsonUserStore::open(&path).await;
        assert!(matches!(err, Err(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn tolerates_records_without_optional_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        tokio::fs::write(&path, r#"{"users":{"ada":{"password_hash":"h"}}}"#)
            .await
            .unwrap();

        let store = JsonUserStore::open(&path).await.unwrap();
        let user = store.find_user("ada".into()).await.unwrap().unwrap();
        assert_eq!(user.score, 0);
    }
}
