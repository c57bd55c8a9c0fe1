pub mod json;
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::models::UserEntity;
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for player accounts and scores.
///
/// Implementations must make `add_score` an atomic read-modify-write so
/// game sessions finishing concurrently never lose each other's updates.
pub trait UserStore: Send + Sync {
    fn create_user(
        &self,
        username: String,
        password_hash: String,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn find_user(&self, username: String) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    fn add_score(&self, username: String, delta: i64) -> BoxFuture<'static, StorageResult<i64>>;
    fn list_scores(&self) -> BoxFuture<'static, StorageResult<Vec<(String, i64)>>>;
}
