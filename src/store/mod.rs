//! Persistence seam shared by the Postgres store and the in-process store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{auth::repo_types::User, posts::repo_types::Post};

mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username or email already exists")]
    Duplicate,
    #[error("post owner does not exist")]
    UnknownOwner,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(e.to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate,
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => StoreError::UnknownOwner,
            _ => StoreError::Database(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// True when either the username or the email is already registered.
    async fn identity_taken(&self, username: &str, email: &str) -> StoreResult<bool>;
    async fn create_user(&self, username: &str, email: &str, password_hash: &str)
        -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    /// Removes the user together with every post it owns. `false` if no such user.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_post(&self, owner_id: Uuid, title: &str, body: &str) -> StoreResult<Post>;
    async fn get_post(&self, id: Uuid) -> StoreResult<Option<Post>>;
    /// Newest first.
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;
    async fn post_owner(&self, id: Uuid) -> StoreResult<Option<Uuid>>;
    async fn update_post(&self, id: Uuid, title: &str, body: &str) -> StoreResult<Option<Post>>;
    async fn delete_post(&self, id: Uuid) -> StoreResult<bool>;

    async fn close(&self);
}
