use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::{auth::repo_types::User, posts::repo_types::Post};

/// In-process store with the same semantics as the Postgres schema
/// (unique username/email, owner must exist, cascading user delete).
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, StoredPost>,
    seq: u64,
}

struct StoredPost {
    id: Uuid,
    title: String,
    body: String,
    owner_id: Uuid,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    seq: u64,
}

impl Inner {
    fn project(&self, p: &StoredPost) -> Post {
        let author = self
            .users
            .get(&p.owner_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        Post {
            id: p.id,
            title: p.title.clone(),
            body: p.body.clone(),
            owner_id: p.owner_id,
            author,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn identity_taken(&self, username: &str, email: &str) -> StoreResult<bool> {
        Ok(self
            .lock()
            .users
            .values()
            .any(|u| u.username == username || u.email == email))
    }

    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let mut inner = self.lock();
        if inner
            .users
            .values()
            .any(|u| u.username == username || u.email == email)
        {
            return Err(StoreError::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.lock();
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        inner.posts.retain(|_, p| p.owner_id != id);
        Ok(true)
    }

    async fn create_post(&self, owner_id: Uuid, title: &str, body: &str) -> StoreResult<Post> {
        let mut inner = self.lock();
        if !inner.users.contains_key(&owner_id) {
            return Err(StoreError::UnknownOwner);
        }
        inner.seq += 1;
        let now = OffsetDateTime::now_utc();
        let stored = StoredPost {
            id: Uuid::new_v4(),
            title: title.to_string(),
            body: body.to_string(),
            owner_id,
            created_at: now,
            updated_at: now,
            seq: inner.seq,
        };
        let post = inner.project(&stored);
        inner.posts.insert(stored.id, stored);
        Ok(post)
    }

    async fn get_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let inner = self.lock();
        Ok(inner.posts.get(&id).map(|p| inner.project(p)))
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let inner = self.lock();
        let mut stored: Vec<&StoredPost> = inner.posts.values().collect();
        stored.sort_by(|a, b| (b.created_at, b.seq).cmp(&(a.created_at, a.seq)));
        Ok(stored.into_iter().map(|p| inner.project(p)).collect())
    }

    async fn post_owner(&self, id: Uuid) -> StoreResult<Option<Uuid>> {
        Ok(self.lock().posts.get(&id).map(|p| p.owner_id))
    }

    async fn update_post(&self, id: Uuid, title: &str, body: &str) -> StoreResult<Option<Post>> {
        let mut inner = self.lock();
        let Some(stored) = inner.posts.get_mut(&id) else {
            return Ok(None);
        };
        stored.title = title.to_string();
        stored.body = body.to_string();
        stored.updated_at = OffsetDateTime::now_utc();
        let inner = &*inner;
        Ok(inner.posts.get(&id).map(|p| inner.project(p)))
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.lock().posts.remove(&id).is_some())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn usernames_and_emails_are_unique() {
        let store = MemoryStore::new();
        store.create_user("alice", "alice@x.com", "h").await.unwrap();

        assert!(store.identity_taken("alice", "other@x.com").await.unwrap());
        assert!(store.identity_taken("other", "alice@x.com").await.unwrap());
        assert!(!store.identity_taken("bob", "bob@x.com").await.unwrap());
        assert!(matches!(
            store.create_user("alice", "new@x.com", "h").await,
            Err(StoreError::Duplicate)
        ));
    }

    #[tokio::test]
    async fn post_requires_existing_owner() {
        let store = MemoryStore::new();
        let err = store.create_post(Uuid::new_v4(), "t", "b").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownOwner));
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_posts() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "alice@x.com", "h").await.unwrap();
        let bob = store.create_user("bob", "bob@x.com", "h").await.unwrap();
        let a1 = store.create_post(alice.id, "a1", "b").await.unwrap();
        let a2 = store.create_post(alice.id, "a2", "b").await.unwrap();
        let b1 = store.create_post(bob.id, "b1", "b").await.unwrap();

        assert!(store.delete_user(alice.id).await.unwrap());
        assert!(store.get_post(a1.id).await.unwrap().is_none());
        assert!(store.get_post(a2.id).await.unwrap().is_none());
        assert!(store.get_post(b1.id).await.unwrap().is_some());
        assert!(!store.delete_user(alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn posts_list_newest_first_with_author() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "alice@x.com", "h").await.unwrap();
        store.create_post(alice.id, "first", "b").await.unwrap();
        store.create_post(alice.id, "second", "b").await.unwrap();

        let posts = store.list_posts().await.unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);
        assert!(posts.iter().all(|p| p.author == "alice"));
    }

    #[tokio::test]
    async fn update_keeps_owner_and_bumps_timestamp() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "alice@x.com", "h").await.unwrap();
        let post = store.create_post(alice.id, "t", "b").await.unwrap();

        let updated = store.update_post(post.id, "t2", "b2").await.unwrap().unwrap();
        assert_eq!(updated.owner_id, alice.id);
        assert_eq!(updated.body, "b2");
        assert!(updated.updated_at >= post.updated_at);
        assert!(store.update_post(Uuid::new_v4(), "t", "b").await.unwrap().is_none());
    }
}
