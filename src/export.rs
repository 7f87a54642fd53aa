//! Dumps every post as static JSON for a pre-rendered frontend.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::{posts::repo_types::Post, store::Store};

#[derive(Debug, Clone, Serialize)]
pub struct StaticPost {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Post> for StaticPost {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            title: p.title,
            body: p.body,
            author: p.author,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StaticPageData {
    pub posts: Vec<StaticPost>,
    #[serde(rename = "postsMap")]
    pub posts_map: BTreeMap<Uuid, StaticPost>,
}

/// Writes `data/posts.json` and one `data/post-<id>.json` per post under `out_dir`.
/// Returns how many posts were exported.
pub async fn export_site(store: &dyn Store, out_dir: &Path) -> anyhow::Result<usize> {
    let posts: Vec<StaticPost> = store
        .list_posts()
        .await
        .context("list posts")?
        .into_iter()
        .map(StaticPost::from)
        .collect();

    let data_dir = out_dir.join("data");
    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("create {}", data_dir.display()))?;

    for post in &posts {
        let path = data_dir.join(format!("post-{}.json", post.id));
        write_json(&path, post).await?;
    }

    let page = StaticPageData {
        posts_map: posts.iter().map(|p| (p.id, p.clone())).collect(),
        posts,
    };
    write_json(&data_dir.join("posts.json"), &page).await?;

    info!(count = page.posts.len(), dir = %out_dir.display(), "static export complete");
    Ok(page.posts.len())
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(value).context("serialize export")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn exports_index_and_one_file_per_post() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "alice@x.com", "h").await.unwrap();
        let first = store.create_post(alice.id, "first", "hello").await.unwrap();
        let second = store.create_post(alice.id, "second", "world").await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let count = export_site(&store, dir.path()).await.unwrap();
        assert_eq!(count, 2);

        let index: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("data/posts.json")).unwrap())
                .unwrap();
        assert_eq!(index["posts"][0]["title"], "second");
        assert_eq!(index["posts"][1]["title"], "first");
        assert_eq!(index["postsMap"][first.id.to_string()]["author"], "alice");

        let single: serde_json::Value = serde_json::from_slice(
            &std::fs::read(dir.path().join(format!("data/post-{}.json", second.id))).unwrap(),
        )
        .unwrap();
        assert_eq!(single["body"], "world");
        assert!(single.get("owner_id").is_none());
    }

    #[tokio::test]
    async fn empty_store_still_writes_index() {
        let dir = tempfile::tempdir().unwrap();
        let count = export_site(&MemoryStore::new(), dir.path()).await.unwrap();
        assert_eq!(count, 0);
        assert!(dir.path().join("data/posts.json").exists());
    }
}
