use sqlx::PgPool;
use uuid::Uuid;

use crate::posts::repo_types::Post;

impl Post {
    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            WITH p AS (
                INSERT INTO posts (title, body, owner_id)
                VALUES ($1, $2, $3)
                RETURNING id, title, body, owner_id, created_at, updated_at
            )
            SELECT p.id, p.title, p.body, p.owner_id, u.username AS author,
                   p.created_at, p.updated_at
              FROM p
              JOIN users u ON u.id = p.owner_id
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(owner_id)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.body, p.owner_id, u.username AS author,
                   p.created_at, p.updated_at
              FROM posts p
              JOIN users u ON u.id = p.owner_id
             WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_all(db: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.title, p.body, p.owner_id, u.username AS author,
                   p.created_at, p.updated_at
              FROM posts p
              JOIN users u ON u.id = p.owner_id
             ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn owner_of(db: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(r#"SELECT owner_id FROM posts WHERE id = $1"#)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            WITH p AS (
                UPDATE posts
                   SET title = $2, body = $3, updated_at = now()
                 WHERE id = $1
                RETURNING id, title, body, owner_id, created_at, updated_at
            )
            SELECT p.id, p.title, p.body, p.owner_id, u.username AS author,
                   p.created_at, p.updated_at
              FROM p
              JOIN users u ON u.id = p.owner_id
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
