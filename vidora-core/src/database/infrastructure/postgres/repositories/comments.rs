use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::OWNER_JSON;
use crate::api_types::{Page, PageRequest};
use crate::database::ports::comments::CommentsRepository;
use crate::domain::{Comment, CommentView};
use crate::error::{CoreError, Result};

const COMMENT_COLUMNS: &str = "id, content, video_id, owner_id, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresCommentsRepository {
    pool: PgPool,
}

impl PostgresCommentsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CommentsRepository for PostgresCommentsRepository {
    async fn create_comment(&self, video: Uuid, owner: Uuid, content: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (id, video_id, owner_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(video)
        .bind(owner)
        .bind(content)
        .fetch_one(self.pool())
        .await?;
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(comment)
    }

    async fn video_comments(
        &self,
        video: Uuid,
        viewer: Uuid,
        page: &PageRequest,
    ) -> Result<Page<CommentView>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE video_id = $1")
            .bind(video)
            .fetch_one(self.pool())
            .await?;

        let items = sqlx::query_as::<_, CommentView>(&format!(
            r#"
            SELECT
                c.id, c.content, c.created_at, c.updated_at,
                {OWNER_JSON} AS owner,
                (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS likes_count,
                EXISTS (
                    SELECT 1 FROM likes l WHERE l.comment_id = c.id AND l.liked_by = $2
                ) AS is_liked
            FROM comments c
            JOIN users u ON u.id = c.owner_id
            WHERE c.video_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(video)
        .bind(viewer)
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool())
        .await?;

        Ok(Page::new(items, page, total as u64))
    }

    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::not_found("Comment not found"))
    }

    async fn delete_comment(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM likes WHERE comment_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(CoreError::not_found("Comment not found"));
        }
        tx.commit().await?;
        Ok(())
    }
}
