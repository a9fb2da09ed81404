use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::OWNER_JSON;
use crate::database::ports::tweets::TweetsRepository;
use crate::domain::{Tweet, TweetView};
use crate::error::{CoreError, Result};

const TWEET_COLUMNS: &str = "id, content, owner_id, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresTweetsRepository {
    pool: PgPool,
}

impl PostgresTweetsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TweetsRepository for PostgresTweetsRepository {
    async fn create_tweet(&self, owner: Uuid, content: &str) -> Result<Tweet> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            r#"
            INSERT INTO tweets (id, owner_id, content)
            VALUES ($1, $2, $3)
            RETURNING {TWEET_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(owner)
        .bind(content)
        .fetch_one(self.pool())
        .await?;
        Ok(tweet)
    }

    async fn get_tweet(&self, id: Uuid) -> Result<Option<Tweet>> {
        let tweet = sqlx::query_as::<_, Tweet>(&format!(
            "SELECT {TWEET_COLUMNS} FROM tweets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(tweet)
    }

    async fn user_tweets(&self, owner: Uuid, viewer: Uuid) -> Result<Vec<TweetView>> {
        let tweets = sqlx::query_as::<_, TweetView>(&format!(
            r#"
            SELECT
                t.id, t.content, t.created_at, t.updated_at,
                {OWNER_JSON} AS owner,
                (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS likes_count,
                EXISTS (
                    SELECT 1 FROM likes l WHERE l.tweet_id = t.id AND l.liked_by = $2
                ) AS is_liked
            FROM tweets t
            JOIN users u ON u.id = t.owner_id
            WHERE t.owner_id = $1
            ORDER BY t.created_at DESC, t.id DESC
            "#
        ))
        .bind(owner)
        .bind(viewer)
        .fetch_all(self.pool())
        .await?;
        Ok(tweets)
    }

    async fn update_tweet(&self, id: Uuid, content: &str) -> Result<Tweet> {
        sqlx::query_as::<_, Tweet>(&format!(
            r#"
            UPDATE tweets SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TWEET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(content)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::not_found("Tweet not found"))
    }

    async fn delete_tweet(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        sqlx::query("DELETE FROM likes WHERE tweet_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(CoreError::not_found("Tweet not found"));
        }
        tx.commit().await?;
        Ok(())
    }
}
