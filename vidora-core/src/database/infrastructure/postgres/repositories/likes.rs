use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::VIDEO_CARD_COLUMNS;
use crate::database::ports::likes::LikesRepository;
use crate::domain::{Like, LikeTarget, VideoCard};
use crate::error::{CoreError, Result};

// Matches the row for one target; unused columns bind as NULL and the
// `IS NOT DISTINCT FROM` keeps NULL = NULL true.
const TARGET_FILTER: &str = "video_id IS NOT DISTINCT FROM $1 \
     AND comment_id IS NOT DISTINCT FROM $2 \
     AND tweet_id IS NOT DISTINCT FROM $3 \
     AND liked_by = $4";

#[derive(sqlx::FromRow)]
struct LikeRow {
    id: Uuid,
    video_id: Option<Uuid>,
    comment_id: Option<Uuid>,
    tweet_id: Option<Uuid>,
    liked_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<LikeRow> for Like {
    type Error = CoreError;

    fn try_from(row: LikeRow) -> Result<Self> {
        let target = match (row.video_id, row.comment_id, row.tweet_id) {
            (Some(id), None, None) => LikeTarget::Video(id),
            (None, Some(id), None) => LikeTarget::Comment(id),
            (None, None, Some(id)) => LikeTarget::Tweet(id),
            _ => {
                return Err(CoreError::Internal(format!(
                    "like {} does not have exactly one target",
                    row.id
                )));
            }
        };
        Ok(Like {
            id: row.id,
            target,
            liked_by: row.liked_by,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PostgresLikesRepository {
    pool: PgPool,
}

impl PostgresLikesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LikesRepository for PostgresLikesRepository {
    async fn find_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<Option<Like>> {
        let (video, comment, tweet) = target.columns();
        let row = sqlx::query_as::<_, LikeRow>(&format!(
            r#"
            SELECT id, video_id, comment_id, tweet_id, liked_by, created_at
            FROM likes
            WHERE {TARGET_FILTER}
            "#
        ))
        .bind(video)
        .bind(comment)
        .bind(tweet)
        .bind(liked_by)
        .fetch_optional(self.pool())
        .await?;

        row.map(Like::try_from).transpose()
    }

    async fn create_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<()> {
        let (video, comment, tweet) = target.columns();
        sqlx::query(
            r#"
            INSERT INTO likes (id, video_id, comment_id, tweet_id, liked_by)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(video)
        .bind(comment)
        .bind(tweet)
        .bind(liked_by)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<()> {
        let (video, comment, tweet) = target.columns();
        sqlx::query(&format!("DELETE FROM likes WHERE {TARGET_FILTER}"))
            .bind(video)
            .bind(comment)
            .bind(tweet)
            .bind(liked_by)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn liked_videos(&self, liked_by: Uuid) -> Result<Vec<VideoCard>> {
        let videos = sqlx::query_as::<_, VideoCard>(&format!(
            r#"
            SELECT {VIDEO_CARD_COLUMNS}
            FROM likes l
            JOIN videos v ON v.id = l.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE l.liked_by = $1 AND v.is_published
            ORDER BY l.created_at DESC
            "#
        ))
        .bind(liked_by)
        .fetch_all(self.pool())
        .await?;
        Ok(videos)
    }
}
