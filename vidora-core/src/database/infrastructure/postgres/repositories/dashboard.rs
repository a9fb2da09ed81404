use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::dashboard::DashboardRepository;
use crate::domain::{ChannelStats, ChannelVideo};
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresDashboardRepository {
    pool: PgPool,
}

impl PostgresDashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DashboardRepository for PostgresDashboardRepository {
    async fn channel_stats(&self, owner: Uuid) -> Result<ChannelStats> {
        let stats = sqlx::query_as::<_, ChannelStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1) AS total_subscribers,
                (SELECT COUNT(*) FROM videos WHERE owner_id = $1) AS total_videos,
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM videos WHERE owner_id = $1) AS total_views,
                (
                    SELECT COUNT(*) FROM likes l
                    JOIN videos v ON v.id = l.video_id
                    WHERE v.owner_id = $1
                ) AS total_likes
            "#,
        )
        .bind(owner)
        .fetch_one(self.pool())
        .await?;
        Ok(stats)
    }

    async fn channel_videos(&self, owner: Uuid) -> Result<Vec<ChannelVideo>> {
        let videos = sqlx::query_as::<_, ChannelVideo>(
            r#"
            SELECT
                v.id, v.title, v.description, v.video_file, v.thumbnail, v.duration,
                v.views, v.is_published, v.created_at, v.updated_at,
                (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS likes_count
            FROM videos v
            WHERE v.owner_id = $1
            ORDER BY v.created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;
        Ok(videos)
    }
}
