use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use super::VIDEO_CARD_COLUMNS;
use crate::api_types::Page;
use crate::database::ports::videos::VideosRepository;
use crate::domain::{NewVideo, Video, VideoCard, VideoChanges, VideoDetail, VideoFeedQuery};
use crate::error::{CoreError, Result};

const VIDEO_COLUMNS: &str = "id, video_file, video_file_public_id, thumbnail, thumbnail_public_id, \
     title, description, duration, views, is_published, owner_id, created_at, updated_at";

const FEED_FILTER: &str = r#"
    v.is_published
    AND ($1::uuid IS NULL OR v.owner_id = $1)
    AND (
        $2::text IS NULL
        OR strpos(lower(v.title), lower($2)) > 0
        OR strpos(lower(v.description), lower($2)) > 0
    )
"#;

#[derive(Clone, Debug)]
pub struct PostgresVideosRepository {
    pool: PgPool,
}

impl PostgresVideosRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VideosRepository for PostgresVideosRepository {
    async fn create_video(&self, video: NewVideo) -> Result<Video> {
        let created = sqlx::query_as::<_, Video>(&format!(
            r#"
            INSERT INTO videos (
                id, owner_id, title, description, video_file, video_file_public_id,
                thumbnail, thumbnail_public_id, duration, views, is_published
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, FALSE)
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(video.owner)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_file.url)
        .bind(&video.video_file.public_id)
        .bind(&video.thumbnail.url)
        .bind(&video.thumbnail.public_id)
        .bind(video.duration)
        .fetch_one(self.pool())
        .await?;

        info!(video_id = %created.id, owner = %created.owner, "created video");
        Ok(created)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(video)
    }

    async fn video_detail(&self, id: Uuid, viewer: Uuid) -> Result<Option<VideoDetail>> {
        let detail = sqlx::query_as::<_, VideoDetail>(
            r#"
            SELECT
                v.id, v.title, v.description, v.video_file, v.thumbnail, v.duration,
                v.views, v.is_published, v.created_at, v.updated_at,
                json_build_object(
                    'id', u.id,
                    'username', u.username,
                    'fullName', u.full_name,
                    'avatar', u.avatar,
                    'subscribersCount',
                        (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id),
                    'isSubscribed', EXISTS (
                        SELECT 1 FROM subscriptions s
                        WHERE s.channel_id = u.id AND s.subscriber_id = $2
                    )
                ) AS owner,
                (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS likes_count,
                EXISTS (
                    SELECT 1 FROM likes l WHERE l.video_id = v.id AND l.liked_by = $2
                ) AS is_liked,
                (SELECT COUNT(*) FROM comments c WHERE c.video_id = v.id) AS comments_count
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE v.id = $1
            "#,
        )
        .bind(id)
        .bind(viewer)
        .fetch_optional(self.pool())
        .await?;
        Ok(detail)
    }

    async fn feed(&self, query: &VideoFeedQuery) -> Result<Page<VideoCard>> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let direction = query.sort_direction.keyword();

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM videos v WHERE {FEED_FILTER}"
        ))
        .bind(query.owner)
        .bind(search)
        .fetch_one(self.pool())
        .await?;

        let items = sqlx::query_as::<_, VideoCard>(&format!(
            r#"
            SELECT {VIDEO_CARD_COLUMNS}
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE {FEED_FILTER}
            ORDER BY {column} {direction}, v.id {direction}
            LIMIT $3 OFFSET $4
            "#,
            column = query.sort_by.column(),
        ))
        .bind(query.owner)
        .bind(search)
        .bind(i64::from(query.page.limit()))
        .bind(query.page.offset() as i64)
        .fetch_all(self.pool())
        .await?;

        debug!(total, returned = items.len(), "video feed page");
        Ok(Page::new(items, &query.page, total as u64))
    }

    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> Result<Video> {
        let (thumbnail_url, thumbnail_public_id) = match &changes.thumbnail {
            Some(asset) => (Some(asset.url.as_str()), Some(asset.public_id.as_str())),
            None => (None, None),
        };

        sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail = COALESCE($4, thumbnail),
                thumbnail_public_id = COALESCE($5, thumbnail_public_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(thumbnail_url)
        .bind(thumbnail_public_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::not_found("Video not found"))
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Video> {
        sqlx::query_as::<_, Video>(&format!(
            r#"
            UPDATE videos
            SET is_published = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(published)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::not_found("Video not found"))
    }

    async fn delete_video(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        let comment_likes = sqlx::query(
            "DELETE FROM likes WHERE comment_id IN (SELECT id FROM comments WHERE video_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let comments = sqlx::query("DELETE FROM comments WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let video_likes = sqlx::query("DELETE FROM likes WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM playlist_videos WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM watch_history WHERE video_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(CoreError::not_found("Video not found"));
        }
        tx.commit().await?;

        info!(video_id = %id, comments, video_likes, comment_likes, "deleted video");
        Ok(())
    }

    async fn record_view(&self, id: Uuid, viewer: Uuid) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("UPDATE videos SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id, watched_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, video_id) DO UPDATE SET watched_at = EXCLUDED.watched_at
            "#,
        )
        .bind(viewer)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
