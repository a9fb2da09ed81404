use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::subscriptions::SubscriptionsRepository;
use crate::domain::{SubscribedChannel, SubscriberView, Subscription};
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct PostgresSubscriptionsRepository {
    pool: PgPool,
}

impl PostgresSubscriptionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SubscriptionsRepository for PostgresSubscriptionsRepository {
    async fn find_subscription(&self, subscriber: Uuid, channel: Uuid) -> Result<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, subscriber_id, channel_id, created_at
            FROM subscriptions
            WHERE subscriber_id = $1 AND channel_id = $2
            "#,
        )
        .bind(subscriber)
        .bind(channel)
        .fetch_optional(self.pool())
        .await?;
        Ok(subscription)
    }

    async fn subscribe(&self, subscriber: Uuid, channel: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, subscriber_id, channel_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (subscriber_id, channel_id) DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(subscriber)
        .bind(channel)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn unsubscribe(&self, subscriber: Uuid, channel: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
            .bind(subscriber)
            .bind(channel)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn channel_subscribers(&self, channel: Uuid) -> Result<Vec<SubscriberView>> {
        let subscribers = sqlx::query_as::<_, SubscriberView>(
            r#"
            SELECT
                u.id, u.username, u.full_name, u.avatar,
                (SELECT COUNT(*) FROM subscriptions s2 WHERE s2.channel_id = u.id) AS subscribers_count,
                EXISTS (
                    SELECT 1 FROM subscriptions back
                    WHERE back.channel_id = u.id AND back.subscriber_id = $1
                ) AS subscribed_to_subscriber,
                s.created_at AS subscribed_at
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(channel)
        .fetch_all(self.pool())
        .await?;
        Ok(subscribers)
    }

    async fn subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<SubscribedChannel>> {
        let channels = sqlx::query_as::<_, SubscribedChannel>(
            r#"
            SELECT
                u.id, u.username, u.full_name, u.avatar,
                s.created_at AS subscribed_at,
                (
                    SELECT json_build_object(
                        'id', v.id,
                        'title', v.title,
                        'thumbnail', v.thumbnail,
                        'videoFile', v.video_file,
                        'duration', v.duration,
                        'views', v.views,
                        'createdAt', v.created_at
                    )
                    FROM videos v
                    WHERE v.owner_id = u.id AND v.is_published
                    ORDER BY v.created_at DESC
                    LIMIT 1
                ) AS latest_video
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(subscriber)
        .fetch_all(self.pool())
        .await?;
        Ok(channels)
    }
}
