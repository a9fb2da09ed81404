use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::VideoBrief;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    #[sqlx(rename = "subscriber_id")]
    pub subscriber: Uuid,
    #[sqlx(rename = "channel_id")]
    pub channel: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub is_subscribed: bool,
}

/// One subscriber of a channel, with whether the channel follows back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberView {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub subscribers_count: i64,
    pub subscribed_to_subscriber: bool,
    pub subscribed_at: DateTime<Utc>,
}

/// A channel a user follows, with its newest published upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannel {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub subscribed_at: DateTime<Utc>,
    #[sqlx(json(nullable))]
    pub latest_video: Option<VideoBrief>,
}
