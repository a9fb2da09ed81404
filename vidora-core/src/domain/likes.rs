use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single entity a like points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub fn id(self) -> Uuid {
        match self {
            Self::Video(id) | Self::Comment(id) | Self::Tweet(id) => id,
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Comment(_) => "comment",
            Self::Tweet(_) => "tweet",
        }
    }

    /// `(video_id, comment_id, tweet_id)` with exactly one populated.
    pub fn columns(self) -> (Option<Uuid>, Option<Uuid>, Option<Uuid>) {
        match self {
            Self::Video(id) => (Some(id), None, None),
            Self::Comment(id) => (None, Some(id), None),
            Self::Tweet(id) => (None, None, Some(id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Like {
    pub id: Uuid,
    pub target: LikeTarget,
    pub liked_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub is_liked: bool,
}
