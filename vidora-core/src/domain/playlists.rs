use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OwnerSummary, VideoCard};

/// Playlist with its member video ids in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[sqlx(rename = "owner_id")]
    pub owner: Uuid,
    pub videos: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    pub fn contains(&self, video: Uuid) -> bool {
        self.videos.contains(&video)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub total_videos: i64,
    pub total_views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Playlist page: owner plus the published members only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: OwnerSummary,
    pub total_videos: i64,
    pub total_views: i64,
    pub videos: Vec<VideoCard>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaylistDetail {
    pub fn new(playlist: &Playlist, owner: OwnerSummary, videos: Vec<VideoCard>) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            owner,
            total_videos: videos.len() as i64,
            total_views: videos.iter().map(|v| v.views).sum(),
            videos,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        }
    }
}
