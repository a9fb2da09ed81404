use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Asset, OwnerSummary};
use crate::api_types::PageRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub video_file: String,
    #[serde(skip)]
    pub video_file_public_id: String,
    pub thumbnail: String,
    #[serde(skip)]
    pub thumbnail_public_id: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    #[sqlx(rename = "owner_id")]
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Unpublished videos exist only for their owner.
    pub fn visible_to(&self, viewer: Uuid) -> bool {
        self.is_published || self.owner == viewer
    }
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: Asset,
    pub thumbnail: Asset,
    pub duration: f64,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<Asset>,
}

impl VideoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.thumbnail.is_none()
    }
}

/// Feed / history / liked-videos card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(json)]
    pub owner: OwnerSummary,
}

/// Smallest video shape, used for "latest upload" previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoBrief {
    pub id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub video_file: String,
    pub duration: f64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOwner {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub subscribers_count: i64,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(json)]
    pub owner: ChannelOwner,
    pub likes_count: i64,
    pub is_liked: bool,
    pub comments_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoSortField {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSortField {
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "v.created_at",
            Self::Views => "v.views",
            Self::Duration => "v.duration",
            Self::Title => "v.title",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Published-feed filter: optional text search and owner, one sort key.
#[derive(Debug, Clone, Default)]
pub struct VideoFeedQuery {
    pub search: Option<String>,
    pub owner: Option<Uuid>,
    pub sort_by: VideoSortField,
    pub sort_direction: SortDirection,
    pub page: PageRequest,
}

impl VideoFeedQuery {
    /// Case-insensitive substring match over title and description.
    pub fn matches_text(&self, title: &str, description: &str) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                title.to_lowercase().contains(&needle)
                    || description.to_lowercase().contains(&needle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_parse_from_camel_case() {
        let field: VideoSortField = serde_json::from_str("\"createdAt\"").unwrap();
        assert_eq!(field, VideoSortField::CreatedAt);
        let dir: SortDirection = serde_json::from_str("\"asc\"").unwrap();
        assert_eq!(dir, SortDirection::Asc);
        assert!(serde_json::from_str::<VideoSortField>("\"owner\"").is_err());
    }

    #[test]
    fn text_search_is_case_insensitive() {
        let query = VideoFeedQuery {
            search: Some("RUST".into()),
            ..Default::default()
        };
        assert!(query.matches_text("Learning rust", ""));
        assert!(query.matches_text("", "all about Rust"));
        assert!(!query.matches_text("Go", "concurrency"));
        assert!(VideoFeedQuery::default().matches_text("anything", ""));
    }
}
