//! In-memory implementation of every repository port.
//!
//! Collections are kept in insertion order, so "newest first" listings walk
//! them in reverse. Cascades mirror the foreign keys of the SQL schema.

mod social;
mod users;
mod videos;

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::database::ports::health::HealthRepository;
use crate::domain::{
    Comment, Like, LikeTarget, OwnerSummary, Playlist, Subscription, Tweet, User, Video, VideoCard,
};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct HistoryEntry {
    user: Uuid,
    video: Uuid,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: Vec<StoredUser>,
    videos: Vec<Video>,
    comments: Vec<Comment>,
    tweets: Vec<Tweet>,
    likes: Vec<Like>,
    subscriptions: Vec<Subscription>,
    playlists: Vec<Playlist>,
    // Oldest first; a re-watch moves the entry to the end.
    history: Vec<HistoryEntry>,
}

impl MemoryState {
    fn stored_user(&self, id: Uuid) -> Option<&StoredUser> {
        self.users.iter().find(|u| u.user.id == id)
    }

    fn stored_user_mut(&mut self, id: Uuid) -> Result<&mut StoredUser> {
        self.users
            .iter_mut()
            .find(|u| u.user.id == id)
            .ok_or_else(|| CoreError::not_found("User not found"))
    }

    fn owner_summary(&self, id: Uuid) -> Result<OwnerSummary> {
        self.stored_user(id)
            .map(|u| u.user.summary())
            .ok_or_else(|| CoreError::Internal(format!("dangling owner reference {id}")))
    }

    fn video(&self, id: Uuid) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == id)
    }

    fn video_mut(&mut self, id: Uuid) -> Result<&mut Video> {
        self.videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| CoreError::not_found("Video not found"))
    }

    fn video_card(&self, video: &Video) -> Result<VideoCard> {
        Ok(VideoCard {
            id: video.id,
            title: video.title.clone(),
            description: video.description.clone(),
            video_file: video.video_file.clone(),
            thumbnail: video.thumbnail.clone(),
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            owner: self.owner_summary(video.owner)?,
        })
    }

    fn subscriber_count(&self, channel: Uuid) -> i64 {
        self.subscriptions.iter().filter(|s| s.channel == channel).count() as i64
    }

    fn is_subscribed(&self, subscriber: Uuid, channel: Uuid) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.subscriber == subscriber && s.channel == channel)
    }

    fn like_count(&self, target: LikeTarget) -> i64 {
        self.likes.iter().filter(|l| l.target == target).count() as i64
    }

    fn is_liked(&self, target: LikeTarget, user: Uuid) -> bool {
        self.likes.iter().any(|l| l.target == target && l.liked_by == user)
    }

    fn remove_likes_on(&mut self, target: LikeTarget) -> usize {
        let before = self.likes.len();
        self.likes.retain(|l| l.target != target);
        before - self.likes.len()
    }
}

/// Shared handle; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of likes currently stored, across all target kinds.
    pub fn like_total(&self) -> usize {
        self.state.read().likes.len()
    }

    /// Number of comments currently stored.
    pub fn comment_total(&self) -> usize {
        self.state.read().comments.len()
    }

    /// Stored refresh token for a user, bypassing the port.
    pub fn refresh_token_of(&self, user: Uuid) -> Option<String> {
        self.state
            .read()
            .stored_user(user)
            .and_then(|u| u.refresh_token.clone())
    }
}

#[async_trait]
impl HealthRepository for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
