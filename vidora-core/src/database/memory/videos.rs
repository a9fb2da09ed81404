use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{HistoryEntry, InMemoryStore};
use crate::api_types::Page;
use crate::database::ports::dashboard::DashboardRepository;
use crate::database::ports::videos::VideosRepository;
use crate::domain::{
    ChannelOwner, ChannelStats, ChannelVideo, LikeTarget, NewVideo, SortDirection, Video,
    VideoCard, VideoChanges, VideoDetail, VideoFeedQuery, VideoSortField,
};
use crate::error::{CoreError, Result};

#[async_trait]
impl VideosRepository for InMemoryStore {
    async fn create_video(&self, video: NewVideo) -> Result<Video> {
        let now = Utc::now();
        let created = Video {
            id: Uuid::now_v7(),
            video_file: video.video_file.url,
            video_file_public_id: video.video_file.public_id,
            thumbnail: video.thumbnail.url,
            thumbnail_public_id: video.thumbnail.public_id,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: 0,
            is_published: false,
            owner: video.owner,
            created_at: now,
            updated_at: now,
        };
        self.state.write().videos.push(created.clone());
        Ok(created)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.state.read().video(id).cloned())
    }

    async fn video_detail(&self, id: Uuid, viewer: Uuid) -> Result<Option<VideoDetail>> {
        let state = self.state.read();
        let Some(video) = state.video(id) else {
            return Ok(None);
        };
        let owner = state.owner_summary(video.owner)?;
        let target = LikeTarget::Video(video.id);
        Ok(Some(VideoDetail {
            id: video.id,
            title: video.title.clone(),
            description: video.description.clone(),
            video_file: video.video_file.clone(),
            thumbnail: video.thumbnail.clone(),
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            updated_at: video.updated_at,
            owner: ChannelOwner {
                id: owner.id,
                username: owner.username,
                full_name: owner.full_name,
                avatar: owner.avatar,
                subscribers_count: state.subscriber_count(video.owner),
                is_subscribed: state.is_subscribed(viewer, video.owner),
            },
            likes_count: state.like_count(target),
            is_liked: state.is_liked(target, viewer),
            comments_count: state.comments.iter().filter(|c| c.video == video.id).count() as i64,
        }))
    }

    async fn feed(&self, query: &VideoFeedQuery) -> Result<Page<VideoCard>> {
        let state = self.state.read();
        // Insertion order breaks ties between equal sort keys.
        let mut matching: Vec<(usize, &Video)> = state
            .videos
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_published)
            .filter(|(_, v)| query.owner.is_none_or(|owner| v.owner == owner))
            .filter(|(_, v)| query.matches_text(&v.title, &v.description))
            .collect();

        matching.sort_by(|(ia, a), (ib, b)| {
            let ordering = match query.sort_by {
                VideoSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                VideoSortField::Views => a.views.cmp(&b.views),
                VideoSortField::Duration => a.duration.total_cmp(&b.duration),
                VideoSortField::Title => a.title.cmp(&b.title),
            }
            .then_with(|| ia.cmp(ib));
            match query.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let cards = matching
            .into_iter()
            .map(|(_, v)| state.video_card(v))
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::from_slice(&cards, &query.page))
    }

    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> Result<Video> {
        let mut state = self.state.write();
        let video = state.video_mut(id)?;
        if let Some(title) = changes.title {
            video.title = title;
        }
        if let Some(description) = changes.description {
            video.description = description;
        }
        if let Some(thumbnail) = changes.thumbnail {
            video.thumbnail = thumbnail.url;
            video.thumbnail_public_id = thumbnail.public_id;
        }
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Video> {
        let mut state = self.state.write();
        let video = state.video_mut(id)?;
        video.is_published = published;
        video.updated_at = Utc::now();
        Ok(video.clone())
    }

    async fn delete_video(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write();
        let before = state.videos.len();
        state.videos.retain(|v| v.id != id);
        if state.videos.len() == before {
            return Err(CoreError::not_found("Video not found"));
        }

        let comment_ids: Vec<Uuid> = state
            .comments
            .iter()
            .filter(|c| c.video == id)
            .map(|c| c.id)
            .collect();
        for comment in &comment_ids {
            state.remove_likes_on(LikeTarget::Comment(*comment));
        }
        state.comments.retain(|c| c.video != id);
        state.remove_likes_on(LikeTarget::Video(id));
        for playlist in &mut state.playlists {
            playlist.videos.retain(|v| *v != id);
        }
        state.history.retain(|h| h.video != id);
        Ok(())
    }

    async fn record_view(&self, id: Uuid, viewer: Uuid) -> Result<()> {
        let mut state = self.state.write();
        state.video_mut(id)?.views += 1;
        state.history.retain(|h| !(h.user == viewer && h.video == id));
        state.history.push(HistoryEntry {
            user: viewer,
            video: id,
        });
        Ok(())
    }
}

#[async_trait]
impl DashboardRepository for InMemoryStore {
    async fn channel_stats(&self, owner: Uuid) -> Result<ChannelStats> {
        let state = self.state.read();
        let own: Vec<&Video> = state.videos.iter().filter(|v| v.owner == owner).collect();
        Ok(ChannelStats {
            total_subscribers: state.subscriber_count(owner),
            total_videos: own.len() as i64,
            total_views: own.iter().map(|v| v.views).sum(),
            total_likes: own
                .iter()
                .map(|v| state.like_count(LikeTarget::Video(v.id)))
                .sum(),
        })
    }

    async fn channel_videos(&self, owner: Uuid) -> Result<Vec<ChannelVideo>> {
        let state = self.state.read();
        Ok(state
            .videos
            .iter()
            .rev()
            .filter(|v| v.owner == owner)
            .map(|v| ChannelVideo {
                id: v.id,
                title: v.title.clone(),
                description: v.description.clone(),
                video_file: v.video_file.clone(),
                thumbnail: v.thumbnail.clone(),
                duration: v.duration,
                views: v.views,
                is_published: v.is_published,
                likes_count: state.like_count(LikeTarget::Video(v.id)),
                created_at: v.created_at,
                updated_at: v.updated_at,
            })
            .collect())
    }
}
