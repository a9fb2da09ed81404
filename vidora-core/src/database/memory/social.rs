use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{InMemoryStore, MemoryState};
use crate::api_types::{Page, PageRequest};
use crate::database::ports::{
    comments::CommentsRepository, likes::LikesRepository, playlists::PlaylistsRepository,
    subscriptions::SubscriptionsRepository, tweets::TweetsRepository,
};
use crate::domain::{
    Comment, CommentView, Like, LikeTarget, Playlist, PlaylistDetail, PlaylistSummary,
    SubscribedChannel, SubscriberView, Subscription, Tweet, TweetView, VideoBrief, VideoCard,
};
use crate::error::{CoreError, Result};

impl MemoryState {
    fn comment_mut(&mut self, id: Uuid) -> Result<&mut Comment> {
        self.comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::not_found("Comment not found"))
    }

    fn tweet_mut(&mut self, id: Uuid) -> Result<&mut Tweet> {
        self.tweets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("Tweet not found"))
    }

    fn playlist_mut(&mut self, id: Uuid) -> Result<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("Playlist not found"))
    }

    fn latest_published(&self, owner: Uuid) -> Option<VideoBrief> {
        self.videos
            .iter()
            .rev()
            .find(|v| v.owner == owner && v.is_published)
            .map(|v| VideoBrief {
                id: v.id,
                title: v.title.clone(),
                thumbnail: v.thumbnail.clone(),
                video_file: v.video_file.clone(),
                duration: v.duration,
                views: v.views,
                created_at: v.created_at,
            })
    }
}

#[async_trait]
impl CommentsRepository for InMemoryStore {
    async fn create_comment(&self, video: Uuid, owner: Uuid, content: &str) -> Result<Comment> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::now_v7(),
            content: content.to_string(),
            video,
            owner,
            created_at: now,
            updated_at: now,
        };
        self.state.write().comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self
            .state
            .read()
            .comments
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn video_comments(
        &self,
        video: Uuid,
        viewer: Uuid,
        page: &PageRequest,
    ) -> Result<Page<CommentView>> {
        let state = self.state.read();
        let views = state
            .comments
            .iter()
            .rev()
            .filter(|c| c.video == video)
            .map(|c| -> Result<CommentView> {
                let target = LikeTarget::Comment(c.id);
                Ok(CommentView {
                    id: c.id,
                    content: c.content.clone(),
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                    owner: state.owner_summary(c.owner)?,
                    likes_count: state.like_count(target),
                    is_liked: state.is_liked(target, viewer),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::from_slice(&views, page))
    }

    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Comment> {
        let mut state = self.state.write();
        let comment = state.comment_mut(id)?;
        comment.content = content.to_string();
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write();
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        if state.comments.len() == before {
            return Err(CoreError::not_found("Comment not found"));
        }
        state.remove_likes_on(LikeTarget::Comment(id));
        Ok(())
    }
}

#[async_trait]
impl LikesRepository for InMemoryStore {
    async fn find_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<Option<Like>> {
        Ok(self
            .state
            .read()
            .likes
            .iter()
            .find(|l| l.target == target && l.liked_by == liked_by)
            .cloned())
    }

    async fn create_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<()> {
        let mut state = self.state.write();
        if !state.is_liked(target, liked_by) {
            state.likes.push(Like {
                id: Uuid::now_v7(),
                target,
                liked_by,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn delete_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<()> {
        self.state
            .write()
            .likes
            .retain(|l| !(l.target == target && l.liked_by == liked_by));
        Ok(())
    }

    async fn liked_videos(&self, liked_by: Uuid) -> Result<Vec<VideoCard>> {
        let state = self.state.read();
        state
            .likes
            .iter()
            .rev()
            .filter(|l| l.liked_by == liked_by)
            .filter_map(|l| match l.target {
                LikeTarget::Video(id) => state.video(id),
                _ => None,
            })
            .filter(|v| v.is_published)
            .map(|v| state.video_card(v))
            .collect()
    }
}

#[async_trait]
impl SubscriptionsRepository for InMemoryStore {
    async fn find_subscription(&self, subscriber: Uuid, channel: Uuid) -> Result<Option<Subscription>> {
        Ok(self
            .state
            .read()
            .subscriptions
            .iter()
            .find(|s| s.subscriber == subscriber && s.channel == channel)
            .cloned())
    }

    async fn subscribe(&self, subscriber: Uuid, channel: Uuid) -> Result<()> {
        let mut state = self.state.write();
        if !state.is_subscribed(subscriber, channel) {
            state.subscriptions.push(Subscription {
                id: Uuid::now_v7(),
                subscriber,
                channel,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn unsubscribe(&self, subscriber: Uuid, channel: Uuid) -> Result<()> {
        self.state
            .write()
            .subscriptions
            .retain(|s| !(s.subscriber == subscriber && s.channel == channel));
        Ok(())
    }

    async fn channel_subscribers(&self, channel: Uuid) -> Result<Vec<SubscriberView>> {
        let state = self.state.read();
        state
            .subscriptions
            .iter()
            .rev()
            .filter(|s| s.channel == channel)
            .map(|s| -> Result<SubscriberView> {
                let summary = state.owner_summary(s.subscriber)?;
                Ok(SubscriberView {
                    id: summary.id,
                    username: summary.username,
                    full_name: summary.full_name,
                    avatar: summary.avatar,
                    subscribers_count: state.subscriber_count(s.subscriber),
                    subscribed_to_subscriber: state.is_subscribed(channel, s.subscriber),
                    subscribed_at: s.created_at,
                })
            })
            .collect()
    }

    async fn subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<SubscribedChannel>> {
        let state = self.state.read();
        state
            .subscriptions
            .iter()
            .rev()
            .filter(|s| s.subscriber == subscriber)
            .map(|s| -> Result<SubscribedChannel> {
                let summary = state.owner_summary(s.channel)?;
                Ok(SubscribedChannel {
                    id: summary.id,
                    username: summary.username,
                    full_name: summary.full_name,
                    avatar: summary.avatar,
                    subscribed_at: s.created_at,
                    latest_video: state.latest_published(s.channel),
                })
            })
            .collect()
    }
}

#[async_trait]
impl TweetsRepository for InMemoryStore {
    async fn create_tweet(&self, owner: Uuid, content: &str) -> Result<Tweet> {
        let now = Utc::now();
        let tweet = Tweet {
            id: Uuid::now_v7(),
            content: content.to_string(),
            owner,
            created_at: now,
            updated_at: now,
        };
        self.state.write().tweets.push(tweet.clone());
        Ok(tweet)
    }

    async fn get_tweet(&self, id: Uuid) -> Result<Option<Tweet>> {
        Ok(self
            .state
            .read()
            .tweets
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn user_tweets(&self, owner: Uuid, viewer: Uuid) -> Result<Vec<TweetView>> {
        let state = self.state.read();
        state
            .tweets
            .iter()
            .rev()
            .filter(|t| t.owner == owner)
            .map(|t| -> Result<TweetView> {
                let target = LikeTarget::Tweet(t.id);
                Ok(TweetView {
                    id: t.id,
                    content: t.content.clone(),
                    created_at: t.created_at,
                    updated_at: t.updated_at,
                    owner: state.owner_summary(t.owner)?,
                    likes_count: state.like_count(target),
                    is_liked: state.is_liked(target, viewer),
                })
            })
            .collect()
    }

    async fn update_tweet(&self, id: Uuid, content: &str) -> Result<Tweet> {
        let mut state = self.state.write();
        let tweet = state.tweet_mut(id)?;
        tweet.content = content.to_string();
        tweet.updated_at = Utc::now();
        Ok(tweet.clone())
    }

    async fn delete_tweet(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write();
        let before = state.tweets.len();
        state.tweets.retain(|t| t.id != id);
        if state.tweets.len() == before {
            return Err(CoreError::not_found("Tweet not found"));
        }
        state.remove_likes_on(LikeTarget::Tweet(id));
        Ok(())
    }
}

#[async_trait]
impl PlaylistsRepository for InMemoryStore {
    async fn create_playlist(&self, owner: Uuid, name: &str, description: &str) -> Result<Playlist> {
        let now = Utc::now();
        let playlist = Playlist {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: description.to_string(),
            owner,
            videos: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.state.write().playlists.push(playlist.clone());
        Ok(playlist)
    }

    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        Ok(self
            .state
            .read()
            .playlists
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn playlist_detail(&self, id: Uuid) -> Result<Option<PlaylistDetail>> {
        let state = self.state.read();
        let Some(playlist) = state.playlists.iter().find(|p| p.id == id) else {
            return Ok(None);
        };
        let videos = playlist
            .videos
            .iter()
            .filter_map(|v| state.video(*v))
            .filter(|v| v.is_published)
            .map(|v| state.video_card(v))
            .collect::<Result<Vec<_>>>()?;
        let owner = state.owner_summary(playlist.owner)?;
        Ok(Some(PlaylistDetail::new(playlist, owner, videos)))
    }

    async fn user_playlists(&self, owner: Uuid) -> Result<Vec<PlaylistSummary>> {
        let state = self.state.read();
        Ok(state
            .playlists
            .iter()
            .rev()
            .filter(|p| p.owner == owner)
            .map(|p| {
                let members: Vec<_> = p.videos.iter().filter_map(|v| state.video(*v)).collect();
                PlaylistSummary {
                    id: p.id,
                    name: p.name.clone(),
                    description: p.description.clone(),
                    total_videos: members.len() as i64,
                    total_views: members.iter().map(|v| v.views).sum(),
                    created_at: p.created_at,
                    updated_at: p.updated_at,
                }
            })
            .collect())
    }

    async fn update_playlist(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let mut state = self.state.write();
        let playlist = state.playlist_mut(id)?;
        if let Some(name) = name {
            playlist.name = name.to_string();
        }
        if let Some(description) = description {
            playlist.description = description.to_string();
        }
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.write();
        let before = state.playlists.len();
        state.playlists.retain(|p| p.id != id);
        if state.playlists.len() == before {
            return Err(CoreError::not_found("Playlist not found"));
        }
        Ok(())
    }

    async fn add_video(&self, id: Uuid, video: Uuid) -> Result<Playlist> {
        let mut state = self.state.write();
        let playlist = state.playlist_mut(id)?;
        if !playlist.contains(video) {
            playlist.videos.push(video);
        }
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }

    async fn remove_video(&self, id: Uuid, video: Uuid) -> Result<Playlist> {
        let mut state = self.state.write();
        let playlist = state.playlist_mut(id)?;
        playlist.videos.retain(|v| *v != video);
        playlist.updated_at = Utc::now();
        Ok(playlist.clone())
    }
}
