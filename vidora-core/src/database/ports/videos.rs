use async_trait::async_trait;
use uuid::Uuid;

use crate::api_types::Page;
use crate::domain::{NewVideo, Video, VideoCard, VideoChanges, VideoDetail, VideoFeedQuery};
use crate::error::Result;

#[async_trait]
pub trait VideosRepository: Send + Sync {
    async fn create_video(&self, video: NewVideo) -> Result<Video>;
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>>;
    async fn video_detail(&self, id: Uuid, viewer: Uuid) -> Result<Option<VideoDetail>>;

    /// Published videos only.
    async fn feed(&self, query: &VideoFeedQuery) -> Result<Page<VideoCard>>;

    async fn update_video(&self, id: Uuid, changes: VideoChanges) -> Result<Video>;
    async fn set_published(&self, id: Uuid, published: bool) -> Result<Video>;

    /// Removes the video together with its comments, the likes on it and on
    /// those comments, playlist memberships and watch-history entries.
    async fn delete_video(&self, id: Uuid) -> Result<()>;

    /// Bumps the view counter and moves the video to the front of the
    /// viewer's watch history.
    async fn record_view(&self, id: Uuid, viewer: Uuid) -> Result<()>;
}
