use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Like, LikeTarget, VideoCard};
use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikesRepository: Send + Sync {
    async fn find_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<Option<Like>>;
    /// A racing duplicate insert is ignored rather than reported.
    async fn create_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<()>;
    async fn delete_like(&self, target: LikeTarget, liked_by: Uuid) -> Result<()>;
    /// Published videos the user liked, most recent like first.
    async fn liked_videos(&self, liked_by: Uuid) -> Result<Vec<VideoCard>>;
}
