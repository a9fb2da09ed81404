use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ChannelStats, ChannelVideo};
use crate::error::Result;

// Creator-facing aggregates
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn channel_stats(&self, owner: Uuid) -> Result<ChannelStats>;
    async fn channel_videos(&self, owner: Uuid) -> Result<Vec<ChannelVideo>>;
}
