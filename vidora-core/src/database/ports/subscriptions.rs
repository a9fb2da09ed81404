use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{SubscribedChannel, SubscriberView, Subscription};
use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsRepository: Send + Sync {
    async fn find_subscription(&self, subscriber: Uuid, channel: Uuid) -> Result<Option<Subscription>>;
    /// A racing duplicate insert is ignored rather than reported.
    async fn subscribe(&self, subscriber: Uuid, channel: Uuid) -> Result<()>;
    async fn unsubscribe(&self, subscriber: Uuid, channel: Uuid) -> Result<()>;
    async fn channel_subscribers(&self, channel: Uuid) -> Result<Vec<SubscriberView>>;
    async fn subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<SubscribedChannel>>;
}
