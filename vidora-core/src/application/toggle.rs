//! Toggle-reaction primitive shared by likes and subscriptions.
//!
//! Look up the reaction for `(target, actor)`; delete it when present,
//! create it otherwise. The check and the write are separate statements, so
//! two concurrent toggles by the same actor can both observe the same state.
//! The store's unique index plus an ignore-on-conflict insert keeps such a
//! race from failing; the final state is whichever write lands last.

use tracing::debug;
use uuid::Uuid;

use crate::database::ports::likes::LikesRepository;
use crate::database::ports::subscriptions::SubscriptionsRepository;
use crate::domain::{LikeStatus, LikeTarget, SubscriptionStatus};
use crate::error::{CoreError, Result};

pub async fn toggle_like(
    likes: &dyn LikesRepository,
    target: LikeTarget,
    actor: Uuid,
) -> Result<LikeStatus> {
    let is_liked = if likes.find_like(target, actor).await?.is_some() {
        likes.delete_like(target, actor).await?;
        false
    } else {
        likes.create_like(target, actor).await?;
        true
    };
    debug!(kind = target.kind(), target = %target.id(), %actor, is_liked, "toggled like");
    Ok(LikeStatus { is_liked })
}

/// Rejects subscribing to oneself with `InvalidInput`.
pub async fn toggle_subscription(
    subscriptions: &dyn SubscriptionsRepository,
    subscriber: Uuid,
    channel: Uuid,
) -> Result<SubscriptionStatus> {
    if subscriber == channel {
        return Err(CoreError::invalid("You cannot subscribe to your own channel"));
    }
    let is_subscribed = if subscriptions
        .find_subscription(subscriber, channel)
        .await?
        .is_some()
    {
        subscriptions.unsubscribe(subscriber, channel).await?;
        false
    } else {
        subscriptions.subscribe(subscriber, channel).await?;
        true
    };
    debug!(%subscriber, %channel, is_subscribed, "toggled subscription");
    Ok(SubscriptionStatus { is_subscribed })
}
