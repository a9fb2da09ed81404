use axum::{
    Extension,
    extract::{Path, State},
};

use vidora_core::{
    application::toggle_subscription,
    domain::{SubscribedChannel, SubscriberView, SubscriptionStatus, User},
};

use super::existing_user;
use crate::{
    extract::parse_id,
    infra::{app_state::AppState, errors::AppResult, response::Envelope},
};

pub async fn toggle_channel_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(channel_id): Path<String>,
) -> AppResult<Envelope<SubscriptionStatus>> {
    let channel = existing_user(&state, parse_id(&channel_id, "channel")?).await?;
    let status = toggle_subscription(
        state.unit_of_work.subscriptions.as_ref(),
        user.id,
        channel.id,
    )
    .await?;

    let message = if status.is_subscribed {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };
    Ok(Envelope::ok(status, message))
}

/// Subscribers of a channel, each with their own subscriber count and
/// whether the channel follows them back.
pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> AppResult<Envelope<Vec<SubscriberView>>> {
    let channel = existing_user(&state, parse_id(&channel_id, "channel")?).await?;
    let subscribers = state
        .unit_of_work
        .subscriptions
        .channel_subscribers(channel.id)
        .await?;
    Ok(Envelope::ok(subscribers, "Subscribers fetched successfully"))
}

pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> AppResult<Envelope<Vec<SubscribedChannel>>> {
    let subscriber = existing_user(&state, parse_id(&subscriber_id, "subscriber")?).await?;
    let channels = state
        .unit_of_work
        .subscriptions
        .subscribed_channels(subscriber.id)
        .await?;
    Ok(Envelope::ok(channels, "Subscribed channels fetched successfully"))
}
