use axum::{Extension, extract::State};

use vidora_core::domain::{ChannelStats, ChannelVideo, User};

use crate::infra::{app_state::AppState, errors::AppResult, response::Envelope};

/// Totals for the caller's channel: subscribers, videos, views and likes
/// received on videos.
pub async fn channel_stats(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Envelope<ChannelStats>> {
    let stats = state.unit_of_work.dashboard.channel_stats(user.id).await?;
    Ok(Envelope::ok(stats, "Channel stats fetched successfully"))
}

/// Every video the caller owns, drafts included.
pub async fn channel_videos(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Envelope<Vec<ChannelVideo>>> {
    let videos = state.unit_of_work.dashboard.channel_videos(user.id).await?;
    Ok(Envelope::ok(videos, "Channel videos fetched successfully"))
}
