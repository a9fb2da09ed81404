//! Like toggles for videos, comments and tweets.
//!
//! Each toggle first proves the target exists (404 otherwise; comments on a
//! draft count as missing for everyone but its owner), then runs the
//! shared find-then-create-or-delete sequence. Applying a toggle twice leaves
//! the target as it started.

use axum::{
    Extension,
    extract::{Path, State},
};
use tracing::debug;

use vidora_core::{
    application::toggle_like,
    domain::{LikeStatus, LikeTarget, User, VideoCard},
};

use super::visible_video;
use crate::{
    extract::parse_id,
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
        response::Envelope,
    },
};

async fn toggle(state: &AppState, target: LikeTarget, user: &User) -> AppResult<Envelope<LikeStatus>> {
    let status = toggle_like(state.unit_of_work.likes.as_ref(), target, user.id).await?;
    debug!(
        kind = target.kind(),
        target = %target.id(),
        liked = status.is_liked,
        "like toggled"
    );
    let message = if status.is_liked {
        "Liked successfully"
    } else {
        "Unliked successfully"
    };
    Ok(Envelope::ok(status, message))
}

pub async fn toggle_video_like(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<String>,
) -> AppResult<Envelope<LikeStatus>> {
    let video = visible_video(&state, parse_id(&video_id, "video")?, &user).await?;
    toggle(&state, LikeTarget::Video(video.id), &user).await
}

pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(comment_id): Path<String>,
) -> AppResult<Envelope<LikeStatus>> {
    let comment = state
        .unit_of_work
        .comments
        .get_comment(parse_id(&comment_id, "comment")?)
        .await?
        .ok_or_else(|| AppError::not_found("Comment not found"))?;
    visible_video(&state, comment.video, &user).await?;
    toggle(&state, LikeTarget::Comment(comment.id), &user).await
}

pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(tweet_id): Path<String>,
) -> AppResult<Envelope<LikeStatus>> {
    let tweet = state
        .unit_of_work
        .tweets
        .get_tweet(parse_id(&tweet_id, "tweet")?)
        .await?
        .ok_or_else(|| AppError::not_found("Tweet not found"))?;
    toggle(&state, LikeTarget::Tweet(tweet.id), &user).await
}

pub async fn liked_videos(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Envelope<Vec<VideoCard>>> {
    let videos = state.unit_of_work.likes.liked_videos(user.id).await?;
    Ok(Envelope::ok(videos, "Liked videos fetched successfully"))
}
