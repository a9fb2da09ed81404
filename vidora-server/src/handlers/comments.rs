use axum::{
    Extension,
    extract::{Path, State},
};
use serde::Deserialize;

use vidora_core::{
    api_types::{Empty, Page, PageRequest},
    domain::{Comment, CommentView, User},
};

use super::{ensure_owner, visible_video};
use crate::{
    extract::{JsonBody, QueryParams, parse_id, required},
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
        response::Envelope,
    },
};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: Option<String>,
}

/// Newest first, with like counts and the caller's `isLiked`.
pub async fn video_comments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<String>,
    QueryParams(page): QueryParams<PageRequest>,
) -> AppResult<Envelope<Page<CommentView>>> {
    let video = visible_video(&state, parse_id(&video_id, "video")?, &user).await?;
    let comments = state
        .unit_of_work
        .comments
        .video_comments(video.id, user.id, &page)
        .await?;
    Ok(Envelope::ok(comments, "Comments fetched successfully"))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<String>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> AppResult<Envelope<Comment>> {
    let content = required(request.content.as_deref(), "Content is required")?;
    let video = visible_video(&state, parse_id(&video_id, "video")?, &user).await?;
    let comment = state
        .unit_of_work
        .comments
        .create_comment(video.id, user.id, content)
        .await?;
    Ok(Envelope::created(comment, "Comment added successfully"))
}

async fn owned_comment(
    state: &AppState,
    raw_id: &str,
    user: &User,
    action: &str,
) -> AppResult<Comment> {
    let comment = state
        .unit_of_work
        .comments
        .get_comment(parse_id(raw_id, "comment")?)
        .await?
        .ok_or_else(|| AppError::not_found("Comment not found"))?;
    ensure_owner(
        comment.owner,
        user,
        &format!("You are not allowed to {action} this comment"),
    )?;
    Ok(comment)
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(comment_id): Path<String>,
    JsonBody(request): JsonBody<CommentRequest>,
) -> AppResult<Envelope<Comment>> {
    let comment = owned_comment(&state, &comment_id, &user, "update").await?;
    let content = required(request.content.as_deref(), "Content is required")?;
    let updated = state
        .unit_of_work
        .comments
        .update_comment(comment.id, content)
        .await?;
    Ok(Envelope::ok(updated, "Comment updated successfully"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(comment_id): Path<String>,
) -> AppResult<Envelope<Empty>> {
    let comment = owned_comment(&state, &comment_id, &user, "delete").await?;
    state.unit_of_work.comments.delete_comment(comment.id).await?;
    Ok(Envelope::ok(Empty {}, "Comment deleted successfully"))
}
