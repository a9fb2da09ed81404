pub mod comments;
pub mod dashboard;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

use uuid::Uuid;

use vidora_core::domain::{User, Video};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Mutations are reserved for the resource owner.
pub(crate) fn ensure_owner(owner: Uuid, user: &User, message: &str) -> AppResult<()> {
    if owner == user.id {
        Ok(())
    } else {
        Err(AppError::forbidden(message))
    }
}

/// A video the caller may see: published, or their own draft.
pub(crate) async fn visible_video(state: &AppState, id: Uuid, viewer: &User) -> AppResult<Video> {
    state
        .unit_of_work
        .videos
        .get_video(id)
        .await?
        .filter(|video| video.visible_to(viewer.id))
        .ok_or_else(|| AppError::not_found("Video not found"))
}

pub(crate) async fn existing_user(state: &AppState, id: Uuid) -> AppResult<User> {
    state
        .unit_of_work
        .users
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}
