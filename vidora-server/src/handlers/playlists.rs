use axum::{
    Extension,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::info;

use vidora_core::{
    api_types::Empty,
    domain::{Playlist, PlaylistDetail, PlaylistSummary, User},
};

use super::{ensure_owner, existing_user, visible_video};
use crate::{
    extract::{JsonBody, non_blank, parse_id, required},
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
        response::Envelope,
    },
};

#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    JsonBody(request): JsonBody<PlaylistRequest>,
) -> AppResult<Envelope<Playlist>> {
    let name = required(request.name.as_deref(), "Playlist name is required")?;
    let description = non_blank(request.description.as_deref()).unwrap_or_default();
    let playlist = state
        .unit_of_work
        .playlists
        .create_playlist(user.id, name, description)
        .await?;
    info!(playlist_id = %playlist.id, owner = %user.id, "playlist created");
    Ok(Envelope::created(playlist, "Playlist created successfully"))
}

/// Owner summary plus the published members in insertion order.
pub async fn playlist_detail(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> AppResult<Envelope<PlaylistDetail>> {
    let detail = state
        .unit_of_work
        .playlists
        .playlist_detail(parse_id(&playlist_id, "playlist")?)
        .await?
        .ok_or_else(|| AppError::not_found("Playlist not found"))?;
    Ok(Envelope::ok(detail, "Playlist fetched successfully"))
}

pub async fn user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Envelope<Vec<PlaylistSummary>>> {
    let owner = existing_user(&state, parse_id(&user_id, "user")?).await?;
    let playlists = state.unit_of_work.playlists.user_playlists(owner.id).await?;
    Ok(Envelope::ok(playlists, "Playlists fetched successfully"))
}

async fn owned_playlist(
    state: &AppState,
    raw_id: &str,
    user: &User,
    action: &str,
) -> AppResult<Playlist> {
    let playlist = state
        .unit_of_work
        .playlists
        .get_playlist(parse_id(raw_id, "playlist")?)
        .await?
        .ok_or_else(|| AppError::not_found("Playlist not found"))?;
    ensure_owner(
        playlist.owner,
        user,
        &format!("You are not allowed to {action} this playlist"),
    )?;
    Ok(playlist)
}

pub async fn update_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(playlist_id): Path<String>,
    JsonBody(request): JsonBody<PlaylistRequest>,
) -> AppResult<Envelope<Playlist>> {
    let playlist = owned_playlist(&state, &playlist_id, &user, "update").await?;
    let name = non_blank(request.name.as_deref());
    let description = non_blank(request.description.as_deref());
    if name.is_none() && description.is_none() {
        return Err(AppError::bad_request("Name or description is required"));
    }

    let updated = state
        .unit_of_work
        .playlists
        .update_playlist(playlist.id, name, description)
        .await?;
    Ok(Envelope::ok(updated, "Playlist updated successfully"))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(playlist_id): Path<String>,
) -> AppResult<Envelope<Empty>> {
    let playlist = owned_playlist(&state, &playlist_id, &user, "delete").await?;
    state.unit_of_work.playlists.delete_playlist(playlist.id).await?;
    Ok(Envelope::ok(Empty {}, "Playlist deleted successfully"))
}

pub async fn add_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> AppResult<Envelope<Playlist>> {
    let video_id = parse_id(&video_id, "video")?;
    let playlist = owned_playlist(&state, &playlist_id, &user, "modify").await?;
    let video = visible_video(&state, video_id, &user).await?;

    let updated = state
        .unit_of_work
        .playlists
        .add_video(playlist.id, video.id)
        .await?;
    Ok(Envelope::ok(updated, "Video added to playlist"))
}

pub async fn remove_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> AppResult<Envelope<Playlist>> {
    let video_id = parse_id(&video_id, "video")?;
    let playlist = owned_playlist(&state, &playlist_id, &user, "modify").await?;
    if !playlist.contains(video_id) {
        return Err(AppError::not_found("Video is not in this playlist"));
    }

    let updated = state
        .unit_of_work
        .playlists
        .remove_video(playlist.id, video_id)
        .await?;
    Ok(Envelope::ok(updated, "Video removed from playlist"))
}
