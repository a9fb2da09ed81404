//! Video publishing, the published feed and per-viewer detail.

use axum::{
    Extension,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::{info, warn};

use vidora_core::{
    api_types::{Empty, Page, PageRequest},
    domain::{
        NewVideo, SortDirection, User, Video, VideoCard, VideoChanges, VideoDetail,
        VideoFeedQuery, VideoSortField,
    },
};

use super::{ensure_owner, visible_video};
use crate::{
    extract::{QueryParams, non_blank, parse_id},
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
        response::Envelope,
    },
    media::{ResourceKind, UploadForm, upload_all},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<VideoSortField>,
    pub sort_type: Option<SortDirection>,
    pub user_id: Option<String>,
}

impl FeedParams {
    fn into_query(self) -> AppResult<VideoFeedQuery> {
        let owner = non_blank(self.user_id.as_deref())
            .map(|raw| parse_id(raw, "user"))
            .transpose()?;
        Ok(VideoFeedQuery {
            search: non_blank(self.query.as_deref()).map(str::to_string),
            owner,
            sort_by: self.sort_by.unwrap_or_default(),
            sort_direction: self.sort_type.unwrap_or_default(),
            page: PageRequest {
                page: self.page,
                limit: self.limit,
            },
        })
    }
}

/// Published videos, filtered by `query` and `userId`, sorted by `sortBy`
/// (`createdAt`, `views`, `duration`, `title`) in `sortType` order.
pub async fn video_feed(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<FeedParams>,
) -> AppResult<Envelope<Page<VideoCard>>> {
    let query = params.into_query()?;
    let page = state.unit_of_work.videos.feed(&query).await?;
    Ok(Envelope::ok(page, "Videos fetched successfully"))
}

/// Publish a video from `title`, `description`, `videoFile` and `thumbnail`.
/// New videos start unpublished.
pub async fn publish_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    mut form: UploadForm,
) -> AppResult<Envelope<Video>> {
    let (Some(title), Some(description)) = (form.text("title"), form.text("description")) else {
        return Err(AppError::bad_request("Title and description are required"));
    };
    let (title, description) = (title.to_string(), description.to_string());

    let video_file = form
        .take_file("videoFile")
        .ok_or_else(|| AppError::bad_request("Video file is required"))?;
    let thumbnail = form
        .take_file("thumbnail")
        .ok_or_else(|| AppError::bad_request("Thumbnail is required"))?;

    let uploaded = upload_all(
        state.media.as_ref(),
        vec![(video_file, ResourceKind::Video), (thumbnail, ResourceKind::Image)],
    )
    .await
    .ok_or_else(|| AppError::internal("Failed to upload video"))?;
    let [video_asset, thumbnail_asset] = <[_; 2]>::try_from(uploaded)
        .map_err(|_| AppError::internal("Upload batch came back incomplete"))?;

    let new_video = NewVideo {
        owner: user.id,
        title,
        description,
        video_file: video_asset.asset(),
        thumbnail: thumbnail_asset.asset(),
        duration: video_asset.duration.unwrap_or_default(),
    };
    let video = match state.unit_of_work.videos.create_video(new_video).await {
        Ok(video) => video,
        Err(err) => {
            state
                .media
                .delete(&video_asset.public_id, ResourceKind::Video)
                .await;
            state
                .media
                .delete(&thumbnail_asset.public_id, ResourceKind::Image)
                .await;
            return Err(err.into());
        }
    };

    info!(video_id = %video.id, owner = %user.id, "video uploaded");
    Ok(Envelope::created(video, "Video uploaded successfully"))
}

/// Counts a view, moves the video to the front of the caller's history and
/// returns the detail projection. Drafts are 404 for everyone but the owner.
pub async fn video_detail(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<String>,
) -> AppResult<Envelope<VideoDetail>> {
    let video = visible_video(&state, parse_id(&video_id, "video")?, &user).await?;

    let videos = &state.unit_of_work.videos;
    videos.record_view(video.id, user.id).await?;
    let detail = videos
        .video_detail(video.id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Video not found"))?;
    Ok(Envelope::ok(detail, "Video fetched successfully"))
}

async fn owned_video(state: &AppState, raw_id: &str, user: &User, action: &str) -> AppResult<Video> {
    let video = visible_video(state, parse_id(raw_id, "video")?, user).await?;
    ensure_owner(
        video.owner,
        user,
        &format!("You are not allowed to {action} this video"),
    )?;
    Ok(video)
}

/// Update `title`, `description` and/or `thumbnail`; a replaced thumbnail
/// is deleted from the media host afterwards.
pub async fn update_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<String>,
    mut form: UploadForm,
) -> AppResult<Envelope<Video>> {
    let video = owned_video(&state, &video_id, &user, "update").await?;

    let mut changes = VideoChanges {
        title: form.text("title").map(str::to_string),
        description: form.text("description").map(str::to_string),
        thumbnail: None,
    };
    if let Some(file) = form.take_file("thumbnail") {
        let uploaded = state
            .media
            .upload(file, ResourceKind::Image)
            .await
            .ok_or_else(|| AppError::internal("Failed to upload thumbnail"))?;
        changes.thumbnail = Some(uploaded.asset());
    }
    if changes.is_empty() {
        return Err(AppError::bad_request("At least one field is required"));
    }

    let new_thumbnail = changes.thumbnail.clone();
    let updated = match state.unit_of_work.videos.update_video(video.id, changes).await {
        Ok(updated) => updated,
        Err(err) => {
            if let Some(asset) = new_thumbnail {
                state.media.delete(&asset.public_id, ResourceKind::Image).await;
            }
            return Err(err.into());
        }
    };

    if new_thumbnail.is_some() {
        state
            .media
            .delete(&video.thumbnail_public_id, ResourceKind::Image)
            .await;
    }
    Ok(Envelope::ok(updated, "Video updated successfully"))
}

/// Deletes the video with its comments, likes, playlist entries and
/// history entries, then both media assets.
pub async fn delete_video(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<String>,
) -> AppResult<Envelope<Empty>> {
    let video = owned_video(&state, &video_id, &user, "delete").await?;
    state.unit_of_work.videos.delete_video(video.id).await?;

    state
        .media
        .delete(&video.video_file_public_id, ResourceKind::Video)
        .await;
    state
        .media
        .delete(&video.thumbnail_public_id, ResourceKind::Image)
        .await;

    info!(video_id = %video.id, "video deleted");
    Ok(Envelope::ok(Empty {}, "Video deleted successfully"))
}

pub async fn toggle_publish(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(video_id): Path<String>,
) -> AppResult<Envelope<Video>> {
    let video = owned_video(&state, &video_id, &user, "publish").await?;
    let updated = state
        .unit_of_work
        .videos
        .set_published(video.id, !video.is_published)
        .await?;
    if updated.is_published == video.is_published {
        warn!(video_id = %video.id, "publish flag did not change");
    }
    Ok(Envelope::ok(updated, "Publish status toggled successfully"))
}
