use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{MethodRouter, get, patch, post},
};

use vidora_core::api::routes::v1;

use crate::{
    AppState,
    auth::auth_middleware,
    handlers::{
        comments, dashboard, health, likes, playlists, subscriptions, tweets, users, videos,
    },
};

/// Route constants are absolute; this router is nested under [`v1::ROOT`].
fn rel(path: &'static str) -> &'static str {
    path.strip_prefix(v1::ROOT).unwrap_or(path)
}

/// Multipart routes get the upload body limit instead of the JSON one.
fn with_upload_limit(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    route.layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
}

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Public endpoints
        .route(rel(v1::HEALTHCHECK), get(health::healthcheck))
        .route(
            rel(v1::users::REGISTER),
            with_upload_limit(post(users::register), &state),
        )
        .route(rel(v1::users::LOGIN), post(users::login))
        .route(rel(v1::users::REFRESH_TOKEN), post(users::refresh_token))
        .merge(create_protected_routes(state))
}

/// Create protected routes that require authentication
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Account
        .route(rel(v1::users::LOGOUT), post(users::logout))
        .route(rel(v1::users::CHANGE_PASSWORD), post(users::change_password))
        .route(rel(v1::users::CURRENT_USER), get(users::current_user))
        .route(rel(v1::users::UPDATE_ACCOUNT), patch(users::update_account))
        .route(
            rel(v1::users::AVATAR),
            with_upload_limit(patch(users::update_avatar), &state),
        )
        .route(
            rel(v1::users::COVER_IMAGE),
            with_upload_limit(patch(users::update_cover_image), &state),
        )
        .route(rel(v1::users::CHANNEL), get(users::channel_profile))
        .route(rel(v1::users::HISTORY), get(users::watch_history))
        // Tweets
        .route(rel(v1::tweets::COLLECTION), post(tweets::create_tweet))
        .route(rel(v1::tweets::BY_USER), get(tweets::user_tweets))
        .route(
            rel(v1::tweets::ITEM),
            patch(tweets::update_tweet).delete(tweets::delete_tweet),
        )
        // Subscriptions
        .route(
            rel(v1::subscriptions::CHANNEL),
            post(subscriptions::toggle_channel_subscription)
                .get(subscriptions::channel_subscribers),
        )
        .route(
            rel(v1::subscriptions::SUBSCRIBER),
            get(subscriptions::subscribed_channels),
        )
        // Videos
        .route(
            rel(v1::videos::COLLECTION),
            get(videos::video_feed).merge(with_upload_limit(post(videos::publish_video), &state)),
        )
        .route(
            rel(v1::videos::ITEM),
            get(videos::video_detail)
                .delete(videos::delete_video)
                .merge(with_upload_limit(patch(videos::update_video), &state)),
        )
        .route(
            rel(v1::videos::TOGGLE_PUBLISH),
            patch(videos::toggle_publish),
        )
        // Comments
        .route(
            rel(v1::comments::BY_VIDEO),
            get(comments::video_comments).post(comments::add_comment),
        )
        .route(
            rel(v1::comments::ITEM),
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        // Likes
        .route(rel(v1::likes::TOGGLE_VIDEO), post(likes::toggle_video_like))
        .route(
            rel(v1::likes::TOGGLE_COMMENT),
            post(likes::toggle_comment_like),
        )
        .route(rel(v1::likes::TOGGLE_TWEET), post(likes::toggle_tweet_like))
        .route(rel(v1::likes::LIKED_VIDEOS), get(likes::liked_videos))
        // Playlists
        .route(
            rel(v1::playlist::COLLECTION),
            post(playlists::create_playlist),
        )
        .route(
            rel(v1::playlist::ITEM),
            get(playlists::playlist_detail)
                .patch(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route(rel(v1::playlist::ADD_VIDEO), patch(playlists::add_video))
        .route(
            rel(v1::playlist::REMOVE_VIDEO),
            patch(playlists::remove_video),
        )
        .route(rel(v1::playlist::BY_USER), get(playlists::user_playlists))
        // Dashboard
        .route(rel(v1::dashboard::STATS), get(dashboard::channel_stats))
        .route(rel(v1::dashboard::VIDEOS), get(dashboard::channel_videos))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
