//! PostgreSQL-backed repository implementations.

pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

/// `OwnerSummary` of the row aliased `u`, as JSON.
pub(crate) const OWNER_JSON: &str = "json_build_object('id', u.id, 'username', u.username, \
     'fullName', u.full_name, 'avatar', u.avatar)";

/// Columns of a `VideoCard` over `videos v JOIN users u ON u.id = v.owner_id`.
pub(crate) const VIDEO_CARD_COLUMNS: &str = "v.id, v.title, v.description, v.video_file, \
     v.thumbnail, v.duration, v.views, v.is_published, v.created_at, \
     json_build_object('id', u.id, 'username', u.username, 'fullName', u.full_name, \
     'avatar', u.avatar) AS owner";

/// Name of the unique constraint a failed statement tripped, if any.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if db_err.is_unique_violation() {
        Some(db_err.constraint().unwrap_or_default().to_string())
    } else {
        None
    }
}
