//! Repository ports (interfaces) grouped by resource.
//!
//! Handlers depend only on these traits. Implementations live in the
//! Postgres adapter under `database::infrastructure::postgres` and, for
//! tests, in `database::memory`.

pub mod comments;
pub mod dashboard;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;
