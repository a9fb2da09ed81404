use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::infrastructure::postgres::{
    PostgresCommentsRepository, PostgresDashboardRepository, PostgresLikesRepository,
    PostgresPlaylistsRepository, PostgresStore, PostgresSubscriptionsRepository,
    PostgresTweetsRepository, PostgresUsersRepository, PostgresVideosRepository,
};
use crate::database::ports::{
    comments::CommentsRepository, dashboard::DashboardRepository, health::HealthRepository,
    likes::LikesRepository, playlists::PlaylistsRepository,
    subscriptions::SubscriptionsRepository, tweets::TweetsRepository, users::UsersRepository,
    videos::VideosRepository,
};

/// Aggregates all repository ports used by the request handlers.
///
/// Carried in application state as an explicit value; tests swap the
/// Postgres adapters for the in-memory store via `AppUnitOfWork::in_memory`.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub users: Arc<dyn UsersRepository>,
    pub videos: Arc<dyn VideosRepository>,
    pub comments: Arc<dyn CommentsRepository>,
    pub likes: Arc<dyn LikesRepository>,
    pub subscriptions: Arc<dyn SubscriptionsRepository>,
    pub playlists: Arc<dyn PlaylistsRepository>,
    pub tweets: Arc<dyn TweetsRepository>,
    pub dashboard: Arc<dyn DashboardRepository>,
    pub health: Arc<dyn HealthRepository>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("users", &type_name_of_val(self.users.as_ref()))
            .field("videos", &type_name_of_val(self.videos.as_ref()))
            .field("comments", &type_name_of_val(self.comments.as_ref()))
            .field("likes", &type_name_of_val(self.likes.as_ref()))
            .field(
                "subscriptions",
                &type_name_of_val(self.subscriptions.as_ref()),
            )
            .field("playlists", &type_name_of_val(self.playlists.as_ref()))
            .field("tweets", &type_name_of_val(self.tweets.as_ref()))
            .field("dashboard", &type_name_of_val(self.dashboard.as_ref()))
            .field("health", &type_name_of_val(self.health.as_ref()))
            .finish()
    }
}

impl AppUnitOfWork {
    /// Every port backed by the same Postgres pool.
    pub fn from_postgres(store: &PostgresStore) -> Self {
        let pool = store.pool().clone();
        Self {
            users: Arc::new(PostgresUsersRepository::new(pool.clone())),
            videos: Arc::new(PostgresVideosRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentsRepository::new(pool.clone())),
            likes: Arc::new(PostgresLikesRepository::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionsRepository::new(pool.clone())),
            playlists: Arc::new(PostgresPlaylistsRepository::new(pool.clone())),
            tweets: Arc::new(PostgresTweetsRepository::new(pool.clone())),
            dashboard: Arc::new(PostgresDashboardRepository::new(pool)),
            health: Arc::new(store.clone()),
        }
    }

    /// Every port backed by one shared in-memory store.
    #[cfg(feature = "test-utils")]
    pub fn in_memory(store: &crate::database::memory::InMemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            videos: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            likes: Arc::new(store.clone()),
            subscriptions: Arc::new(store.clone()),
            playlists: Arc::new(store.clone()),
            tweets: Arc::new(store.clone()),
            dashboard: Arc::new(store.clone()),
            health: Arc::new(store.clone()),
        }
    }
}
