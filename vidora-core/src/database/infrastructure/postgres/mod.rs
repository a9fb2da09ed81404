//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::database::ports::health::HealthRepository;
use crate::error::Result;

pub use repositories::comments::PostgresCommentsRepository;
pub use repositories::dashboard::PostgresDashboardRepository;
pub use repositories::likes::PostgresLikesRepository;
pub use repositories::playlists::PostgresPlaylistsRepository;
pub use repositories::subscriptions::PostgresSubscriptionsRepository;
pub use repositories::tweets::PostgresTweetsRepository;
pub use repositories::users::PostgresUsersRepository;
pub use repositories::videos::PostgresVideosRepository;

/// Owns the connection pool every Postgres repository is built from.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!(max_connections, "connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| crate::CoreError::Internal(format!("Failed to run migrations: {}", e)))?;
        info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl HealthRepository for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
