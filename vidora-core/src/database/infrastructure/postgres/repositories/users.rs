use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{VIDEO_CARD_COLUMNS, unique_violation};
use crate::database::ports::users::UsersRepository;
use crate::domain::users::normalize_handle;
use crate::domain::{Asset, ChannelProfile, NewUser, User, VideoCard};
use crate::error::{CoreError, Result};

const USER_COLUMNS: &str = "id, username, email, full_name, avatar, avatar_public_id, \
     cover_image, cover_image_public_id, created_at, updated_at";

/// PostgreSQL-backed implementation of the `UsersRepository` port.
#[derive(Clone, Debug)]
pub struct PostgresUsersRepository {
    pool: PgPool,
}

impl PostgresUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_user_conflict(err: sqlx::Error) -> CoreError {
    match unique_violation(&err).as_deref() {
        Some("users_username_key") => {
            CoreError::conflict("User with this username already exists")
        }
        Some("users_email_key") => CoreError::conflict("User with this email already exists"),
        Some(_) => CoreError::conflict("User with email or username already exists"),
        None => CoreError::Database(err),
    }
}

#[async_trait]
impl UsersRepository for PostgresUsersRepository {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let (cover_url, cover_public_id) = match &user.cover_image {
            Some(asset) => (Some(asset.url.as_str()), Some(asset.public_id.as_str())),
            None => (None, None),
        };

        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (
                id, username, email, full_name, avatar, avatar_public_id,
                cover_image, cover_image_public_id, password_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar.url)
        .bind(&user.avatar.public_id)
        .bind(cover_url)
        .bind(cover_public_id)
        .bind(&user.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(map_user_conflict)?;

        info!(user_id = %created.id, username = %created.username, "created user");
        Ok(created)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(normalize_handle(username))
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(normalize_handle(email))
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn update_account(
        &self,
        id: Uuid,
        email: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                full_name = COALESCE($3, full_name),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(email.map(normalize_handle))
        .bind(full_name.map(str::trim))
        .fetch_optional(self.pool())
        .await
        .map_err(map_user_conflict)?
        .ok_or_else(|| CoreError::not_found("User not found"))
    }

    async fn update_avatar(&self, id: Uuid, avatar: &Asset) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET avatar = $2, avatar_public_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&avatar.url)
        .bind(&avatar.public_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::not_found("User not found"))
    }

    async fn update_cover_image(&self, id: Uuid, cover_image: &Asset) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET cover_image = $2, cover_image_public_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&cover_image.url)
        .bind(&cover_image.public_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::not_found("User not found"))
    }

    async fn get_password_hash(&self, id: Uuid) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(hash)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, refresh_token = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("User not found"));
        }
        info!(user_id = %id, "password updated");
        Ok(())
    }

    async fn get_refresh_token(&self, id: Uuid) -> Result<Option<String>> {
        let token = sqlx::query_scalar::<_, Option<String>>(
            "SELECT refresh_token FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(token.flatten())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn channel_profile(&self, username: &str, viewer: Uuid) -> Result<Option<ChannelProfile>> {
        let profile = sqlx::query_as::<_, ChannelProfile>(
            r#"
            SELECT
                u.id, u.username, u.email, u.full_name, u.avatar, u.cover_image, u.created_at,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id) AS subscribers_count,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id)
                    AS channels_subscribed_to_count,
                EXISTS (
                    SELECT 1 FROM subscriptions s
                    WHERE s.channel_id = u.id AND s.subscriber_id = $2
                ) AS is_subscribed
            FROM users u
            WHERE u.username = $1
            "#,
        )
        .bind(normalize_handle(username))
        .bind(viewer)
        .fetch_optional(self.pool())
        .await?;
        Ok(profile)
    }

    async fn watch_history(&self, id: Uuid) -> Result<Vec<VideoCard>> {
        let history = sqlx::query_as::<_, VideoCard>(&format!(
            r#"
            SELECT {VIDEO_CARD_COLUMNS}
            FROM watch_history h
            JOIN videos v ON v.id = h.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE h.user_id = $1 AND (v.is_published OR v.owner_id = $1)
            ORDER BY h.watched_at DESC
            "#
        ))
        .bind(id)
        .fetch_all(self.pool())
        .await?;
        Ok(history)
    }
}
