use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Asset, ChannelProfile, NewUser, User, VideoCard};
use crate::error::Result;

// Accounts, credentials and the per-user views built on them
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Fails with `Conflict` when the username or email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Fails with `Conflict` when the new email belongs to another user.
    async fn update_account(
        &self,
        id: Uuid,
        email: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<User>;
    async fn update_avatar(&self, id: Uuid, avatar: &Asset) -> Result<User>;
    async fn update_cover_image(&self, id: Uuid, cover_image: &Asset) -> Result<User>;

    // Credentials
    async fn get_password_hash(&self, id: Uuid) -> Result<Option<String>>;
    /// Replaces the hash and clears the stored refresh token.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
    async fn get_refresh_token(&self, id: Uuid) -> Result<Option<String>>;
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<()>;

    // Views
    async fn channel_profile(&self, username: &str, viewer: Uuid) -> Result<Option<ChannelProfile>>;
    /// Newest first; unpublished entries only when the viewer owns them.
    async fn watch_history(&self, id: Uuid) -> Result<Vec<VideoCard>>;
}
