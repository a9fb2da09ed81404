use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{InMemoryStore, StoredUser};
use crate::database::ports::users::UsersRepository;
use crate::domain::users::normalize_handle;
use crate::domain::{Asset, ChannelProfile, NewUser, User, VideoCard};
use crate::error::{CoreError, Result};

#[async_trait]
impl UsersRepository for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write();
        if state.users.iter().any(|u| u.user.username == user.username) {
            return Err(CoreError::conflict("User with this username already exists"));
        }
        if state.users.iter().any(|u| u.user.email == user.email) {
            return Err(CoreError::conflict("User with this email already exists"));
        }

        let now = Utc::now();
        let (cover_image, cover_image_public_id) = match user.cover_image {
            Some(asset) => (Some(asset.url), Some(asset.public_id)),
            None => (None, None),
        };
        let created = User {
            id: Uuid::now_v7(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar: user.avatar.url,
            avatar_public_id: user.avatar.public_id,
            cover_image,
            cover_image_public_id,
            created_at: now,
            updated_at: now,
        };
        state.users.push(StoredUser {
            user: created.clone(),
            password_hash: user.password_hash,
            refresh_token: None,
        });
        Ok(created)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().stored_user(id).map(|u| u.user.clone()))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = normalize_handle(username);
        Ok(self
            .state
            .read()
            .users
            .iter()
            .find(|u| u.user.username == username)
            .map(|u| u.user.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_handle(email);
        Ok(self
            .state
            .read()
            .users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| u.user.clone()))
    }

    async fn update_account(
        &self,
        id: Uuid,
        email: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<User> {
        let mut state = self.state.write();
        let email = email.map(normalize_handle);
        if let Some(email) = &email
            && state.users.iter().any(|u| u.user.email == *email && u.user.id != id)
        {
            return Err(CoreError::conflict("User with this email already exists"));
        }

        let stored = state.stored_user_mut(id)?;
        if let Some(email) = email {
            stored.user.email = email;
        }
        if let Some(full_name) = full_name {
            stored.user.full_name = full_name.trim().to_string();
        }
        stored.user.updated_at = Utc::now();
        Ok(stored.user.clone())
    }

    async fn update_avatar(&self, id: Uuid, avatar: &Asset) -> Result<User> {
        let mut state = self.state.write();
        let stored = state.stored_user_mut(id)?;
        stored.user.avatar = avatar.url.clone();
        stored.user.avatar_public_id = avatar.public_id.clone();
        stored.user.updated_at = Utc::now();
        Ok(stored.user.clone())
    }

    async fn update_cover_image(&self, id: Uuid, cover_image: &Asset) -> Result<User> {
        let mut state = self.state.write();
        let stored = state.stored_user_mut(id)?;
        stored.user.cover_image = Some(cover_image.url.clone());
        stored.user.cover_image_public_id = Some(cover_image.public_id.clone());
        stored.user.updated_at = Utc::now();
        Ok(stored.user.clone())
    }

    async fn get_password_hash(&self, id: Uuid) -> Result<Option<String>> {
        Ok(self
            .state
            .read()
            .stored_user(id)
            .map(|u| u.password_hash.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut state = self.state.write();
        let stored = state.stored_user_mut(id)?;
        stored.password_hash = password_hash.to_string();
        stored.refresh_token = None;
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn get_refresh_token(&self, id: Uuid) -> Result<Option<String>> {
        Ok(self
            .state
            .read()
            .stored_user(id)
            .and_then(|u| u.refresh_token.clone()))
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<()> {
        let mut state = self.state.write();
        if let Ok(stored) = state.stored_user_mut(id) {
            stored.refresh_token = token.map(str::to_string);
        }
        Ok(())
    }

    async fn channel_profile(&self, username: &str, viewer: Uuid) -> Result<Option<ChannelProfile>> {
        let username = normalize_handle(username);
        let state = self.state.read();
        let Some(stored) = state.users.iter().find(|u| u.user.username == username) else {
            return Ok(None);
        };
        let user = &stored.user;
        Ok(Some(ChannelProfile {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
            cover_image: user.cover_image.clone(),
            subscribers_count: state.subscriber_count(user.id),
            channels_subscribed_to_count: state
                .subscriptions
                .iter()
                .filter(|s| s.subscriber == user.id)
                .count() as i64,
            is_subscribed: state.is_subscribed(viewer, user.id),
            created_at: user.created_at,
        }))
    }

    async fn watch_history(&self, id: Uuid) -> Result<Vec<VideoCard>> {
        let state = self.state.read();
        state
            .history
            .iter()
            .rev()
            .filter(|entry| entry.user == id)
            .filter_map(|entry| state.video(entry.video))
            .filter(|video| video.visible_to(id))
            .map(|video| state.video_card(video))
            .collect()
    }
}
