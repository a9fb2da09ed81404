use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Asset;

/// A registered account without its credentials.
///
/// Password hash and refresh token never leave the store through this type;
/// the users port exposes them through dedicated calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    #[serde(skip)]
    pub avatar_public_id: String,
    pub cover_image: Option<String>,
    #[serde(skip)]
    pub cover_image_public_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn avatar_asset(&self) -> Asset {
        Asset::new(self.avatar.clone(), self.avatar_public_id.clone())
    }

    pub fn cover_image_asset(&self) -> Option<Asset> {
        match (&self.cover_image, &self.cover_image_public_id) {
            (Some(url), Some(public_id)) => Some(Asset::new(url.clone(), public_id.clone())),
            _ => None,
        }
    }

    pub fn summary(&self) -> OwnerSummary {
        OwnerSummary {
            id: self.id,
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Registration input once the password is hashed and assets are uploaded.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar: Asset,
    pub cover_image: Option<Asset>,
}

impl NewUser {
    /// Builds the record with handle and email normalized.
    pub fn new(
        username: &str,
        email: &str,
        full_name: &str,
        password_hash: String,
        avatar: Asset,
        cover_image: Option<Asset>,
    ) -> Self {
        Self {
            username: normalize_handle(username),
            email: normalize_handle(email),
            full_name: full_name.trim().to_string(),
            password_hash,
            avatar,
            cover_image,
        }
    }
}

/// Usernames and emails are unique case-insensitively and stored lowercase.
pub fn normalize_handle(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Public face of a user embedded in other projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub subscribers_count: i64,
    pub channels_subscribed_to_count: i64,
    pub is_subscribed: bool,
    pub created_at: DateTime<Utc>,
}
