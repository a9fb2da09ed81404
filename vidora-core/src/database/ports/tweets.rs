use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Tweet, TweetView};
use crate::error::Result;

#[async_trait]
pub trait TweetsRepository: Send + Sync {
    async fn create_tweet(&self, owner: Uuid, content: &str) -> Result<Tweet>;
    async fn get_tweet(&self, id: Uuid) -> Result<Option<Tweet>>;
    /// Newest first.
    async fn user_tweets(&self, owner: Uuid, viewer: Uuid) -> Result<Vec<TweetView>>;
    async fn update_tweet(&self, id: Uuid, content: &str) -> Result<Tweet>;
    /// Also removes every like on the tweet.
    async fn delete_tweet(&self, id: Uuid) -> Result<()>;
}
