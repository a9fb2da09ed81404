use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Playlist, PlaylistDetail, PlaylistSummary};
use crate::error::Result;

#[async_trait]
pub trait PlaylistsRepository: Send + Sync {
    async fn create_playlist(&self, owner: Uuid, name: &str, description: &str) -> Result<Playlist>;
    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>>;
    async fn playlist_detail(&self, id: Uuid) -> Result<Option<PlaylistDetail>>;
    async fn user_playlists(&self, owner: Uuid) -> Result<Vec<PlaylistSummary>>;
    async fn update_playlist(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Playlist>;
    async fn delete_playlist(&self, id: Uuid) -> Result<()>;
    /// Appends the video; adding a member twice is a no-op.
    async fn add_video(&self, id: Uuid, video: Uuid) -> Result<Playlist>;
    async fn remove_video(&self, id: Uuid, video: Uuid) -> Result<Playlist>;
}
