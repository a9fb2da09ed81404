use async_trait::async_trait;
use uuid::Uuid;

use crate::api_types::{Page, PageRequest};
use crate::domain::{Comment, CommentView};
use crate::error::Result;

#[async_trait]
pub trait CommentsRepository: Send + Sync {
    async fn create_comment(&self, video: Uuid, owner: Uuid, content: &str) -> Result<Comment>;
    async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    /// Newest first.
    async fn video_comments(
        &self,
        video: Uuid,
        viewer: Uuid,
        page: &PageRequest,
    ) -> Result<Page<CommentView>>;
    async fn update_comment(&self, id: Uuid, content: &str) -> Result<Comment>;
    /// Also removes every like on the comment.
    async fn delete_comment(&self, id: Uuid) -> Result<()>;
}
