use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// Round-trips a trivial query to prove the store is reachable.
    async fn ping(&self) -> Result<()>;
}
