// Live observation feed the coordinator subscribes to.
use crate::error::EngineError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use shared::models::{FeedEvent, TimeFrame};

// Events from one connection. The stream ending is a disconnect, the same
// as an explicit `FeedEvent::Disconnected`.
pub type FeedStream = BoxStream<'static, FeedEvent>;

#[async_trait]
pub trait LiveFeed: Send + Sync {
    async fn subscribe(&self, symbols: &[String], interval: TimeFrame) -> Result<FeedStream, EngineError>;
}
