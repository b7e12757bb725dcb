pub mod demo;
pub mod envelope;
pub mod http;
pub mod registry;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::record::{self, Record};
use crate::screen::Screen;

pub use envelope::Ack;

/// What came back from a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteReply {
    /// The endpoint answered with a readable envelope.
    Ack(Ack),
    /// The transport mode does not let us see the answer.
    Opaque,
}

/// A remote collection endpoint.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    fn id(&self) -> &str;

    /// Sample data, never to be confused with live records.
    fn is_demo(&self) -> bool {
        false
    }

    /// Read the screen's collection, in whatever order the endpoint returns.
    async fn fetch_raw(
        &self,
        screen: &Screen,
        params: &[(String, String)],
    ) -> AppResult<Vec<Record>>;

    /// Send already-encoded form fields (including `action`).
    async fn send(&self, screen: &Screen, fields: &[(String, String)]) -> AppResult<WriteReply>;
}

/// Fetch a collection and order it newest first.
pub async fn fetch_collection(
    source: &dyn CollectionSource,
    screen: &Screen,
    params: &[(String, String)],
) -> AppResult<Vec<Record>> {
    let mut records = source.fetch_raw(screen, params).await?;
    record::sort_newest_first(&mut records, screen.timestamp_fields);
    tracing::debug!(
        "Fetched {} record(s) for {} from {}",
        records.len(),
        screen.id,
        source.id()
    );
    Ok(records)
}
