//! Metric fetchers: one status request per node and category.
//!
//! A fetch never fails outward. Transport, status and decoding errors are
//! turned into a fallback record carrying the failure text, so one node's
//! failure only ever changes that node's cells.

pub mod category;
pub mod transport;

pub use category::Category;
pub use transport::{HttpTransport, Transport, TransportError};

use crate::record::PartialRecord;
use crate::registry::Node;
use crate::settings::PollContext;
use log::debug;

/// Why one status request produced no data
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("miner info is empty")]
    EmptyMinerInfo,
}

/// URL of `category`'s status endpoint on `node`
pub fn endpoint_url(node: &Node, category: Category) -> String {
    format!("http://{}{}", node.address, category.path())
}

/// Request `category` from `node` and shape the result.
pub async fn try_fetch(
    transport: &dyn Transport,
    node: &Node,
    category: Category,
    context: &PollContext,
) -> Result<PartialRecord, FetchError> {
    let body = transport
        .get_json(&endpoint_url(node, category), &context.api_key)
        .await?;
    category.shape(body, chrono::Utc::now().timestamp_millis())
}

/// Like [`try_fetch`], but failures become the category's fallback record.
pub async fn fetch(
    transport: &dyn Transport,
    node: &Node,
    category: Category,
    context: &PollContext,
) -> PartialRecord {
    match try_fetch(transport, node, category, context).await {
        Ok(record) => record,
        Err(e) => {
            debug!("{} fetch failed for {}: {}", category, node.id, e);
            category.fallback(&e)
        }
    }
}
