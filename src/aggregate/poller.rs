//! Fleet poller: one category fetched from every node at once.

use crate::fetch::{fetch, Category, Transport};
use crate::record::{NodeId, PartialRecord};
use crate::registry::NodeRegistry;
use crate::settings::PollContext;
use futures::future::join_all;
use std::collections::HashMap;

/// Partial records of one category, keyed by node
pub type CategoryResults = HashMap<NodeId, PartialRecord>;

/// Fetch `category` from every registered node concurrently.
///
/// Fetches cannot fail, so the result always holds one entry per node.
/// Results are keyed by node id, so completion order has no effect.
pub async fn poll_category(
    transport: &dyn Transport,
    registry: &NodeRegistry,
    category: Category,
    context: &PollContext,
) -> CategoryResults {
    let fetches = registry.nodes().iter().map(|node| async move {
        let record = fetch(transport, node, category, context).await;
        (node.id.clone(), record)
    });

    join_all(fetches).await.into_iter().collect()
}
