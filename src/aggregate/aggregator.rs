//! Snapshot aggregator: every category polled at once, merged per node.

use super::poller::{poll_category, CategoryResults};
use crate::classify::{classify, Snapshot};
use crate::fetch::{Category, Transport};
use crate::record::UnifiedRecord;
use crate::registry::NodeRegistry;
use crate::settings::PollContext;
use futures::future::join_all;
use log::info;
use std::sync::Arc;

/// Merge per-category results into one record per node.
///
/// Each node starts from its registry identity, then `polled` is applied in
/// the given order: a later category overwrites an attribute an earlier one
/// already set.
pub fn merge_categories(
    registry: &NodeRegistry,
    mut polled: Vec<(Category, CategoryResults)>,
) -> UnifiedRecord {
    let mut unified = UnifiedRecord::new();
    for node in registry.nodes() {
        let mut record = node.identity_record();
        for (_, results) in polled.iter_mut() {
            if let Some(partial) = results.remove(&node.id) {
                record.merge(partial);
            }
        }
        unified.insert(node.id.clone(), record);
    }
    unified
}

/// Runs one complete polling pass over the fleet
pub struct SnapshotAggregator {
    transport: Arc<dyn Transport>,
    registry: Arc<NodeRegistry>,
    categories: Vec<Category>,
}

impl SnapshotAggregator {
    /// `categories` is both the set polled and the merge order.
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<NodeRegistry>,
        categories: Vec<Category>,
    ) -> Self {
        Self { transport, registry, categories }
    }

    /// Poll every category concurrently and merge the results.
    pub async fn build_unified(&self, context: &PollContext) -> UnifiedRecord {
        let transport = self.transport.as_ref();
        let registry = self.registry.as_ref();
        let polls = self.categories.iter().map(|&category| async move {
            let results = poll_category(transport, registry, category, context).await;
            (category, results)
        });

        // join_all yields in input order, which keeps the merge order fixed
        let polled = join_all(polls).await;
        merge_categories(registry, polled)
    }

    /// Build the unified record and classify it.
    pub async fn build_snapshot(&self, context: &PollContext) -> Snapshot {
        info!(
            "Polling {} nodes across {} categories",
            self.registry.len(),
            self.categories.len()
        );
        let unified = self.build_unified(context).await;
        let snapshot = classify(&unified);
        let divergent = snapshot
            .attributes
            .iter()
            .filter(|attr| snapshot.is_divergent(**attr))
            .count();
        info!(
            "Pass complete: {} attributes, {} divergent",
            snapshot.attributes.len(),
            divergent
        );
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AttrValue, Attribute, Record};
    use std::collections::HashMap;

    #[test]
    fn test_merge_seeds_identity_and_keeps_category_order() {
        let registry = NodeRegistry::from_json(r#"{ "a": { "nodeId": "alpha" }, "b": "b" }"#).unwrap();

        let versions: CategoryResults = HashMap::from([
            ("a".to_string(), Record::new().with(Attribute::Version, "1.0")),
            ("b".to_string(), Record::new().with(Attribute::Version, "1.1")),
        ]);
        let utx: CategoryResults = HashMap::from([
            ("b".to_string(), Record::new().with(Attribute::Utx, 3i64)),
            ("a".to_string(), Record::new().with(Attribute::Utx, 4i64)),
        ]);

        let unified = merge_categories(
            &registry,
            vec![(Category::Version, versions), (Category::PendingTx, utx)],
        );

        let ids: Vec<_> = unified.iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let a = unified.get("a").unwrap();
        let attrs: Vec<_> = a.attributes().collect();
        assert_eq!(attrs, vec![Attribute::NodeId, Attribute::Version, Attribute::Utx]);
        assert_eq!(a.get(Attribute::NodeId), Some(&AttrValue::text("alpha")));
        assert_eq!(a.get(Attribute::Utx), Some(&AttrValue::Int(4)));
    }

    #[test]
    fn test_later_category_wins_collision() {
        let registry = NodeRegistry::from_addresses(["a"]).unwrap();
        let first: CategoryResults =
            HashMap::from([("a".to_string(), Record::new().with(Attribute::Version, "early"))]);
        let second: CategoryResults =
            HashMap::from([("a".to_string(), Record::new().with(Attribute::Version, "late"))]);

        let unified = merge_categories(
            &registry,
            vec![(Category::Version, first), (Category::WalletSeed, second)],
        );

        assert_eq!(
            unified.get("a").unwrap().get(Attribute::Version),
            Some(&AttrValue::text("late"))
        );
    }

    #[test]
    fn test_seed_merges_last() {
        let registry = NodeRegistry::from_addresses(["a"]).unwrap();
        let polled = Category::enabled(true)
            .into_iter()
            .map(|category| {
                let attr = category.attributes()[0];
                let record = Record::new().with(attr, category.to_string());
                (category, HashMap::from([("a".to_string(), record)]))
            })
            .collect();

        let unified = merge_categories(&registry, polled);

        let attrs: Vec<_> = unified.get("a").unwrap().attributes().collect();
        assert_eq!(attrs.first(), Some(&Attribute::NodeId));
        assert_eq!(attrs.last(), Some(&Attribute::Seed));
        assert_eq!(
            unified.get("a").unwrap().get(Attribute::Seed),
            Some(&AttrValue::text("wallet-seed"))
        );
    }

    #[test]
    fn test_node_without_results_keeps_identity() {
        let registry = NodeRegistry::from_addresses(["a", "b"]).unwrap();
        let only_a: CategoryResults =
            HashMap::from([("a".to_string(), Record::new().with(Attribute::Version, "1"))]);

        let unified = merge_categories(&registry, vec![(Category::Version, only_a)]);

        let b = unified.get("b").unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b.get(Attribute::NodeId), Some(&AttrValue::text("b")));
    }
}
