//! Divergence classification.
//!
//! For every attribute the classifier lists the distinct values observed across
//! the fleet in first-seen order and tags each node's value with its position
//! in that list. Group 0 is whatever the first node reported; any node with a
//! non-zero group disagrees with it. Groupings are recomputed from scratch for
//! every pass.

use crate::record::{AttrValue, Attribute, NodeId, UnifiedRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Distinct observed values per attribute, in first-seen order
pub type DistinctValueIndex = BTreeMap<Attribute, Vec<AttrValue>>;

/// A node's value for one attribute and the index of that value in the
/// attribute's distinct-value list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedCell {
    pub value: AttrValue,
    pub group: usize,
}

/// Classified cells of one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRow {
    pub node_id: NodeId,
    pub cells: BTreeMap<Attribute, ClassifiedCell>,
}

/// Render-ready result of one polling pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Attribute columns in first-seen order, identity excluded
    pub attributes: Vec<Attribute>,
    pub distinct: DistinctValueIndex,
    /// One row per node, in registry order
    pub nodes: Vec<NodeRow>,
}

impl Snapshot {
    pub fn node(&self, node_id: &str) -> Option<&NodeRow> {
        self.nodes.iter().find(|row| row.node_id == node_id)
    }

    pub fn cell(&self, node_id: &str, attr: Attribute) -> Option<&ClassifiedCell> {
        self.node(node_id).and_then(|row| row.cells.get(&attr))
    }

    /// Number of distinct values reported for `attr`
    pub fn group_count(&self, attr: Attribute) -> usize {
        self.distinct.get(&attr).map_or(0, Vec::len)
    }

    /// Whether nodes disagree on `attr`
    pub fn is_divergent(&self, attr: Attribute) -> bool {
        self.group_count(attr) > 1
    }
}

/// Attributes present on any node, identity excluded, in first-seen order.
pub fn collect_attributes(unified: &UnifiedRecord) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    for (_, record) in unified.iter() {
        for attr in record.attributes() {
            if !attr.is_identity() && !attributes.contains(&attr) {
                attributes.push(attr);
            }
        }
    }
    attributes
}

fn group_of(values: &mut Vec<AttrValue>, value: &AttrValue) -> usize {
    match values.iter().position(|v| v == value) {
        Some(index) => index,
        None => {
            values.push(value.clone());
            values.len() - 1
        }
    }
}

/// Classify every (node, attribute) pair of `unified`.
///
/// A node that lacks an attribute is shown as `"?"`, which is an ordinary
/// value for grouping purposes.
pub fn classify(unified: &UnifiedRecord) -> Snapshot {
    let attributes = collect_attributes(unified);
    let mut distinct = DistinctValueIndex::new();
    let mut nodes: Vec<NodeRow> = unified
        .iter()
        .map(|(node_id, _)| NodeRow { node_id: node_id.clone(), cells: BTreeMap::new() })
        .collect();

    for &attr in &attributes {
        let values = distinct.entry(attr).or_default();
        for (row, (_, record)) in nodes.iter_mut().zip(unified.iter()) {
            let value = record.get(attr).cloned().unwrap_or_else(AttrValue::missing);
            let group = group_of(values, &value);
            row.cells.insert(attr, ClassifiedCell { value, group });
        }
    }

    Snapshot { attributes, distinct, nodes }
}
