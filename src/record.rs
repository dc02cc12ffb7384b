//! Attribute names, scalar values and ordered per-node records.
//!
//! Every attribute any metric category can produce is listed in [`Attribute`],
//! so the merge of partial records works on a closed set of names and key
//! collisions between categories are visible at compile time.

use serde::{Serialize, Serializer};
use std::fmt;

/// Opaque node identifier, usually `host:port`.
pub type NodeId = String;

/// Rendered in place of a value a node did not report.
pub const MISSING: &str = "?";

/// Rendered for every miner-info attribute when that fetch fails.
pub const MINER_PLACEHOLDER: &str = "???";

/// Every attribute name a node record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    /// Static identity seeded from the registry
    NodeId,
    Version,
    Utx,
    State,
    Persisted,
    Bottom,
    Top,
    MicroHash,
    LastMicros,
    LastBlocks,
    Address,
    MiningBalance,
    In,
    Seed,
}

impl Attribute {
    /// Column name shown to the operator.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::NodeId => "nodeId",
            Attribute::Version => "version",
            Attribute::Utx => "UTX",
            Attribute::State => "STATE",
            Attribute::Persisted => "persisted",
            Attribute::Bottom => "bottom",
            Attribute::Top => "top",
            Attribute::MicroHash => "microHash",
            Attribute::LastMicros => "lastMicros",
            Attribute::LastBlocks => "lastBlocks",
            Attribute::Address => "address",
            Attribute::MiningBalance => "miningBalance",
            Attribute::In => "in",
            Attribute::Seed => "seed",
        }
    }

    pub fn is_identity(self) -> bool {
        self == Attribute::NodeId
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Scalar attribute value. Equality is strict: `Int(5)` never equals `Text("5")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    Int(i64),
}

impl AttrValue {
    pub fn text(value: impl Into<String>) -> Self {
        AttrValue::Text(value.into())
    }

    pub fn missing() -> Self {
        AttrValue::Text(MISSING.to_string())
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

/// Attribute/value pairs in insertion order.
///
/// Used both for the partial record one category yields for one node and for
/// the unified record of a node after all categories are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(Attribute, AttrValue)>,
}

/// What a single fetcher yields for a single node.
pub type PartialRecord = Record;

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `attr`, replacing any earlier value in place so the attribute keeps
    /// the position where it was first inserted.
    pub fn insert(&mut self, attr: Attribute, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(a, _)| *a == attr) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((attr, value)),
        }
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, attr: Attribute, value: impl Into<AttrValue>) -> Self {
        self.insert(attr, value);
        self
    }

    pub fn get(&self, attr: Attribute) -> Option<&AttrValue> {
        self.entries.iter().find(|(a, _)| *a == attr).map(|(_, v)| v)
    }

    /// Union `other` into `self`; values from `other` win on collision.
    pub fn merge(&mut self, other: Record) {
        for (attr, value) in other.entries {
            self.insert(attr, value);
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.entries.iter().map(|(a, _)| *a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &AttrValue)> {
        self.entries.iter().map(|(a, v)| (*a, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merged records of every node for one polling pass, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedRecord {
    nodes: Vec<(NodeId, Record)>,
}

impl UnifiedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, or replace its record if it is already present.
    pub fn insert(&mut self, node_id: impl Into<NodeId>, record: Record) {
        let node_id = node_id.into();
        match self.nodes.iter_mut().find(|(id, _)| *id == node_id) {
            Some(slot) => slot.1 = record,
            None => self.nodes.push((node_id, record)),
        }
    }

    pub fn with(mut self, node_id: impl Into<NodeId>, record: Record) -> Self {
        self.insert(node_id, record);
        self
    }

    pub fn get(&self, node_id: &str) -> Option<&Record> {
        self.nodes.iter().find(|(id, _)| id == node_id).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Record)> {
        self.nodes.iter().map(|(id, r)| (id, r))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new()
            .with(Attribute::NodeId, "a")
            .with(Attribute::Version, "1.0")
            .with(Attribute::Utx, 3i64);

        record.insert(Attribute::Version, "timeout");

        let order: Vec<_> = record.attributes().collect();
        assert_eq!(order, vec![Attribute::NodeId, Attribute::Version, Attribute::Utx]);
        assert_eq!(record.get(Attribute::Version), Some(&AttrValue::text("timeout")));
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut base = Record::new().with(Attribute::Version, "1.0");
        let later = Record::new()
            .with(Attribute::Version, "2.0")
            .with(Attribute::Seed, "words");

        base.merge(later);

        assert_eq!(base.len(), 2);
        assert_eq!(base.get(Attribute::Version), Some(&AttrValue::text("2.0")));
        assert_eq!(base.get(Attribute::Seed), Some(&AttrValue::text("words")));
    }

    #[test]
    fn test_strict_value_equality() {
        assert_ne!(AttrValue::Int(5), AttrValue::text("5"));
        assert_eq!(AttrValue::Int(5).to_string(), "5");
        assert_eq!(AttrValue::missing(), AttrValue::text(MISSING));
    }

    #[test]
    fn test_attribute_serializes_as_name() {
        let json = serde_json::to_string(&Attribute::Utx).unwrap();
        assert_eq!(json, "\"UTX\"");
        let json = serde_json::to_string(&AttrValue::Int(7)).unwrap();
        assert_eq!(json, "7");
    }
}
