//! # Node Registry
//!
//! The static list of nodes the dashboard watches, loaded once at startup
//! from a JSON file and never mutated afterwards.
//!
//! ## File Format
//!
//! A single JSON object whose keys are node ids. Key order in the file is the
//! order nodes are shown and classified in.
//!
//! ```json
//! {
//!   "10.0.0.1:6869": "10.0.0.1:6869",
//!   "10.0.0.2:6869": { "nodeId": "node-b" },
//!   "eu-1": { "address": "eu-1.example.net:6869", "nodeId": "eu-1" }
//! }
//! ```
//!
//! A value is either the node's address or an object with an optional
//! `address` and an optional `nodeId` identity. Both default to the key.
//!
//! ## Error Handling
//!
//! Loading is all-or-nothing: an unreadable file, malformed JSON, an empty
//! registry or an empty address fails the whole load with a [`RegistryError`].

use crate::record::{Attribute, NodeId, Record};
use log::info;
use serde::Deserialize;
use std::path::Path;

/// Errors that make the node list unusable
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read node list '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed node list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Node list is empty")]
    Empty,

    #[error("Node '{0}' has an empty address")]
    EmptyAddress(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeEntry {
    Address(String),
    Detailed {
        #[serde(default)]
        address: Option<String>,
        #[serde(default, rename = "nodeId")]
        node_id: Option<String>,
    },
}

/// A single watched node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// `host:port` of the node's REST API
    pub address: String,
    /// Value of the `nodeId` identity attribute
    pub identity: String,
}

impl Node {
    /// Static fields every unified record starts from.
    pub fn identity_record(&self) -> Record {
        Record::new().with(Attribute::NodeId, self.identity.as_str())
    }
}

/// Ordered, read-only set of watched nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
}

impl NodeRegistry {
    pub fn new(nodes: Vec<Node>) -> Result<Self, RegistryError> {
        if nodes.is_empty() {
            return Err(RegistryError::Empty);
        }
        if let Some(node) = nodes.iter().find(|n| n.address.trim().is_empty()) {
            return Err(RegistryError::EmptyAddress(node.id.clone()));
        }
        Ok(Self { nodes })
    }

    /// Build a registry where each node's address and identity equal its id.
    pub fn from_addresses<I, S>(ids: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nodes = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                Node { address: id.clone(), identity: id.clone(), id }
            })
            .collect();
        Self::new(nodes)
    }

    /// Parse the JSON node list. Key order is preserved.
    pub fn from_json(content: &str) -> Result<Self, RegistryError> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
        let mut nodes = Vec::with_capacity(raw.len());
        for (id, value) in raw {
            let entry: NodeEntry = serde_json::from_value(value)?;
            let (address, identity) = match entry {
                NodeEntry::Address(address) => (address, id.clone()),
                NodeEntry::Detailed { address, node_id } => (
                    address.unwrap_or_else(|| id.clone()),
                    node_id.unwrap_or_else(|| id.clone()),
                ),
            };
            nodes.push(Node { id, address, identity });
        }
        Self::new(nodes)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Load the node list from `path`
pub fn load_nodes(path: &Path) -> Result<NodeRegistry, RegistryError> {
    info!("Loading node list from: {:?}", path);
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let registry = NodeRegistry::from_json(&content)?;
    info!("Loaded {} nodes", registry.len());
    Ok(registry)
}
