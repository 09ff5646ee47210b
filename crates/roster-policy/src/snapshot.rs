//! Inventory snapshots.
//!
//! Every decision works against one [`Snapshot`] taken before it starts.
//! Nodes can be added or removed by other actors at any time, so a
//! decision never goes back to the live inventory half way through.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::node::{Node, NodeId};
use crate::query::Query;

/// Read access to a set of nodes.
pub trait Inventory {
    /// Returns the ids of the nodes matching `query`, in inventory order.
    fn query(&self, query: &Query) -> Vec<NodeId>;

    /// Looks up a single node.
    fn node(&self, id: &NodeId) -> Option<&Node>;

    /// Number of nodes matching `query`.
    fn count(&self, query: &Query) -> usize {
        self.query(query).len()
    }
}

/// An immutable, ordered set of nodes.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

/// On-disk layout of a snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    nodes: Vec<Node>,
}

impl Snapshot {
    /// Builds a snapshot, keeping the order of `nodes`.
    ///
    /// Nodes without a name are named after their id.
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Result<Self, InventoryError> {
        let mut snapshot = Self::default();
        for mut node in nodes {
            if snapshot.index.contains_key(&node.id) {
                return Err(InventoryError::DuplicateNode(node.id));
            }
            if node.name.is_empty() {
                node.name = node.id.0.clone();
            }
            snapshot.index.insert(node.id.clone(), snapshot.nodes.len());
            snapshot.nodes.push(node);
        }
        Ok(snapshot)
    }

    /// Parses a snapshot from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, InventoryError> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        Self::new(file.nodes)
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, InventoryError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    pub fn from_file(path: &Path) -> Result<Self, InventoryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the snapshot back to JSON.
    pub fn to_json(&self) -> Result<String, InventoryError> {
        let file = SnapshotFile {
            nodes: self.nodes.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Inventory for Snapshot {
    fn query(&self, query: &Query) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| query.matches(n))
            .map(|n| n.id.clone())
            .collect()
    }

    fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }
}
