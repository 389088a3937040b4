//! Relationship (directed labeled edge) in the property graph.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Numeric relationship identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelId(pub u64);

impl std::fmt::Display for RelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Traversal direction relative to some node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

impl Direction {
    /// The direction as seen from the opposite end of an edge.
    /// `Both` is its own reverse.
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Outgoing => Direction::Incoming,
            Direction::Incoming => Direction::Outgoing,
            Direction::Both => Direction::Both,
        }
    }
}

/// A directed labeled edge between two nodes.
///
/// Edges carry no properties of their own; user data lives on nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelId,
    pub src: NodeId,
    pub dst: NodeId,
    pub label: String,
}

impl Relationship {
    pub fn new(id: RelId, src: NodeId, dst: NodeId, label: impl Into<String>) -> Self {
        Self { id, src, dst, label: label.into() }
    }

    /// The end of the edge that is not `from`, or `None` when the edge does
    /// not touch `from`. A self-loop returns `from` itself.
    pub fn other_node(&self, from: NodeId) -> Option<NodeId> {
        if from == self.src {
            Some(self.dst)
        } else if from == self.dst {
            Some(self.src)
        } else {
            None
        }
    }

    /// Whether the edge touches the given node at either end.
    pub fn touches(&self, node: NodeId) -> bool {
        self.src == node || self.dst == node
    }

    /// Whether the edge matches `direction` as seen from `node`.
    pub fn matches_direction(&self, node: NodeId, direction: Direction) -> bool {
        match direction {
            Direction::Outgoing => self.src == node,
            Direction::Incoming => self.dst == node,
            Direction::Both => self.touches(node),
        }
    }
}
