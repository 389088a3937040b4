//! # Graph Store Port
//!
//! The contract between the mapping engine and whatever holds the graph.
//! Everything the engine needs from a store is defined here; the engine
//! never touches storage through any other surface.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory store for testing and embedding |
//!
//! ## Transactions
//!
//! Mutating operations require an open transaction on the store and fail
//! with [`Error::NotInTransaction`](crate::Error::NotInTransaction) without
//! one. Reads work inside or outside a transaction. Transactions nest
//! flatly: `begin_tx` while one is already open joins the existing unit of
//! work instead of opening a second one. The unit commits only if every
//! handle was committed; dropping any handle without committing marks the
//! whole unit rollback-only.

pub mod memory;

use crate::model::{Direction, Node, NodeId, RelId, Relationship, Value};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// Transaction handle
// ============================================================================

/// Handle onto a (possibly shared) unit of work.
///
/// Obtained from [`GraphStore::begin_tx`]. Consuming the handle with
/// [`commit`](StoreTx::commit) marks this slice of the work successful;
/// dropping it without committing marks the whole unit rollback-only. Either
/// way the handle is finished when it goes out of scope, so a `?` early
/// return inside a transaction rolls the unit back on unwind of the scope.
pub trait StoreTx {
    /// Mark this handle successful and finish it.
    ///
    /// For a nested handle this is purely a success marker. For the
    /// outermost handle it resolves the unit: apply if every handle
    /// committed, otherwise roll back and report the failure.
    fn commit(self) -> Result<()>;
}

// ============================================================================
// GraphStore trait
// ============================================================================

/// The storage contract the mapping engine is written against.
///
/// Any property graph that can do these operations can sit underneath the
/// engine. The surface is deliberately small: nodes with key/value
/// properties, directed labeled edges, and flat-nesting transactions. There
/// is no query language and no index contract here.
pub trait GraphStore: Send + Sync + 'static {
    /// The transaction handle type for this store.
    type Tx: StoreTx;

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Begin a transaction, or join the one already open on this store.
    fn begin_tx(&self) -> Result<Self::Tx>;

    // ========================================================================
    // Anchor
    // ========================================================================

    /// The store's well-known anchor node.
    ///
    /// Present from the moment the store exists and never deletable. Used
    /// as the stable entry point for bookkeeping structures.
    fn anchor_node(&self) -> Result<NodeId>;

    // ========================================================================
    // Node CRUD
    // ========================================================================

    /// Create an empty node.
    fn create_node(&self) -> Result<NodeId>;

    /// Get a node by id. Returns `None` if not found.
    fn get_node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Delete a node. Returns true if it existed.
    /// Fails if the node still has relationships attached.
    fn delete_node(&self, id: NodeId) -> Result<bool>;

    /// Read a single property. Errors if the node does not exist;
    /// returns `None` if the node exists but the key is absent.
    fn node_property(&self, id: NodeId, key: &str) -> Result<Option<Value>>;

    /// Whether the node carries the given property key.
    fn has_node_property(&self, id: NodeId, key: &str) -> Result<bool> {
        Ok(self.node_property(id, key)?.is_some())
    }

    /// Set a property on a node (upsert).
    fn set_node_property(&self, id: NodeId, key: &str, value: Value) -> Result<()>;

    /// Remove a property from a node. Absent keys are a no-op.
    fn remove_node_property(&self, id: NodeId, key: &str) -> Result<()>;

    // ========================================================================
    // Relationship CRUD
    // ========================================================================

    /// Create a directed labeled edge between two existing nodes.
    fn create_relationship(&self, src: NodeId, dst: NodeId, label: &str) -> Result<RelId>;

    /// Get a relationship by id.
    fn relationship(&self, id: RelId) -> Result<Option<Relationship>>;

    /// Delete a relationship. Returns true if it existed.
    fn delete_relationship(&self, id: RelId) -> Result<bool>;

    /// All relationships incident to `node` that match the direction, and
    /// the label when one is given.
    fn relationships(
        &self,
        node: NodeId,
        label: Option<&str>,
        direction: Direction,
    ) -> Result<Vec<Relationship>>;

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Total number of nodes, the anchor node included.
    fn node_count(&self) -> Result<u64>;

    /// Total number of relationships.
    fn relationship_count(&self) -> Result<u64>;
}
