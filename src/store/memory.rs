//! In-memory graph store.
//!
//! This is the reference implementation of [`GraphStore`]. Graph state lives
//! in hash maps behind a single RwLock; every mutation is recorded in an
//! undo journal so a failed transaction can be rolled back.
//!
//! ## Transaction model
//!
//! Transactions nest flatly. `begin_tx` while a transaction is open bumps a
//! depth counter and hands back another handle onto the same unit of work.
//! Each handle must either be committed or dropped; when the outermost
//! handle finishes, the journal is discarded (every handle committed) or
//! replayed backwards (some handle was dropped uncommitted).
//!
//! ## Limitations
//!
//! - **Single process, no persistence**: state is gone when the store is.
//! - **Store-wide transactions**: the open transaction belongs to the store,
//!   not to a thread. Concurrent writers would share one journal, so keep
//!   mutation single-threaded.
//! - **No read isolation**: uncommitted writes are visible to readers.
//!
//! Use this store for tests, examples, and embedding where durability does
//! not matter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use super::{GraphStore, StoreTx};
use crate::model::{Direction, Node, NodeId, RelId, Relationship, Value};
use crate::{Error, Result};

/// The anchor node id. Created with the store, never deletable.
const ANCHOR: NodeId = NodeId(0);

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory property graph with journaled transactions.
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    state: RwLock<GraphState>,
    next_node_id: AtomicU64,
    next_rel_id: AtomicU64,
}

struct GraphState {
    nodes: HashMap<NodeId, Node>,
    relationships: HashMap<RelId, Relationship>,
    /// node id → ids of all incident relationships, in creation order
    adjacency: HashMap<NodeId, SmallVec<[RelId; 4]>>,
    /// The open unit of work, if any.
    tx: Option<TxFrame>,
}

struct TxFrame {
    depth: usize,
    doomed: bool,
    journal: Vec<UndoOp>,
}

/// One reversible step. Applied in reverse order on rollback.
enum UndoOp {
    NodeCreated(NodeId),
    NodeDeleted(Node),
    PropertyWritten {
        node: NodeId,
        key: String,
        previous: Option<Value>,
    },
    RelCreated(RelId),
    RelDeleted(Relationship),
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        let mut adjacency = HashMap::new();
        nodes.insert(ANCHOR, Node::new(ANCHOR));
        adjacency.insert(ANCHOR, SmallVec::new());

        Self {
            inner: Arc::new(MemoryInner {
                state: RwLock::new(GraphState {
                    nodes,
                    relationships: HashMap::new(),
                    adjacency,
                    tx: None,
                }),
                next_node_id: AtomicU64::new(1),
                next_rel_id: AtomicU64::new(1),
            }),
        }
    }
}

// ============================================================================
// GraphState internals
// ============================================================================

impl GraphState {
    fn require_tx(&self) -> Result<()> {
        if self.tx.is_some() {
            Ok(())
        } else {
            Err(Error::NotInTransaction)
        }
    }

    fn journal(&mut self, op: UndoOp) {
        if let Some(frame) = self.tx.as_mut() {
            frame.journal.push(op);
        }
    }

    fn link(&mut self, rel: &Relationship) {
        self.adjacency.entry(rel.src).or_default().push(rel.id);
        if rel.src != rel.dst {
            self.adjacency.entry(rel.dst).or_default().push(rel.id);
        }
    }

    fn unlink(&mut self, rel: &Relationship) {
        if let Some(ids) = self.adjacency.get_mut(&rel.src) {
            ids.retain(|rid| *rid != rel.id);
        }
        if rel.src != rel.dst {
            if let Some(ids) = self.adjacency.get_mut(&rel.dst) {
                ids.retain(|rid| *rid != rel.id);
            }
        }
    }

    fn undo(&mut self, op: UndoOp) {
        match op {
            UndoOp::NodeCreated(id) => {
                self.nodes.remove(&id);
                self.adjacency.remove(&id);
            }
            UndoOp::NodeDeleted(node) => {
                self.adjacency.insert(node.id, SmallVec::new());
                self.nodes.insert(node.id, node);
            }
            UndoOp::PropertyWritten { node, key, previous } => {
                if let Some(n) = self.nodes.get_mut(&node) {
                    match previous {
                        Some(value) => {
                            n.properties.insert(key, value);
                        }
                        None => {
                            n.properties.remove(&key);
                        }
                    }
                }
            }
            UndoOp::RelCreated(id) => {
                if let Some(rel) = self.relationships.remove(&id) {
                    self.unlink(&rel);
                }
            }
            UndoOp::RelDeleted(rel) => {
                self.link(&rel);
                self.relationships.insert(rel.id, rel);
            }
        }
    }
}

impl MemoryInner {
    /// Finish one handle. `success` is whether the handle was committed.
    ///
    /// Only the outermost handle resolves the unit. Committing the outermost
    /// handle of a rollback-only unit rolls back and reports the failure.
    fn finish_tx(&self, success: bool) -> Result<()> {
        let mut state = self.state.write();

        let outermost = {
            let frame = state
                .tx
                .as_mut()
                .ok_or_else(|| Error::Tx("transaction already finished".into()))?;
            if !success {
                frame.doomed = true;
            }
            frame.depth -= 1;
            frame.depth == 0
        };
        if !outermost {
            return Ok(());
        }

        if let Some(frame) = state.tx.take() {
            let ops = frame.journal.len();
            if frame.doomed {
                for op in frame.journal.into_iter().rev() {
                    state.undo(op);
                }
                tracing::debug!(ops, "transaction rolled back");
                if success {
                    return Err(Error::Tx(
                        "transaction was marked rollback-only and has been rolled back".into(),
                    ));
                }
            } else {
                tracing::debug!(ops, "transaction committed");
            }
        }
        Ok(())
    }
}

// ============================================================================
// MemoryTx
// ============================================================================

/// Handle onto the store's open unit of work.
///
/// Dropping the handle without calling [`commit`](StoreTx::commit) marks the
/// whole unit rollback-only.
pub struct MemoryTx {
    inner: Arc<MemoryInner>,
    finished: bool,
}

impl StoreTx for MemoryTx {
    fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.inner.finish_tx(true)
    }
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.inner.finish_tx(false);
        }
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryStore {
    type Tx = MemoryTx;

    fn begin_tx(&self) -> Result<MemoryTx> {
        let mut state = self.inner.state.write();
        match state.tx.as_mut() {
            Some(frame) => frame.depth += 1,
            None => {
                state.tx = Some(TxFrame {
                    depth: 1,
                    doomed: false,
                    journal: Vec::new(),
                });
            }
        }
        Ok(MemoryTx {
            inner: Arc::clone(&self.inner),
            finished: false,
        })
    }

    fn anchor_node(&self) -> Result<NodeId> {
        Ok(ANCHOR)
    }

    // ========================================================================
    // Node CRUD
    // ========================================================================

    fn create_node(&self) -> Result<NodeId> {
        let mut state = self.inner.state.write();
        state.require_tx()?;

        let id = NodeId(self.inner.next_node_id.fetch_add(1, Ordering::Relaxed));
        state.nodes.insert(id, Node::new(id));
        state.adjacency.insert(id, SmallVec::new());
        state.journal(UndoOp::NodeCreated(id));
        Ok(id)
    }

    fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        Ok(self.inner.state.read().nodes.get(&id).cloned())
    }

    fn delete_node(&self, id: NodeId) -> Result<bool> {
        let mut state = self.inner.state.write();
        state.require_tx()?;

        if id == ANCHOR {
            return Err(Error::Store("the anchor node cannot be deleted".into()));
        }
        if let Some(ids) = state.adjacency.get(&id) {
            if !ids.is_empty() {
                return Err(Error::Store(format!(
                    "cannot delete node {id} with {} relationships still attached",
                    ids.len()
                )));
            }
        }

        let removed = state.nodes.remove(&id);
        state.adjacency.remove(&id);
        match removed {
            Some(node) => {
                state.journal(UndoOp::NodeDeleted(node));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn node_property(&self, id: NodeId, key: &str) -> Result<Option<Value>> {
        let state = self.inner.state.read();
        let node = state.nodes.get(&id).ok_or(Error::NodeNotFound(id))?;
        Ok(node.properties.get(key).cloned())
    }

    fn set_node_property(&self, id: NodeId, key: &str, value: Value) -> Result<()> {
        let mut state = self.inner.state.write();
        state.require_tx()?;

        let node = state.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))?;
        let previous = node.properties.insert(key.to_owned(), value);
        state.journal(UndoOp::PropertyWritten {
            node: id,
            key: key.to_owned(),
            previous,
        });
        Ok(())
    }

    fn remove_node_property(&self, id: NodeId, key: &str) -> Result<()> {
        let mut state = self.inner.state.write();
        state.require_tx()?;

        let node = state.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))?;
        let previous = node.properties.remove(key);
        state.journal(UndoOp::PropertyWritten {
            node: id,
            key: key.to_owned(),
            previous,
        });
        Ok(())
    }

    // ========================================================================
    // Relationship CRUD
    // ========================================================================

    fn create_relationship(&self, src: NodeId, dst: NodeId, label: &str) -> Result<RelId> {
        let mut state = self.inner.state.write();
        state.require_tx()?;

        if !state.nodes.contains_key(&src) {
            return Err(Error::NodeNotFound(src));
        }
        if !state.nodes.contains_key(&dst) {
            return Err(Error::NodeNotFound(dst));
        }

        let id = RelId(self.inner.next_rel_id.fetch_add(1, Ordering::Relaxed));
        let rel = Relationship::new(id, src, dst, label);
        state.link(&rel);
        state.relationships.insert(id, rel);
        state.journal(UndoOp::RelCreated(id));
        Ok(id)
    }

    fn relationship(&self, id: RelId) -> Result<Option<Relationship>> {
        Ok(self.inner.state.read().relationships.get(&id).cloned())
    }

    fn delete_relationship(&self, id: RelId) -> Result<bool> {
        let mut state = self.inner.state.write();
        state.require_tx()?;

        match state.relationships.remove(&id) {
            Some(rel) => {
                state.unlink(&rel);
                state.journal(UndoOp::RelDeleted(rel));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn relationships(
        &self,
        node: NodeId,
        label: Option<&str>,
        direction: Direction,
    ) -> Result<Vec<Relationship>> {
        let state = self.inner.state.read();

        let Some(rel_ids) = state.adjacency.get(&node) else {
            return Ok(Vec::new());
        };

        let mut result = Vec::new();
        for rid in rel_ids {
            if let Some(rel) = state.relationships.get(rid) {
                let matches_label = label.is_none_or(|l| rel.label == l);
                if matches_label && rel.matches_direction(node, direction) {
                    result.push(rel.clone());
                }
            }
        }
        Ok(result)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    fn node_count(&self) -> Result<u64> {
        Ok(self.inner.state.read().nodes.len() as u64)
    }

    fn relationship_count(&self) -> Result<u64> {
        Ok(self.inner.state.read().relationships.len() as u64)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_exists_from_start() {
        let db = MemoryStore::new();
        let anchor = db.anchor_node().unwrap();
        assert!(db.get_node(anchor).unwrap().is_some());
        assert_eq!(db.node_count().unwrap(), 1);
    }

    #[test]
    fn test_mutation_requires_tx() {
        let db = MemoryStore::new();
        assert!(matches!(db.create_node(), Err(Error::NotInTransaction)));
        assert!(matches!(
            db.set_node_property(ANCHOR, "k", Value::from(1)),
            Err(Error::NotInTransaction)
        ));
    }

    #[test]
    fn test_create_and_get_node() {
        let db = MemoryStore::new();
        let tx = db.begin_tx().unwrap();
        let id = db.create_node().unwrap();
        db.set_node_property(id, "name", Value::from("Ada")).unwrap();
        tx.commit().unwrap();

        let node = db.get_node(id).unwrap().unwrap();
        assert_eq!(node.get("name"), Some(&Value::from("Ada")));
        assert_eq!(db.node_property(id, "name").unwrap(), Some(Value::from("Ada")));
        assert_eq!(db.node_property(id, "missing").unwrap(), None);
    }

    #[test]
    fn test_rollback_undoes_writes() {
        let db = MemoryStore::new();

        let tx = db.begin_tx().unwrap();
        let a = db.create_node().unwrap();
        let b = db.create_node().unwrap();
        db.create_relationship(a, b, "KNOWS").unwrap();
        db.set_node_property(a, "name", Value::from("Ada")).unwrap();
        drop(tx);

        assert!(db.get_node(a).unwrap().is_none());
        assert!(db.get_node(b).unwrap().is_none());
        assert_eq!(db.node_count().unwrap(), 1);
        assert_eq!(db.relationship_count().unwrap(), 0);
    }

    #[test]
    fn test_rollback_restores_deleted() {
        let db = MemoryStore::new();
        let tx = db.begin_tx().unwrap();
        let a = db.create_node().unwrap();
        let b = db.create_node().unwrap();
        let rel = db.create_relationship(a, b, "KNOWS").unwrap();
        db.set_node_property(a, "name", Value::from("Ada")).unwrap();
        tx.commit().unwrap();

        let tx = db.begin_tx().unwrap();
        db.delete_relationship(rel).unwrap();
        db.set_node_property(a, "name", Value::from("Grace")).unwrap();
        drop(tx);

        assert_eq!(db.relationship_count().unwrap(), 1);
        assert_eq!(db.relationships(a, Some("KNOWS"), Direction::Outgoing).unwrap().len(), 1);
        assert_eq!(db.node_property(a, "name").unwrap(), Some(Value::from("Ada")));
    }

    #[test]
    fn test_nested_tx_joins_outer() {
        let db = MemoryStore::new();

        let outer = db.begin_tx().unwrap();
        let a = db.create_node().unwrap();

        let inner = db.begin_tx().unwrap();
        let b = db.create_node().unwrap();
        inner.commit().unwrap();

        // Inner commit does not end the unit; both writes commit with outer.
        outer.commit().unwrap();
        assert!(db.get_node(a).unwrap().is_some());
        assert!(db.get_node(b).unwrap().is_some());
    }

    #[test]
    fn test_uncommitted_inner_dooms_outer() {
        let db = MemoryStore::new();

        let outer = db.begin_tx().unwrap();
        let a = db.create_node().unwrap();

        let inner = db.begin_tx().unwrap();
        let b = db.create_node().unwrap();
        drop(inner);

        assert!(outer.commit().is_err());
        assert!(db.get_node(a).unwrap().is_none());
        assert!(db.get_node(b).unwrap().is_none());
    }

    #[test]
    fn test_cannot_delete_connected_node() {
        let db = MemoryStore::new();
        let tx = db.begin_tx().unwrap();
        let a = db.create_node().unwrap();
        let b = db.create_node().unwrap();
        let rel = db.create_relationship(a, b, "KNOWS").unwrap();

        assert!(db.delete_node(a).is_err());

        db.delete_relationship(rel).unwrap();
        assert!(db.delete_node(a).unwrap());
        tx.commit().unwrap();

        assert!(db.get_node(a).unwrap().is_none());
        assert!(db.get_node(b).unwrap().is_some());
    }

    #[test]
    fn test_cannot_delete_anchor() {
        let db = MemoryStore::new();
        let tx = db.begin_tx().unwrap();
        assert!(db.delete_node(ANCHOR).is_err());
        tx.commit().unwrap();
    }

    #[test]
    fn test_relationships_filtering() {
        let db = MemoryStore::new();
        let tx = db.begin_tx().unwrap();
        let a = db.create_node().unwrap();
        let b = db.create_node().unwrap();
        db.create_relationship(a, b, "KNOWS").unwrap();
        db.create_relationship(b, a, "REPORTS_TO").unwrap();
        tx.commit().unwrap();

        assert_eq!(db.relationships(a, None, Direction::Both).unwrap().len(), 2);
        assert_eq!(db.relationships(a, None, Direction::Outgoing).unwrap().len(), 1);
        assert_eq!(db.relationships(a, Some("KNOWS"), Direction::Incoming).unwrap().len(), 0);
        assert_eq!(db.relationships(a, Some("REPORTS_TO"), Direction::Incoming).unwrap().len(), 1);
        assert_eq!(db.relationships(b, Some("KNOWS"), Direction::Both).unwrap().len(), 1);
    }

    #[test]
    fn test_self_loop_listed_once() {
        let db = MemoryStore::new();
        let tx = db.begin_tx().unwrap();
        let a = db.create_node().unwrap();
        let rel = db.create_relationship(a, a, "MIRRORS").unwrap();
        tx.commit().unwrap();

        assert_eq!(db.relationships(a, None, Direction::Both).unwrap().len(), 1);
        assert_eq!(db.relationships(a, None, Direction::Outgoing).unwrap().len(), 1);
        assert_eq!(db.relationships(a, None, Direction::Incoming).unwrap().len(), 1);

        let tx = db.begin_tx().unwrap();
        db.delete_relationship(rel).unwrap();
        tx.commit().unwrap();
        assert_eq!(db.relationships(a, None, Direction::Both).unwrap().len(), 0);
    }

    #[test]
    fn test_remove_property_rollback() {
        let db = MemoryStore::new();
        let tx = db.begin_tx().unwrap();
        let a = db.create_node().unwrap();
        db.set_node_property(a, "name", Value::from("Ada")).unwrap();
        tx.commit().unwrap();

        let tx = db.begin_tx().unwrap();
        db.remove_node_property(a, "name").unwrap();
        assert_eq!(db.node_property(a, "name").unwrap(), None);
        drop(tx);

        assert_eq!(db.node_property(a, "name").unwrap(), Some(Value::from("Ada")));
    }
}
