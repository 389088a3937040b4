//! # Entity Node Wrapper
//!
//! [`EntityNode`] wraps one store node that carries an entity type tag and
//! gives it safe graph behavior: property access with the tag key guarded,
//! cardinality-aware relationship lookups, and mutations that each run in
//! their own transaction.
//!
//! The wrapper knows nothing about accessors or pairing; that lives in
//! [`dispatch`](crate::dispatch). Everything here speaks raw relationship
//! labels and directions.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::model::{Direction, NodeId, Relationship, Value};
use crate::store::{GraphStore, StoreTx};
use crate::{Error, Result};

/// Property key that tags a node with its entity type name.
///
/// Written once when the node is created through the registry, and rejected
/// by [`EntityNode::set_property`] ever after.
pub const CLASS_PROPERTY_KEY: &str = "entigraph_CLASS";

/// A store node tagged as an entity instance.
///
/// Construction verifies the tag, so holding an `EntityNode` means the node
/// existed and carried the expected type at that moment. Identity follows
/// the underlying node: two wrappers of the same node on the same store
/// compare equal and hash identically.
pub struct EntityNode<S: GraphStore> {
    store: Arc<S>,
    id: NodeId,
}

impl<S: GraphStore> Clone for EntityNode<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            id: self.id,
        }
    }
}

impl<S: GraphStore> fmt::Debug for EntityNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityNode").field("id", &self.id).finish()
    }
}

impl<S: GraphStore> PartialEq for EntityNode<S> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && self.id == other.id
    }
}

impl<S: GraphStore> Eq for EntityNode<S> {}

impl<S: GraphStore> Hash for EntityNode<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<S: GraphStore> EntityNode<S> {
    /// Wrap a node previously tagged as an instance of `entity_type`.
    ///
    /// Fails if the node does not exist, carries no tag, or carries a
    /// different tag.
    pub fn new(store: Arc<S>, id: NodeId, entity_type: &str) -> Result<Self> {
        match Self::tag_of(store.as_ref(), id)? {
            Some(tag) if tag == entity_type => Ok(Self { store, id }),
            Some(tag) => Err(Error::TypeMismatch {
                id,
                expected: entity_type.to_owned(),
                found: tag,
            }),
            None => Err(Error::UntaggedNode(id)),
        }
    }

    /// Wrap a node using whatever tag it carries, yielding the tag too.
    /// This is how related nodes keep their own type instead of the
    /// statically declared one.
    pub(crate) fn from_tag(store: Arc<S>, id: NodeId) -> Result<(Self, String)> {
        match Self::tag_of(store.as_ref(), id)? {
            Some(tag) => Ok((Self { store, id }, tag)),
            None => Err(Error::UntaggedNode(id)),
        }
    }

    /// The entity tag on a raw node, if any.
    pub(crate) fn tag_of(store: &S, id: NodeId) -> Result<Option<String>> {
        let node = store.get_node(id)?.ok_or(Error::NodeNotFound(id))?;
        Ok(node
            .get(CLASS_PROPERTY_KEY)
            .and_then(Value::as_str)
            .map(str::to_owned))
    }

    /// Tag a raw node with its entity type. Caller must hold an open
    /// transaction; the registry does this during node creation.
    pub(crate) fn set_tag(store: &S, id: NodeId, entity_type: &str) -> Result<()> {
        store.set_node_property(id, CLASS_PROPERTY_KEY, Value::from(entity_type))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The entity type this node is tagged with, read from the store.
    pub fn entity_type(&self) -> Result<String> {
        Self::tag_of(self.store.as_ref(), self.id)?.ok_or(Error::UntaggedNode(self.id))
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Read a property. `None` when the key is absent.
    pub fn property(&self, key: &str) -> Result<Option<Value>> {
        self.store.node_property(self.id, key)
    }

    /// Write a property in its own transaction.
    ///
    /// Writing [`Value::Null`] removes the key. The entity tag key is
    /// reserved and rejected before any transaction is opened.
    pub fn set_property(&self, key: &str, value: Value) -> Result<()> {
        if key == CLASS_PROPERTY_KEY {
            return Err(Error::ReservedKey(key.to_owned()));
        }
        let tx = self.store.begin_tx()?;
        if value.is_null() {
            self.store.remove_node_property(self.id, key)?;
        } else {
            self.store.set_node_property(self.id, key, value)?;
        }
        tx.commit()
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    /// The single `label` edge in `direction`, if any.
    ///
    /// Finding more than one is a stored-cardinality violation and surfaces
    /// as [`Error::Multiplicity`]; it is never silently repaired.
    fn single_relationship(&self, label: &str, direction: Direction) -> Result<Option<Relationship>> {
        let mut rels = self.store.relationships(self.id, Some(label), direction)?;
        match rels.len() {
            0 => Ok(None),
            1 => Ok(rels.pop()),
            found => Err(Error::Multiplicity {
                node: self.id,
                label: label.to_owned(),
                direction,
                found,
            }),
        }
    }

    /// The node at the far end of `rel` as traversed from this node.
    ///
    /// For `Both` the edge may be stored in either orientation: a self-loop
    /// resolves to this node, otherwise to whichever endpoint is not this
    /// node.
    fn far_end(&self, rel: &Relationship, direction: Direction) -> NodeId {
        match direction {
            Direction::Outgoing => rel.dst,
            Direction::Incoming => rel.src,
            Direction::Both => {
                if rel.src == rel.dst {
                    self.id
                } else if rel.src == self.id {
                    rel.dst
                } else {
                    rel.src
                }
            }
        }
    }

    /// The related entity through the single `label` edge in `direction`,
    /// wrapped with whatever type it is tagged with.
    pub fn related_entity(&self, label: &str, direction: Direction) -> Result<Option<EntityNode<S>>> {
        match self.single_relationship(label, direction)? {
            Some(rel) => {
                let other = self.far_end(&rel, direction);
                let (node, _) = EntityNode::from_tag(Arc::clone(&self.store), other)?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    /// All related entities through `label` edges in `direction`. Empty
    /// when there are none.
    pub fn related_entities(&self, label: &str, direction: Direction) -> Result<Vec<EntityNode<S>>> {
        let rels = self.store.relationships(self.id, Some(label), direction)?;
        let mut result = Vec::with_capacity(rels.len());
        for rel in &rels {
            let other = self.far_end(rel, direction);
            let (node, _) = EntityNode::from_tag(Arc::clone(&self.store), other)?;
            result.push(node);
        }
        Ok(result)
    }

    /// Whether a `label` edge in `direction` connects this node to `other`.
    pub fn is_related_to(&self, other: &EntityNode<S>, label: &str, direction: Direction) -> Result<bool> {
        let rels = self.store.relationships(self.id, Some(label), direction)?;
        Ok(rels.iter().any(|rel| self.far_end(rel, direction) == other.id))
    }

    /// Create a `label` edge between this node and `other`, oriented by
    /// `direction`; `Both` is stored outgoing from this node. Runs in its
    /// own transaction.
    pub fn create_relationship(&self, other: &EntityNode<S>, label: &str, direction: Direction) -> Result<()> {
        let tx = self.store.begin_tx()?;
        match direction {
            Direction::Outgoing | Direction::Both => {
                self.store.create_relationship(self.id, other.id, label)?;
            }
            Direction::Incoming => {
                self.store.create_relationship(other.id, self.id, label)?;
            }
        }
        tx.commit()
    }

    /// Delete the single `label` edge in `direction` if one exists; no-op
    /// otherwise. Runs in its own transaction.
    pub fn delete_single_relationship(&self, label: &str, direction: Direction) -> Result<()> {
        let tx = self.store.begin_tx()?;
        if let Some(rel) = self.single_relationship(label, direction)? {
            self.store.delete_relationship(rel.id)?;
        }
        tx.commit()
    }

    /// Delete every `label` edge in `direction` that connects this node to
    /// `other`. Runs in its own transaction.
    pub fn delete_relationships_to(&self, other: &EntityNode<S>, label: &str, direction: Direction) -> Result<()> {
        let tx = self.store.begin_tx()?;
        for rel in self.store.relationships(self.id, Some(label), direction)? {
            if self.far_end(&rel, direction) == other.id {
                self.store.delete_relationship(rel.id)?;
            }
        }
        tx.commit()
    }

    /// Delete this entity: every incident edge, then the node itself, in
    /// one transaction.
    pub fn delete(self) -> Result<()> {
        let tx = self.store.begin_tx()?;
        for rel in self.store.relationships(self.id, None, Direction::Both)? {
            self.store.delete_relationship(rel.id)?;
        }
        self.store.delete_node(self.id)?;
        tx.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn tagged(store: &Arc<MemoryStore>, entity_type: &str) -> EntityNode<MemoryStore> {
        let tx = store.begin_tx().unwrap();
        let id = store.create_node().unwrap();
        EntityNode::set_tag(store.as_ref(), id, entity_type).unwrap();
        tx.commit().unwrap();
        EntityNode::new(Arc::clone(store), id, entity_type).unwrap()
    }

    #[test]
    fn test_wrap_verifies_tag() {
        let store = Arc::new(MemoryStore::new());
        let node = tagged(&store, "Person");

        let again = EntityNode::new(Arc::clone(&store), node.id(), "Person").unwrap();
        assert_eq!(node, again);
        assert_eq!(node.entity_type().unwrap(), "Person");

        assert!(matches!(
            EntityNode::new(Arc::clone(&store), node.id(), "Team"),
            Err(Error::TypeMismatch { .. })
        ));

        let tx = store.begin_tx().unwrap();
        let bare = store.create_node().unwrap();
        tx.commit().unwrap();
        assert!(matches!(
            EntityNode::new(Arc::clone(&store), bare, "Person"),
            Err(Error::UntaggedNode(_))
        ));
        assert!(matches!(
            EntityNode::new(store, NodeId(99), "Person"),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_reserved_key_rejected() {
        let store = Arc::new(MemoryStore::new());
        let node = tagged(&store, "Person");

        assert!(matches!(
            node.set_property(CLASS_PROPERTY_KEY, Value::from("Team")),
            Err(Error::ReservedKey(_))
        ));
        assert_eq!(node.entity_type().unwrap(), "Person");
    }

    #[test]
    fn test_set_property_null_removes() {
        let store = Arc::new(MemoryStore::new());
        let node = tagged(&store, "Person");

        node.set_property("name", Value::from("Ada")).unwrap();
        assert_eq!(node.property("name").unwrap(), Some(Value::from("Ada")));

        node.set_property("name", Value::Null).unwrap();
        assert_eq!(node.property("name").unwrap(), None);
    }

    #[test]
    fn test_single_relationship_multiplicity() {
        let store = Arc::new(MemoryStore::new());
        let a = tagged(&store, "Person");
        let b = tagged(&store, "Person");

        a.create_relationship(&b, "KNOWS", Direction::Outgoing).unwrap();
        assert!(a.related_entity("KNOWS", Direction::Outgoing).unwrap().is_some());

        // Second edge of the same label and direction breaks the singular
        // lookup.
        a.create_relationship(&b, "KNOWS", Direction::Outgoing).unwrap();
        assert!(matches!(
            a.related_entity("KNOWS", Direction::Outgoing),
            Err(Error::Multiplicity { found: 2, .. })
        ));
    }

    #[test]
    fn test_both_direction_resolution() {
        let store = Arc::new(MemoryStore::new());
        let a = tagged(&store, "Person");
        let b = tagged(&store, "Person");

        a.create_relationship(&b, "FRIENDS", Direction::Both).unwrap();

        // Either end sees the other, whichever way the edge is stored.
        let from_a = a.related_entity("FRIENDS", Direction::Both).unwrap().unwrap();
        let from_b = b.related_entity("FRIENDS", Direction::Both).unwrap().unwrap();
        assert_eq!(from_a, b);
        assert_eq!(from_b, a);
        assert!(a.is_related_to(&b, "FRIENDS", Direction::Both).unwrap());
        assert!(b.is_related_to(&a, "FRIENDS", Direction::Both).unwrap());
    }

    #[test]
    fn test_self_loop_resolution() {
        let store = Arc::new(MemoryStore::new());
        let a = tagged(&store, "Person");

        a.create_relationship(&a, "FRIENDS", Direction::Both).unwrap();
        let related = a.related_entity("FRIENDS", Direction::Both).unwrap().unwrap();
        assert_eq!(related, a);
        assert!(a.is_related_to(&a, "FRIENDS", Direction::Both).unwrap());
    }

    #[test]
    fn test_delete_removes_node_and_edges() {
        let store = Arc::new(MemoryStore::new());
        let a = tagged(&store, "Person");
        let b = tagged(&store, "Person");
        a.create_relationship(&b, "KNOWS", Direction::Outgoing).unwrap();

        let a_id = a.id();
        a.delete().unwrap();

        assert!(store.get_node(a_id).unwrap().is_none());
        assert_eq!(store.relationship_count().unwrap(), 0);
        assert!(b.related_entity("KNOWS", Direction::Incoming).unwrap().is_none());
    }

    #[test]
    fn test_delete_single_is_noop_when_absent() {
        let store = Arc::new(MemoryStore::new());
        let a = tagged(&store, "Person");
        a.delete_single_relationship("KNOWS", Direction::Outgoing).unwrap();
    }
}
