//! # Type Registry
//!
//! Graph-resident catalog of registered entity types. Registration state
//! lives in the graph itself, hanging off the store's anchor node:
//!
//! ```text
//! (anchor) --Person_REF--> (definition { ENTITY_REF_TYPE: "Person" })
//!                              |--Person--> (instance)
//!                              |--Person--> (instance)
//! ```
//!
//! Each registered type gets one definition node, reached from the anchor
//! through an edge labeled `<TypeName>_REF`. The definition node fans out
//! to every instance through edges labeled with the raw type name, which
//! makes find-all a single hop instead of a store scan. Because the
//! catalog is graph state, it survives as long as the store does and is
//! shared by every engine instance on the same store.

use std::sync::Arc;

use crate::entity::EntityNode;
use crate::model::{Direction, NodeId, Value};
use crate::schema::SchemaSet;
use crate::store::{GraphStore, StoreTx};
use crate::{Error, Result};

/// Marker property on a definition node holding the raw type name.
pub const ENTITY_REF_TYPE: &str = "ENTITY_REF_TYPE";

/// Suffix appended to a type name to derive its anchor edge label.
const REF_SUFFIX: &str = "_REF";

/// Tracks which entity types are registered against a store, and creates
/// and finds their instances.
pub struct TypeRegistry<S: GraphStore> {
    store: Arc<S>,
    schema: Arc<SchemaSet>,
}

impl<S: GraphStore> TypeRegistry<S> {
    pub fn new(store: Arc<S>, schema: Arc<SchemaSet>) -> Self {
        Self { store, schema }
    }

    pub(crate) fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub(crate) fn schema(&self) -> &Arc<SchemaSet> {
        &self.schema
    }

    /// The anchor edge label derived from a type name, e.g. `Person_REF`.
    pub fn ref_label(entity_type: &str) -> String {
        format!("{entity_type}{REF_SUFFIX}")
    }

    /// Whether `entity_type` is declared in the schema and already
    /// registered in the graph.
    pub fn definition_exists(&self, entity_type: &str) -> Result<bool> {
        if !self.schema.contains(entity_type) {
            return Ok(false);
        }
        Ok(self.definition_node(entity_type)?.is_some())
    }

    /// Register one entity type. Idempotent; runs in one transaction.
    ///
    /// Returns the anchor edge label for the type.
    pub fn add_definition(&self, entity_type: &str) -> Result<String> {
        if !self.schema.contains(entity_type) {
            return Err(Error::UnknownEntityType(entity_type.to_owned()));
        }
        let label = Self::ref_label(entity_type);
        let tx = self.store.begin_tx()?;
        if self.definition_node(entity_type)?.is_none() {
            let def = self.store.create_node()?;
            self.store
                .set_node_property(def, ENTITY_REF_TYPE, Value::from(entity_type))?;
            let anchor = self.store.anchor_node()?;
            self.store.create_relationship(anchor, def, &label)?;
            tracing::debug!(entity_type, "registered entity definition");
        }
        tx.commit()?;
        Ok(label)
    }

    /// Register several entity types inside one transaction. If any of
    /// them is unknown to the schema, none are registered.
    pub fn add_definitions<'a>(
        &self,
        entity_types: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<String>> {
        let tx = self.store.begin_tx()?;
        let mut labels = Vec::new();
        for entity_type in entity_types {
            labels.push(self.add_definition(entity_type)?);
        }
        tx.commit()?;
        Ok(labels)
    }

    /// Anchor edge labels of every definition currently in the graph.
    pub fn definitions(&self) -> Result<Vec<String>> {
        let anchor = self.store.anchor_node()?;
        let rels = self.store.relationships(anchor, None, Direction::Outgoing)?;
        Ok(rels.into_iter().map(|rel| rel.label).collect())
    }

    /// Create a new instance of a registered type: a fresh node, tagged,
    /// and linked from the type's definition node. One transaction.
    pub fn create_node(&self, entity_type: &str) -> Result<EntityNode<S>> {
        let def = self.registered_definition(entity_type)?;

        let tx = self.store.begin_tx()?;
        let id = self.store.create_node()?;
        EntityNode::set_tag(self.store.as_ref(), id, entity_type)?;
        self.store.create_relationship(def, id, entity_type)?;
        tx.commit()?;

        tracing::debug!(entity_type, node = %id, "created entity node");
        EntityNode::new(Arc::clone(&self.store), id, entity_type)
    }

    /// Every instance of `entity_type`, through the definition node's
    /// fan-out edges.
    pub fn get_all(&self, entity_type: &str) -> Result<Vec<EntityNode<S>>> {
        let def = self.registered_definition(entity_type)?;
        let rels = self
            .store
            .relationships(def, Some(entity_type), Direction::Outgoing)?;
        let mut result = Vec::with_capacity(rels.len());
        for rel in rels {
            result.push(EntityNode::new(Arc::clone(&self.store), rel.dst, entity_type)?);
        }
        Ok(result)
    }

    /// Wrap an existing node as `entity_type`.
    ///
    /// The node's tag is verified, so asking for the wrong type fails with
    /// [`Error::TypeMismatch`] rather than handing back a mistyped handle.
    pub fn get(&self, id: NodeId, entity_type: &str) -> Result<EntityNode<S>> {
        if !self.schema.contains(entity_type) {
            return Err(Error::UnknownEntityType(entity_type.to_owned()));
        }
        EntityNode::new(Arc::clone(&self.store), id, entity_type)
    }

    /// The definition node for `entity_type`, failing when the type is
    /// undeclared or unregistered.
    fn registered_definition(&self, entity_type: &str) -> Result<NodeId> {
        if !self.schema.contains(entity_type) {
            return Err(Error::UnknownEntityType(entity_type.to_owned()));
        }
        self.definition_node(entity_type)?
            .ok_or_else(|| Error::UnknownEntityType(entity_type.to_owned()))
    }

    /// The node the anchor points at for `entity_type`, if registered.
    fn definition_node(&self, entity_type: &str) -> Result<Option<NodeId>> {
        let anchor = self.store.anchor_node()?;
        let label = Self::ref_label(entity_type);
        let mut rels = self
            .store
            .relationships(anchor, Some(&label), Direction::Outgoing)?;
        match rels.len() {
            0 => Ok(None),
            1 => Ok(rels.pop().map(|rel| rel.dst)),
            found => Err(Error::Multiplicity {
                node: anchor,
                label,
                direction: Direction::Outgoing,
                found,
            }),
        }
    }
}
