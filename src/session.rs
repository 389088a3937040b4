//! # Session Layer
//!
//! The bootstrap surface of the mapping engine. A [`SessionFactory`] is
//! built once from a store and a set of entity type definitions; building it
//! registers every declared type against the store as one atomic batch.
//! [`Session`] handles are cheap clones of the factory's state and expose
//! the entity lifecycle: create, find, find-all, delete, plus an explicit
//! outer transaction for grouping accessor calls.

use std::sync::Arc;

use crate::dispatch::Entity;
use crate::model::NodeId;
use crate::registry::TypeRegistry;
use crate::schema::{EntityTypeDef, SchemaSet};
use crate::store::GraphStore;
use crate::{Error, Result};

// ============================================================================
// SessionFactory
// ============================================================================

/// Holds the immutable schema and the type registry for one store.
pub struct SessionFactory<S: GraphStore> {
    registry: Arc<TypeRegistry<S>>,
}

impl<S: GraphStore> Clone for SessionFactory<S> {
    fn clone(&self) -> Self {
        Self { registry: Arc::clone(&self.registry) }
    }
}

impl<S: GraphStore> SessionFactory<S> {
    pub fn builder() -> SessionFactoryBuilder<S> {
        SessionFactoryBuilder {
            store: None,
            defs: Vec::new(),
        }
    }

    /// Open a session. Sessions are cheap handles; open as many as needed.
    pub fn session(&self) -> Session<S> {
        Session { registry: Arc::clone(&self.registry) }
    }

    /// The schema the factory was built with.
    pub fn schema(&self) -> &Arc<SchemaSet> {
        self.registry.schema()
    }
}

/// Builder for [`SessionFactory`]: a store plus any number of entity type
/// definitions.
pub struct SessionFactoryBuilder<S: GraphStore> {
    store: Option<Arc<S>>,
    defs: Vec<EntityTypeDef>,
}

impl<S: GraphStore> SessionFactoryBuilder<S> {
    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    /// Declare one entity type. Repeatable.
    pub fn register(mut self, def: EntityTypeDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Build the schema set and register every declared type against the
    /// store.
    ///
    /// Registration is one atomic batch: a type that fails to register
    /// leaves none of the batch registered. Re-registering types already
    /// known to the store is a no-op, so rebuilding a factory over an
    /// existing store is safe.
    pub fn build(self) -> Result<SessionFactory<S>> {
        let store = self
            .store
            .ok_or_else(|| Error::Schema("session factory has no graph store".into()))?;
        let schema = Arc::new(SchemaSet::new(self.defs)?);
        let registry = TypeRegistry::new(store, Arc::clone(&schema));
        registry.add_definitions(schema.names())?;
        tracing::info!(types = schema.len(), "session factory ready");
        Ok(SessionFactory { registry: Arc::new(registry) })
    }
}

// ============================================================================
// Session
// ============================================================================

/// Entity lifecycle operations against one store.
pub struct Session<S: GraphStore> {
    registry: Arc<TypeRegistry<S>>,
}

impl<S: GraphStore> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self { registry: Arc::clone(&self.registry) }
    }
}

impl<S: GraphStore> Session<S> {
    /// Create a new instance of a registered type and hand back its typed
    /// handle.
    pub fn create(&self, entity_type: &str) -> Result<Entity<S>> {
        let node = self.registry.create_node(entity_type)?;
        Entity::new(node, Arc::clone(self.registry.schema()))
    }

    /// Look up an instance by id. The node's tag is verified against
    /// `entity_type`.
    pub fn find(&self, id: NodeId, entity_type: &str) -> Result<Entity<S>> {
        let node = self.registry.get(id, entity_type)?;
        Entity::new(node, Arc::clone(self.registry.schema()))
    }

    /// Every instance of `entity_type`.
    pub fn find_all(&self, entity_type: &str) -> Result<Vec<Entity<S>>> {
        let nodes = self.registry.get_all(entity_type)?;
        nodes
            .into_iter()
            .map(|node| Entity::new(node, Arc::clone(self.registry.schema())))
            .collect()
    }

    /// Delete an instance: every incident relationship, then the node.
    pub fn delete(&self, id: NodeId, entity_type: &str) -> Result<()> {
        self.registry.get(id, entity_type)?.delete()
    }

    /// Open an explicit outer transaction. Accessor calls made while it is
    /// open join it and commit or roll back with it.
    pub fn begin_tx(&self) -> Result<S::Tx> {
        self.registry.store().begin_tx()
    }

    /// The registry behind this session, for callers working below the
    /// typed surface.
    pub fn registry(&self) -> &TypeRegistry<S> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Action;
    use crate::store::MemoryStore;

    #[test]
    fn test_build_requires_store() {
        let result = SessionFactory::<MemoryStore>::builder()
            .register(EntityTypeDef::builder("Person").build().unwrap())
            .build();
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_rebuild_over_existing_store() {
        let store = Arc::new(MemoryStore::new());
        let def = || {
            EntityTypeDef::builder("Person")
                .property("name", "name", Action::Read)
                .build()
                .unwrap()
        };

        let first = SessionFactory::builder()
            .store(Arc::clone(&store))
            .register(def())
            .build()
            .unwrap();
        first.session().create("Person").unwrap();

        // A second factory over the same store re-registers idempotently
        // and sees the existing instances.
        let second = SessionFactory::builder()
            .store(store)
            .register(def())
            .build()
            .unwrap();
        assert_eq!(second.session().find_all("Person").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let result = SessionFactory::builder()
            .store(Arc::new(MemoryStore::new()))
            .register(EntityTypeDef::builder("Person").build().unwrap())
            .register(EntityTypeDef::builder("Person").build().unwrap())
            .build();
        assert!(matches!(result, Err(Error::Schema(_))));
    }
}
