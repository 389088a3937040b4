//! # Dispatch / Mapping Engine
//!
//! [`Entity`] is the typed accessor object: one tagged node plus the type
//! definition its tag names. Every call goes through the same path: look up
//! the accessor's declared [`AccessorRole`], check the call shape against
//! it, then interpret the role with a plain match. Relationship mutations
//! additionally validate pairing on the target's own type and run their
//! multi-step rewrites inside a single transaction.
//!
//! Related nodes come back wrapped with whatever type *they* are tagged
//! with, not the type the caller happened to declare, so a relation may
//! point at different entity types over its lifetime.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::entity::EntityNode;
use crate::model::{Direction, NodeId, Value};
use crate::schema::{
    AccessorRole, Action, CollectionAction, EntityTypeDef, RelationshipKind, SchemaSet,
};
use crate::store::{GraphStore, StoreTx};
use crate::{Error, Result};

// ============================================================================
// Invocation DTOs
// ============================================================================

/// One argument to a dynamic [`Entity::invoke`] call.
pub enum CallArg<'a, S: GraphStore> {
    /// Explicit null: unlinks for singular writes, removes the key for
    /// property writes, no-op for collection mutators.
    Null,
    /// A scalar property value.
    Value(Value),
    /// Another entity, for relationship mutators.
    Entity(&'a Entity<S>),
}

/// What a dynamic [`Entity::invoke`] call produced.
pub enum CallOutcome<S: GraphStore> {
    /// A mutator completed.
    Unit,
    /// The node id, from an `Id` accessor.
    Id(NodeId),
    /// A property value, `None` when the key is absent.
    Value(Option<Value>),
    /// A singular relationship target, `None` when unlinked.
    Entity(Option<Entity<S>>),
    /// A collection relationship's members.
    Entities(Vec<Entity<S>>),
}

impl<S: GraphStore> fmt::Debug for CallOutcome<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallOutcome::Unit => write!(f, "Unit"),
            CallOutcome::Id(id) => f.debug_tuple("Id").field(id).finish(),
            CallOutcome::Value(value) => f.debug_tuple("Value").field(value).finish(),
            CallOutcome::Entity(entity) => f.debug_tuple("Entity").field(entity).finish(),
            CallOutcome::Entities(entities) => f.debug_tuple("Entities").field(entities).finish(),
        }
    }
}

// ============================================================================
// Entity
// ============================================================================

/// Typed accessor handle over one entity node.
///
/// Cheap to clone; identity, equality and hashing all follow the underlying
/// node, so two handles obtained from separate lookups of the same node
/// compare equal and hash identically regardless of how they were obtained.
pub struct Entity<S: GraphStore> {
    node: EntityNode<S>,
    def: Arc<EntityTypeDef>,
    schema: Arc<SchemaSet>,
}

impl<S: GraphStore> Clone for Entity<S> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            def: Arc::clone(&self.def),
            schema: Arc::clone(&self.schema),
        }
    }
}

impl<S: GraphStore> fmt::Debug for Entity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.def.name())
            .field("id", &self.node.id())
            .finish()
    }
}

impl<S: GraphStore> fmt::Display for Entity<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(#{})", self.def.name(), self.node.id())
    }
}

impl<S: GraphStore> PartialEq for Entity<S> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<S: GraphStore> Eq for Entity<S> {}

impl<S: GraphStore> Hash for Entity<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl<S: GraphStore> Entity<S> {
    /// Wrap a tagged node as a typed accessor object.
    ///
    /// The node's own tag picks the definition out of the schema set; a tag
    /// naming no known type fails with [`Error::UnknownEntityType`].
    pub fn new(node: EntityNode<S>, schema: Arc<SchemaSet>) -> Result<Self> {
        let tag = node.entity_type()?;
        let def = schema
            .get(&tag)
            .cloned()
            .ok_or(Error::UnknownEntityType(tag))?;
        Ok(Self { node, def, schema })
    }

    /// The underlying node's engine-assigned id.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// The entity type this handle dispatches as.
    pub fn entity_type(&self) -> &str {
        self.def.name()
    }

    /// The wrapped node, for callers that need raw graph access.
    pub fn node(&self) -> &EntityNode<S> {
        &self.node
    }

    /// The type definition behind this handle.
    pub fn type_def(&self) -> &Arc<EntityTypeDef> {
        &self.def
    }

    /// Delete this entity: every incident relationship, then the node, in
    /// one transaction.
    pub fn delete(self) -> Result<()> {
        self.node.delete()
    }

    // ========================================================================
    // Dynamic invocation
    // ========================================================================

    /// Interpret `accessor` per its declared role.
    ///
    /// The argument count is checked against the role's shape before the
    /// graph is touched: read-style roles take zero arguments, mutators
    /// exactly one.
    pub fn invoke(&self, accessor: &str, args: &[CallArg<'_, S>]) -> Result<CallOutcome<S>> {
        let role = self.role(accessor)?;
        let expected = role.arity();
        if args.len() != expected {
            return Err(Error::Arity {
                accessor: accessor.to_owned(),
                expected,
                got: args.len(),
            });
        }
        tracing::trace!(
            entity_type = self.def.name(),
            accessor,
            role = %role.describe(),
            "dispatch"
        );

        match role {
            AccessorRole::Id => Ok(CallOutcome::Id(self.node.id())),
            AccessorRole::Property { key, action: Action::Read } => {
                Ok(CallOutcome::Value(self.node.property(key)?))
            }
            AccessorRole::Property { key, action: Action::Write } => {
                let value = Self::value_arg(accessor, role, args)?;
                self.node.set_property(key, value)?;
                Ok(CallOutcome::Unit)
            }
            AccessorRole::OneToOne { relation, direction, action: Action::Read } => {
                Ok(CallOutcome::Entity(self.read_one(relation, *direction)?))
            }
            AccessorRole::OneToOne { relation, direction, action: Action::Write } => {
                let target = Self::entity_arg(accessor, role, args)?;
                self.write_one_to_one(relation, *direction, target)?;
                Ok(CallOutcome::Unit)
            }
            AccessorRole::OneToMany { relation, direction, action: CollectionAction::Read } => {
                Ok(CallOutcome::Entities(self.read_many(relation, *direction)?))
            }
            AccessorRole::OneToMany { relation, direction, action: CollectionAction::Add } => {
                let target = Self::entity_arg(accessor, role, args)?;
                self.add_one_to_many(relation, *direction, target)?;
                Ok(CallOutcome::Unit)
            }
            AccessorRole::OneToMany { relation, direction, action: CollectionAction::Remove } => {
                let target = Self::entity_arg(accessor, role, args)?;
                self.remove_one_to_many(relation, *direction, target)?;
                Ok(CallOutcome::Unit)
            }
            AccessorRole::ManyToOne { relation, direction, action: Action::Read } => {
                Ok(CallOutcome::Entity(self.read_one(relation, *direction)?))
            }
            AccessorRole::ManyToOne { relation, direction, action: Action::Write } => {
                let target = Self::entity_arg(accessor, role, args)?;
                self.write_many_to_one(relation, *direction, target)?;
                Ok(CallOutcome::Unit)
            }
            AccessorRole::ManyToMany { relation, direction, action: CollectionAction::Read } => {
                Ok(CallOutcome::Entities(self.read_many(relation, *direction)?))
            }
            AccessorRole::ManyToMany { relation, direction, action: CollectionAction::Add } => {
                let target = Self::entity_arg(accessor, role, args)?;
                self.add_many_to_many(relation, *direction, target)?;
                Ok(CallOutcome::Unit)
            }
            AccessorRole::ManyToMany { relation, direction, action: CollectionAction::Remove } => {
                let target = Self::entity_arg(accessor, role, args)?;
                self.remove_many_to_many(relation, *direction, target)?;
                Ok(CallOutcome::Unit)
            }
        }
    }

    // ========================================================================
    // Typed surface
    // ========================================================================

    /// Read a scalar property through an accessor declared `Property` READ.
    pub fn get(&self, accessor: &str) -> Result<Option<Value>> {
        match self.role(accessor)? {
            AccessorRole::Property { key, action: Action::Read } => self.node.property(key),
            role => Err(self.mismatch(accessor, role, "a property read")),
        }
    }

    /// Write a scalar property through an accessor declared `Property`
    /// WRITE. Writing [`Value::Null`] removes the key.
    pub fn set(&self, accessor: &str, value: impl Into<Value>) -> Result<()> {
        match self.role(accessor)? {
            AccessorRole::Property { key, action: Action::Write } => {
                self.node.set_property(key, value.into())
            }
            role => Err(self.mismatch(accessor, role, "a property write")),
        }
    }

    /// Read the target of a singular relationship accessor (`OneToOne` or
    /// `ManyToOne`, READ). `None` when unlinked.
    pub fn related(&self, accessor: &str) -> Result<Option<Entity<S>>> {
        match self.role(accessor)? {
            AccessorRole::OneToOne { relation, direction, action: Action::Read }
            | AccessorRole::ManyToOne { relation, direction, action: Action::Read } => {
                self.read_one(relation, *direction)
            }
            role => Err(self.mismatch(accessor, role, "a singular relationship read")),
        }
    }

    /// Read the members of a collection relationship accessor (`OneToMany`
    /// or `ManyToMany`, READ). Empty when there are none.
    pub fn related_all(&self, accessor: &str) -> Result<Vec<Entity<S>>> {
        match self.role(accessor)? {
            AccessorRole::OneToMany { relation, direction, action: CollectionAction::Read }
            | AccessorRole::ManyToMany { relation, direction, action: CollectionAction::Read } => {
                self.read_many(relation, *direction)
            }
            role => Err(self.mismatch(accessor, role, "a collection relationship read")),
        }
    }

    /// Replace the target of a singular relationship accessor (`OneToOne`
    /// or `ManyToOne`, WRITE). `None` unlinks.
    pub fn set_related(&self, accessor: &str, target: Option<&Entity<S>>) -> Result<()> {
        match self.role(accessor)? {
            AccessorRole::OneToOne { relation, direction, action: Action::Write } => {
                self.write_one_to_one(relation, *direction, target)
            }
            AccessorRole::ManyToOne { relation, direction, action: Action::Write } => {
                self.write_many_to_one(relation, *direction, target)
            }
            role => Err(self.mismatch(accessor, role, "a singular relationship write")),
        }
    }

    /// Add a member through a collection accessor declared ADD.
    pub fn add_related(&self, accessor: &str, target: &Entity<S>) -> Result<()> {
        match self.role(accessor)? {
            AccessorRole::OneToMany { relation, direction, action: CollectionAction::Add } => {
                self.add_one_to_many(relation, *direction, Some(target))
            }
            AccessorRole::ManyToMany { relation, direction, action: CollectionAction::Add } => {
                self.add_many_to_many(relation, *direction, Some(target))
            }
            role => Err(self.mismatch(accessor, role, "a collection add")),
        }
    }

    /// Remove a member through a collection accessor declared REMOVE.
    /// Removing an absent member is a no-op.
    pub fn remove_related(&self, accessor: &str, target: &Entity<S>) -> Result<()> {
        match self.role(accessor)? {
            AccessorRole::OneToMany { relation, direction, action: CollectionAction::Remove } => {
                self.remove_one_to_many(relation, *direction, Some(target))
            }
            AccessorRole::ManyToMany { relation, direction, action: CollectionAction::Remove } => {
                self.remove_many_to_many(relation, *direction, Some(target))
            }
            role => Err(self.mismatch(accessor, role, "a collection remove")),
        }
    }

    // ========================================================================
    // Role resolution and argument shapes
    // ========================================================================

    fn role(&self, accessor: &str) -> Result<&AccessorRole> {
        self.def.accessor(accessor).ok_or_else(|| Error::UnknownAccessor {
            entity_type: self.def.name().to_owned(),
            accessor: accessor.to_owned(),
        })
    }

    fn mismatch(&self, accessor: &str, role: &AccessorRole, attempted: &str) -> Error {
        Error::ActionMismatch {
            accessor: accessor.to_owned(),
            declared: role.describe(),
            attempted: attempted.to_owned(),
        }
    }

    fn value_arg(accessor: &str, role: &AccessorRole, args: &[CallArg<'_, S>]) -> Result<Value> {
        match &args[0] {
            CallArg::Null => Ok(Value::Null),
            CallArg::Value(value) => Ok(value.clone()),
            CallArg::Entity(_) => Err(Error::ActionMismatch {
                accessor: accessor.to_owned(),
                declared: role.describe(),
                attempted: "a property write with an entity argument".to_owned(),
            }),
        }
    }

    fn entity_arg<'a>(
        accessor: &str,
        role: &AccessorRole,
        args: &[CallArg<'a, S>],
    ) -> Result<Option<&'a Entity<S>>> {
        match &args[0] {
            CallArg::Null | CallArg::Value(Value::Null) => Ok(None),
            CallArg::Entity(entity) => Ok(Some(*entity)),
            CallArg::Value(_) => Err(Error::ActionMismatch {
                accessor: accessor.to_owned(),
                declared: role.describe(),
                attempted: "a relationship write with a scalar argument".to_owned(),
            }),
        }
    }

    // ========================================================================
    // Relationship reads
    // ========================================================================

    fn read_one(&self, relation: &str, direction: Direction) -> Result<Option<Entity<S>>> {
        match self.node.related_entity(relation, direction)? {
            Some(node) => Ok(Some(self.wrap(node)?)),
            None => Ok(None),
        }
    }

    fn read_many(&self, relation: &str, direction: Direction) -> Result<Vec<Entity<S>>> {
        let nodes = self.node.related_entities(relation, direction)?;
        let mut result = Vec::with_capacity(nodes.len());
        for node in nodes {
            result.push(self.wrap(node)?);
        }
        Ok(result)
    }

    /// Wrap a related node with the type its own tag names.
    fn wrap(&self, node: EntityNode<S>) -> Result<Entity<S>> {
        Entity::new(node, Arc::clone(&self.schema))
    }

    // ========================================================================
    // Pairing
    // ========================================================================

    /// Find the complementary accessor's direction on the target's type.
    ///
    /// The scan is kind-filtered, so a declaration of the wrong kind counts
    /// as no declaration. A declaration whose direction is not the exact
    /// reversal of ours is a direction violation.
    fn paired_direction(
        &self,
        target: &Entity<S>,
        relation: &str,
        own_kind: RelationshipKind,
        own_direction: Direction,
    ) -> Result<Direction> {
        let required_kind = own_kind.paired();
        let declared = target
            .def
            .relationship_direction(relation, required_kind)
            .ok_or_else(|| Error::UnknownPairing {
                relation: relation.to_owned(),
                kind: required_kind,
                target_type: target.def.name().to_owned(),
            })?;
        let required = own_direction.reverse();
        if declared != required {
            return Err(Error::PairingDirection {
                relation: relation.to_owned(),
                target_type: target.def.name().to_owned(),
                declared,
                required,
            });
        }
        Ok(declared)
    }

    // ========================================================================
    // Relationship mutations
    // ========================================================================

    /// Both endpoints are exclusive: writing unlinks the target's previous
    /// partner and this node's previous target, then links, as one unit of
    /// work. Writing the current target again changes nothing.
    fn write_one_to_one(
        &self,
        relation: &str,
        direction: Direction,
        target: Option<&Entity<S>>,
    ) -> Result<()> {
        let Some(target) = target else {
            return self.node.delete_single_relationship(relation, direction);
        };
        let paired = self.paired_direction(target, relation, RelationshipKind::OneToOne, direction)?;
        if self.node.is_related_to(&target.node, relation, direction)? {
            return Ok(());
        }
        let tx = self.node.store().begin_tx()?;
        target.node.delete_single_relationship(relation, paired)?;
        self.node.delete_single_relationship(relation, direction)?;
        self.node.create_relationship(&target.node, relation, direction)?;
        tx.commit()
    }

    /// Only this side is exclusive; the far side is a collection and keeps
    /// its other members.
    fn write_many_to_one(
        &self,
        relation: &str,
        direction: Direction,
        target: Option<&Entity<S>>,
    ) -> Result<()> {
        let Some(target) = target else {
            return self.node.delete_single_relationship(relation, direction);
        };
        self.paired_direction(target, relation, RelationshipKind::ManyToOne, direction)?;
        if self.node.is_related_to(&target.node, relation, direction)? {
            return Ok(());
        }
        let tx = self.node.store().begin_tx()?;
        self.node.delete_single_relationship(relation, direction)?;
        self.node.create_relationship(&target.node, relation, direction)?;
        tx.commit()
    }

    /// Adding to the collection moves the target's exclusive link here:
    /// its previous singular edge is deleted in the same transaction that
    /// creates the new one.
    fn add_one_to_many(
        &self,
        relation: &str,
        direction: Direction,
        target: Option<&Entity<S>>,
    ) -> Result<()> {
        let Some(target) = target else {
            return Ok(());
        };
        let paired = self.paired_direction(target, relation, RelationshipKind::OneToMany, direction)?;
        if self.node.is_related_to(&target.node, relation, direction)? {
            return Ok(());
        }
        let tx = self.node.store().begin_tx()?;
        target.node.delete_single_relationship(relation, paired)?;
        self.node.create_relationship(&target.node, relation, direction)?;
        tx.commit()
    }

    /// Unlinks the target only if its exclusive edge points at this node;
    /// a member of some other collection is left alone.
    fn remove_one_to_many(
        &self,
        relation: &str,
        direction: Direction,
        target: Option<&Entity<S>>,
    ) -> Result<()> {
        let Some(target) = target else {
            return Ok(());
        };
        let paired = self.paired_direction(target, relation, RelationshipKind::OneToMany, direction)?;
        target.node.delete_relationships_to(&self.node, relation, paired)
    }

    fn add_many_to_many(
        &self,
        relation: &str,
        direction: Direction,
        target: Option<&Entity<S>>,
    ) -> Result<()> {
        let Some(target) = target else {
            return Ok(());
        };
        self.paired_direction(target, relation, RelationshipKind::ManyToMany, direction)?;
        // Double-add is a no-op.
        if self.node.is_related_to(&target.node, relation, direction)? {
            return Ok(());
        }
        self.node.create_relationship(&target.node, relation, direction)
    }

    fn remove_many_to_many(
        &self,
        relation: &str,
        direction: Direction,
        target: Option<&Entity<S>>,
    ) -> Result<()> {
        let Some(target) = target else {
            return Ok(());
        };
        self.paired_direction(target, relation, RelationshipKind::ManyToMany, direction)?;
        self.node.delete_relationships_to(&target.node, relation, direction)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use crate::store::MemoryStore;

    fn engine(defs: Vec<EntityTypeDef>) -> (TypeRegistry<MemoryStore>, Arc<SchemaSet>) {
        let schema = Arc::new(SchemaSet::new(defs).unwrap());
        let registry = TypeRegistry::new(Arc::new(MemoryStore::new()), Arc::clone(&schema));
        registry.add_definitions(schema.names()).unwrap();
        (registry, schema)
    }

    fn spawn(
        registry: &TypeRegistry<MemoryStore>,
        schema: &Arc<SchemaSet>,
        entity_type: &str,
    ) -> Entity<MemoryStore> {
        let node = registry.create_node(entity_type).unwrap();
        Entity::new(node, Arc::clone(schema)).unwrap()
    }

    fn person_def() -> EntityTypeDef {
        EntityTypeDef::builder("Person")
            .id("id")
            .property("name", "name", Action::Read)
            .property("set_name", "name", Action::Write)
            .one_to_one("spouse", "SPOUSE", Direction::Both, Action::Read)
            .one_to_one("set_spouse", "SPOUSE", Direction::Both, Action::Write)
            .build()
            .unwrap()
    }

    #[test]
    fn test_unknown_accessor() {
        let (registry, schema) = engine(vec![person_def()]);
        let person = spawn(&registry, &schema, "Person");
        assert!(matches!(
            person.invoke("missing", &[]),
            Err(Error::UnknownAccessor { .. })
        ));
    }

    #[test]
    fn test_arity_checked_before_dispatch() {
        let (registry, schema) = engine(vec![person_def()]);
        let person = spawn(&registry, &schema, "Person");

        assert!(matches!(
            person.invoke("name", &[CallArg::Value(Value::from("Ada"))]),
            Err(Error::Arity { expected: 0, got: 1, .. })
        ));
        assert!(matches!(
            person.invoke("set_name", &[]),
            Err(Error::Arity { expected: 1, got: 0, .. })
        ));
        assert_eq!(person.get("name").unwrap(), None);
    }

    #[test]
    fn test_action_mismatch() {
        let (registry, schema) = engine(vec![person_def()]);
        let person = spawn(&registry, &schema, "Person");

        // "name" is declared READ; invoking it as a write fails.
        assert!(matches!(
            person.set("name", "Ada"),
            Err(Error::ActionMismatch { .. })
        ));
        // A property accessor cannot be used as a relationship read.
        assert!(matches!(
            person.related("name"),
            Err(Error::ActionMismatch { .. })
        ));
        // A relationship accessor cannot be used as a property read.
        assert!(matches!(
            person.get("spouse"),
            Err(Error::ActionMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_argument_kind() {
        let (registry, schema) = engine(vec![person_def()]);
        let a = spawn(&registry, &schema, "Person");
        let b = spawn(&registry, &schema, "Person");

        assert!(matches!(
            a.invoke("set_name", &[CallArg::Entity(&b)]),
            Err(Error::ActionMismatch { .. })
        ));
        assert!(matches!(
            a.invoke("set_spouse", &[CallArg::Value(Value::from(1))]),
            Err(Error::ActionMismatch { .. })
        ));
    }

    #[test]
    fn test_invoke_property_round_trip() {
        let (registry, schema) = engine(vec![person_def()]);
        let person = spawn(&registry, &schema, "Person");

        let outcome = person
            .invoke("set_name", &[CallArg::Value(Value::from("Ada"))])
            .unwrap();
        assert!(matches!(outcome, CallOutcome::Unit));

        match person.invoke("name", &[]).unwrap() {
            CallOutcome::Value(value) => assert_eq!(value, Some(Value::from("Ada"))),
            other => panic!("unexpected outcome {other:?}"),
        }
        match person.invoke("id", &[]).unwrap() {
            CallOutcome::Id(id) => assert_eq!(id, person.id()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_pairing_violation_leaves_graph_unchanged() {
        // Team declares nothing for SPOUSE, so writing a Person's spouse to
        // a Team must fail and mutate nothing.
        let team = EntityTypeDef::builder("Team").build().unwrap();
        let (registry, schema) = engine(vec![person_def(), team]);
        let person = spawn(&registry, &schema, "Person");
        let team = spawn(&registry, &schema, "Team");

        let rels_before = registry.store().relationship_count().unwrap();
        assert!(matches!(
            person.set_related("set_spouse", Some(&team)),
            Err(Error::UnknownPairing { .. })
        ));
        assert_eq!(registry.store().relationship_count().unwrap(), rels_before);
        assert_eq!(person.related("spouse").unwrap(), None);
    }

    #[test]
    fn test_wrong_kind_is_unknown_pairing() {
        // Club declares SPOUSE, but as many-to-many; the kind-filtered scan
        // treats that as no pairing at all.
        let club = EntityTypeDef::builder("Club")
            .many_to_many("spouses", "SPOUSE", Direction::Both, CollectionAction::Read)
            .build()
            .unwrap();
        let (registry, schema) = engine(vec![person_def(), club]);
        let person = spawn(&registry, &schema, "Person");
        let club = spawn(&registry, &schema, "Club");

        assert!(matches!(
            person.set_related("set_spouse", Some(&club)),
            Err(Error::UnknownPairing { .. })
        ));
    }

    #[test]
    fn test_direction_violation() {
        // Both sides declare OUTGOING; the far side must be the reversal.
        let owner = EntityTypeDef::builder("Owner")
            .one_to_one("pet", "OWNS", Direction::Outgoing, Action::Read)
            .one_to_one("set_pet", "OWNS", Direction::Outgoing, Action::Write)
            .build()
            .unwrap();
        let pet = EntityTypeDef::builder("Pet")
            .one_to_one("owner", "OWNS", Direction::Outgoing, Action::Read)
            .build()
            .unwrap();
        let (registry, schema) = engine(vec![owner, pet]);
        let owner = spawn(&registry, &schema, "Owner");
        let pet = spawn(&registry, &schema, "Pet");

        assert!(matches!(
            owner.set_related("set_pet", Some(&pet)),
            Err(Error::PairingDirection { .. })
        ));
        assert_eq!(owner.related("pet").unwrap(), None);
    }

    #[test]
    fn test_identity_follows_node() {
        use std::collections::hash_map::DefaultHasher;

        let (registry, schema) = engine(vec![person_def()]);
        let person = spawn(&registry, &schema, "Person");

        let other = Entity::new(
            registry.get(person.id(), "Person").unwrap(),
            Arc::clone(&schema),
        )
        .unwrap();

        assert_eq!(person, other);
        let hash = |e: &Entity<MemoryStore>| {
            let mut h = DefaultHasher::new();
            e.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&person), hash(&other));
        assert_eq!(person.to_string(), format!("Person(#{})", person.id()));
    }
}
