//! # entigraph — Typed Object-Graph Mapping
//!
//! Projects a declaratively defined entity schema (typed records with named
//! scalar properties and typed, directed, cardinality-constrained
//! relationships) onto any property graph that implements the small
//! [`GraphStore`] port, and lets callers manipulate entities through typed
//! accessor calls instead of raw graph operations.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: [`GraphStore`] is the contract between the mapping engine and storage
//! 2. **Clean DTOs**: [`Node`], [`Relationship`], [`Value`] cross all boundaries
//! 3. **Closed dispatch**: accessor roles are a tagged enum interpreted by a plain match,
//!    with no runtime introspection
//! 4. **Graph-resident registry**: registered types live in the store itself, not in
//!    process memory, and survive as long as the store does
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use entigraph::{
//!     Action, CollectionAction, Direction, EntityTypeDef, MemoryStore, SessionFactory,
//! };
//!
//! # fn main() -> entigraph::Result<()> {
//! let team = EntityTypeDef::builder("Team")
//!     .property("name", "name", Action::Read)
//!     .property("set_name", "name", Action::Write)
//!     .one_to_many("members", "MEMBERS", Direction::Outgoing, CollectionAction::Read)
//!     .one_to_many("add_member", "MEMBERS", Direction::Outgoing, CollectionAction::Add)
//!     .build()?;
//! let person = EntityTypeDef::builder("Person")
//!     .many_to_one("team", "MEMBERS", Direction::Incoming, Action::Read)
//!     .many_to_one("set_team", "MEMBERS", Direction::Incoming, Action::Write)
//!     .build()?;
//!
//! let factory = SessionFactory::builder()
//!     .store(Arc::new(MemoryStore::new()))
//!     .register(team)
//!     .register(person)
//!     .build()?;
//! let session = factory.session();
//!
//! let team = session.create("Team")?;
//! team.set("set_name", "Graph")?;
//! let ada = session.create("Person")?;
//! team.add_related("add_member", &ada)?;
//!
//! assert_eq!(ada.related("team")?, Some(team.clone()));
//! assert_eq!(team.related_all("members")?.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stores
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | [`MemoryStore`] | `store::memory` | In-memory graph for testing and embedding |
//!
//! Any backend implementing [`GraphStore`] plugs in underneath the engine
//! without changes above the port.

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod store;
pub mod schema;
pub mod entity;
pub mod registry;
pub mod dispatch;
pub mod session;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{Direction, Node, NodeId, PropertyMap, RelId, Relationship, Value};

// ============================================================================
// Re-exports: Store port
// ============================================================================

pub use store::{GraphStore, MemoryStore, StoreTx};

// ============================================================================
// Re-exports: Schema
// ============================================================================

pub use schema::{
    Accessor, AccessorRole, Action, CollectionAction, EntityTypeDef, EntityTypeDefBuilder,
    RelationshipKind, SchemaSet,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use dispatch::{CallArg, CallOutcome, Entity};
pub use entity::{CLASS_PROPERTY_KEY, EntityNode};
pub use registry::{ENTITY_REF_TYPE, TypeRegistry};
pub use session::{Session, SessionFactory, SessionFactoryBuilder};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation referenced an entity type that is not declared in the
    /// schema, or declared but not registered against the store.
    #[error("unknown entity type '{0}'")]
    UnknownEntityType(String),

    /// A node's tag does not match the type the caller asserted.
    #[error("node {id} is tagged '{found}', not '{expected}'")]
    TypeMismatch { id: NodeId, expected: String, found: String },

    /// A node expected to be an entity carries no type tag.
    #[error("node {0} carries no entity type tag")]
    UntaggedNode(NodeId),

    /// Invalid schema declaration or engine configuration.
    #[error("schema error: {0}")]
    Schema(String),

    /// An invocation named an accessor the entity type does not declare.
    #[error("entity type '{entity_type}' declares no accessor '{accessor}'")]
    UnknownAccessor { entity_type: String, accessor: String },

    /// Wrong argument count for the accessor's read/write shape.
    #[error("accessor '{accessor}' takes {expected} argument(s), got {got}")]
    Arity { accessor: String, expected: usize, got: usize },

    /// The call does not match the accessor's declared role or action.
    #[error("accessor '{accessor}' is declared {declared}, invoked as {attempted}")]
    ActionMismatch { accessor: String, declared: String, attempted: String },

    /// No complementary accessor of the required kind exists on the target
    /// type for this relation.
    #[error("entity type '{target_type}' declares no {kind} accessor for relation '{relation}'")]
    UnknownPairing { relation: String, kind: RelationshipKind, target_type: String },

    /// The complementary accessor exists but its direction is not the exact
    /// reversal of this side's.
    #[error(
        "relation '{relation}' on '{target_type}' is declared {declared:?}, \
         its pairing requires {required:?}"
    )]
    PairingDirection {
        relation: String,
        target_type: String,
        declared: Direction,
        required: Direction,
    },

    /// A singular relationship lookup matched more than one edge. Stored
    /// data violates the cardinality the schema declares; surfaced, never
    /// auto-repaired.
    #[error(
        "expected at most one '{label}' relationship ({direction:?}) on node {node}, found {found}"
    )]
    Multiplicity {
        node: NodeId,
        label: String,
        direction: Direction,
        found: usize,
    },

    /// An attempt to write the entity type tag through the property path.
    #[error("property key '{0}' is reserved")]
    ReservedKey(String),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("relationship {0} not found")]
    RelationshipNotFound(RelId),

    /// A mutating store operation was attempted with no open transaction.
    #[error("no open transaction")]
    NotInTransaction,

    #[error("transaction error: {0}")]
    Tx(String),

    #[error("storage error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
