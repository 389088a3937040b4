//! # Entity Schema
//!
//! Declarative description of the entity types an application maps onto the
//! graph. A [`SchemaSet`] holds one [`EntityTypeDef`] per type; each type
//! declares named accessors whose [`AccessorRole`] tells the dispatch layer
//! what an invocation means.
//!
//! Definitions are plain data, built once up front and never mutated after
//! registration. They serialize to JSON, so a schema can live in a config
//! file as well as in code.

pub mod accessor;
pub mod entity_type;
pub mod schema_set;

pub use accessor::{AccessorRole, Action, CollectionAction, RelationshipKind};
pub use entity_type::{Accessor, EntityTypeDef, EntityTypeDefBuilder};
pub use schema_set::SchemaSet;
