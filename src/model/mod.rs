//! # Property Graph Model
//!
//! Plain data types shared across the crate: identifiers, the node and
//! relationship records handed back by a store, and the property [`Value`]
//! type. This module is pure data with no I/O and no store handles.

pub mod node;
pub mod relationship;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId};
pub use relationship::{Direction, RelId, Relationship};
pub use value::{IsoDuration, Value};
pub use property_map::PropertyMap;
