//! Immutable set of entity type definitions.

use std::sync::Arc;

use hashbrown::HashMap;

use super::entity_type::EntityTypeDef;
use crate::{Error, Result};

/// All entity types known to one mapping engine instance, indexed by name.
///
/// Built once, then shared behind an `Arc` by every session, registry and
/// entity handle. Definitions are wrapped in `Arc` so handing one to an
/// entity handle is a pointer copy.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    types: HashMap<String, Arc<EntityTypeDef>>,
}

impl SchemaSet {
    /// Collect definitions into a set. Duplicate type names are rejected.
    pub fn new(defs: impl IntoIterator<Item = EntityTypeDef>) -> Result<Self> {
        let mut types = HashMap::new();
        for def in defs {
            let name = def.name().to_owned();
            if types.insert(name.clone(), Arc::new(def)).is_some() {
                return Err(Error::Schema(format!("duplicate entity type '{name}'")));
            }
        }
        Ok(Self { types })
    }

    pub fn get(&self, entity_type: &str) -> Option<&Arc<EntityTypeDef>> {
        self.types.get(entity_type)
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.types.contains_key(entity_type)
    }

    /// All type names, sorted for deterministic iteration.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
