//! Entity type definitions and their builder.

use serde::{Deserialize, Serialize};

use super::accessor::{Action, AccessorRole, CollectionAction, RelationshipKind};
use crate::entity::CLASS_PROPERTY_KEY;
use crate::model::Direction;
use crate::{Error, Result};

/// One named accessor and its declared role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessor {
    pub name: String,
    pub role: AccessorRole,
}

/// Declarative description of one entity type: a unique name plus the
/// accessors callers may invoke on its instances.
///
/// Built through [`EntityTypeDef::builder`] (or deserialized from JSON) and
/// immutable afterwards. Accessor order is declaration order; pairing
/// lookups scan in that order and take the first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTypeDef {
    name: String,
    accessors: Vec<Accessor>,
}

impl EntityTypeDef {
    pub fn builder(name: impl Into<String>) -> EntityTypeDefBuilder {
        EntityTypeDefBuilder {
            name: name.into(),
            accessors: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The role declared under `accessor`, if any.
    pub fn accessor(&self, accessor: &str) -> Option<&AccessorRole> {
        self.accessors
            .iter()
            .find(|a| a.name == accessor)
            .map(|a| &a.role)
    }

    /// All accessors in declaration order.
    pub fn accessors(&self) -> impl Iterator<Item = &Accessor> {
        self.accessors.iter()
    }

    /// Direction of the first accessor of `kind` declared over `relation`.
    ///
    /// This is the pairing lookup: the dispatch layer asks the far side's
    /// type for a complementary accessor on the same relation.
    pub fn relationship_direction(
        &self,
        relation: &str,
        kind: RelationshipKind,
    ) -> Option<Direction> {
        self.accessors
            .iter()
            .map(|a| &a.role)
            .find(|role| role.kind() == Some(kind) && role.relation() == Some(relation))
            .and_then(AccessorRole::direction)
    }

    /// Parse a definition from JSON, applying the same validation as the
    /// builder.
    pub fn from_json(json: &str) -> Result<Self> {
        let def: EntityTypeDef =
            serde_json::from_str(json).map_err(|e| Error::Schema(e.to_string()))?;
        def.validate()?;
        Ok(def)
    }

    /// Serialize the definition to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Schema(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Schema("entity type name is empty".into()));
        }
        for (i, accessor) in self.accessors.iter().enumerate() {
            if accessor.name.is_empty() {
                return Err(Error::Schema(format!(
                    "unnamed accessor on entity type '{}'",
                    self.name
                )));
            }
            if self.accessors[..i].iter().any(|a| a.name == accessor.name) {
                return Err(Error::Schema(format!(
                    "duplicate accessor '{}' on entity type '{}'",
                    accessor.name, self.name
                )));
            }
            match &accessor.role {
                AccessorRole::Property { key, .. } => {
                    if key.is_empty() {
                        return Err(Error::Schema(format!(
                            "accessor '{}' on '{}' has an empty property key",
                            accessor.name, self.name
                        )));
                    }
                    if key == CLASS_PROPERTY_KEY {
                        return Err(Error::Schema(format!(
                            "accessor '{}' on '{}' declares the reserved key '{}'",
                            accessor.name, self.name, CLASS_PROPERTY_KEY
                        )));
                    }
                }
                role => {
                    if role.relation() == Some("") {
                        return Err(Error::Schema(format!(
                            "accessor '{}' on '{}' has an empty relation label",
                            accessor.name, self.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`EntityTypeDef`].
///
/// Each method declares one accessor; an accessor maps one call name to one
/// action, so a read/write property needs two declarations (one `Read`, one
/// `Write`), matching how the dispatch layer checks actions.
#[derive(Debug, Clone)]
pub struct EntityTypeDefBuilder {
    name: String,
    accessors: Vec<Accessor>,
}

impl EntityTypeDefBuilder {
    /// Declare an accessor with an explicit role.
    pub fn accessor(mut self, name: impl Into<String>, role: AccessorRole) -> Self {
        self.accessors.push(Accessor { name: name.into(), role });
        self
    }

    /// Declare a read-only id accessor.
    pub fn id(self, name: impl Into<String>) -> Self {
        self.accessor(name, AccessorRole::Id)
    }

    /// Declare a scalar property accessor over `key`.
    pub fn property(
        self,
        name: impl Into<String>,
        key: impl Into<String>,
        action: Action,
    ) -> Self {
        self.accessor(name, AccessorRole::Property { key: key.into(), action })
    }

    pub fn one_to_one(
        self,
        name: impl Into<String>,
        relation: impl Into<String>,
        direction: Direction,
        action: Action,
    ) -> Self {
        self.accessor(
            name,
            AccessorRole::OneToOne { relation: relation.into(), direction, action },
        )
    }

    pub fn one_to_many(
        self,
        name: impl Into<String>,
        relation: impl Into<String>,
        direction: Direction,
        action: CollectionAction,
    ) -> Self {
        self.accessor(
            name,
            AccessorRole::OneToMany { relation: relation.into(), direction, action },
        )
    }

    pub fn many_to_one(
        self,
        name: impl Into<String>,
        relation: impl Into<String>,
        direction: Direction,
        action: Action,
    ) -> Self {
        self.accessor(
            name,
            AccessorRole::ManyToOne { relation: relation.into(), direction, action },
        )
    }

    pub fn many_to_many(
        self,
        name: impl Into<String>,
        relation: impl Into<String>,
        direction: Direction,
        action: CollectionAction,
    ) -> Self {
        self.accessor(
            name,
            AccessorRole::ManyToMany { relation: relation.into(), direction, action },
        )
    }

    /// Validate and finish the definition.
    pub fn build(self) -> Result<EntityTypeDef> {
        let def = EntityTypeDef {
            name: self.name,
            accessors: self.accessors,
        };
        def.validate()?;
        Ok(def)
    }
}
