//! Accessor roles and the closed set of actions they support.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Direction;

/// What a scalar or singular accessor does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Read,
    Write,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Read => write!(f, "READ"),
            Action::Write => write!(f, "WRITE"),
        }
    }
}

/// What a collection accessor does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionAction {
    Read,
    Add,
    Remove,
}

impl fmt::Display for CollectionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionAction::Read => write!(f, "READ"),
            CollectionAction::Add => write!(f, "ADD"),
            CollectionAction::Remove => write!(f, "REMOVE"),
        }
    }
}

/// Cardinality class of a relationship accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipKind {
    /// The kind the far side of the relation must declare.
    ///
    /// One-to-one and many-to-many pair with themselves; the two sides of a
    /// one-to-many pair with each other.
    pub fn paired(self) -> RelationshipKind {
        match self {
            RelationshipKind::OneToOne => RelationshipKind::OneToOne,
            RelationshipKind::OneToMany => RelationshipKind::ManyToOne,
            RelationshipKind::ManyToOne => RelationshipKind::OneToMany,
            RelationshipKind::ManyToMany => RelationshipKind::ManyToMany,
        }
    }

    /// Whether an accessor of this kind yields a collection.
    pub fn is_collection(self) -> bool {
        matches!(self, RelationshipKind::OneToMany | RelationshipKind::ManyToMany)
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::OneToOne => write!(f, "one-to-one"),
            RelationshipKind::OneToMany => write!(f, "one-to-many"),
            RelationshipKind::ManyToOne => write!(f, "many-to-one"),
            RelationshipKind::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

/// The declared role of one accessor on an entity type.
///
/// This is a closed set: dispatch is a plain match over these variants, and
/// everything the engine needs to interpret a call is carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessorRole {
    /// Yields the id of the underlying node. Read-only.
    Id,
    /// Reads or writes one scalar property under `key`.
    Property { key: String, action: Action },
    /// Singular relation whose far side is singular too.
    OneToOne {
        relation: String,
        direction: Direction,
        action: Action,
    },
    /// Collection side of a one-to-many relation.
    OneToMany {
        relation: String,
        direction: Direction,
        action: CollectionAction,
    },
    /// Exclusive (singular) side of a one-to-many relation.
    ManyToOne {
        relation: String,
        direction: Direction,
        action: Action,
    },
    /// Collection relation whose far side is a collection too.
    ManyToMany {
        relation: String,
        direction: Direction,
        action: CollectionAction,
    },
}

impl AccessorRole {
    /// The relationship kind, or `None` for id and property roles.
    pub fn kind(&self) -> Option<RelationshipKind> {
        match self {
            AccessorRole::Id | AccessorRole::Property { .. } => None,
            AccessorRole::OneToOne { .. } => Some(RelationshipKind::OneToOne),
            AccessorRole::OneToMany { .. } => Some(RelationshipKind::OneToMany),
            AccessorRole::ManyToOne { .. } => Some(RelationshipKind::ManyToOne),
            AccessorRole::ManyToMany { .. } => Some(RelationshipKind::ManyToMany),
        }
    }

    /// The relation label, or `None` for id and property roles.
    pub fn relation(&self) -> Option<&str> {
        match self {
            AccessorRole::Id | AccessorRole::Property { .. } => None,
            AccessorRole::OneToOne { relation, .. }
            | AccessorRole::OneToMany { relation, .. }
            | AccessorRole::ManyToOne { relation, .. }
            | AccessorRole::ManyToMany { relation, .. } => Some(relation),
        }
    }

    /// The declared direction, or `None` for id and property roles.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            AccessorRole::Id | AccessorRole::Property { .. } => None,
            AccessorRole::OneToOne { direction, .. }
            | AccessorRole::OneToMany { direction, .. }
            | AccessorRole::ManyToOne { direction, .. }
            | AccessorRole::ManyToMany { direction, .. } => Some(*direction),
        }
    }

    /// Number of arguments an invocation of this role takes: zero for
    /// read-shaped roles, one for mutators.
    pub fn arity(&self) -> usize {
        match self {
            AccessorRole::Id => 0,
            AccessorRole::Property { action, .. }
            | AccessorRole::OneToOne { action, .. }
            | AccessorRole::ManyToOne { action, .. } => match action {
                Action::Read => 0,
                Action::Write => 1,
            },
            AccessorRole::OneToMany { action, .. }
            | AccessorRole::ManyToMany { action, .. } => match action {
                CollectionAction::Read => 0,
                CollectionAction::Add | CollectionAction::Remove => 1,
            },
        }
    }

    /// Short description for error messages, e.g. `"one-to-many (ADD)"`.
    pub fn describe(&self) -> String {
        match self {
            AccessorRole::Id => "id".to_owned(),
            AccessorRole::Property { action, .. } => format!("property ({action})"),
            AccessorRole::OneToOne { action, .. } => format!("one-to-one ({action})"),
            AccessorRole::OneToMany { action, .. } => format!("one-to-many ({action})"),
            AccessorRole::ManyToOne { action, .. } => format!("many-to-one ({action})"),
            AccessorRole::ManyToMany { action, .. } => format!("many-to-many ({action})"),
        }
    }
}
