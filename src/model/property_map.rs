//! Property map stored on each node.

use hashbrown::HashMap;

use super::Value;

/// A map of property names to values.
pub type PropertyMap = HashMap<String, Value>;
