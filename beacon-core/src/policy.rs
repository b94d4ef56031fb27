//! Inflation policy tree.
//!
//! An `InflationPolicy` names which relation fields of a requested entity
//! the caller wants populated, recursively. It is built once per read
//! request from the client's field-selection expression (see the
//! `beacon-policy` crate for the parser), is immutable afterwards, and is
//! discarded when the request completes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which sub-fields of an entity to populate.
///
/// Maps field name to an optional child policy: `None` means the field was
/// requested as a leaf (no further nesting), `Some` carries the nested
/// selection. An empty policy requests nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InflationPolicy {
    children: HashMap<String, Option<InflationPolicy>>,
}

impl InflationPolicy {
    /// The empty policy: no fields requested, populate nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a policy from parsed children. Used by the parser; callers
    /// normally never construct policies by hand.
    pub fn from_children(children: HashMap<String, Option<InflationPolicy>>) -> Self {
        Self { children }
    }

    /// Whether the caller requested `field` on this entity.
    pub fn has_child_field(&self, field: &str) -> bool {
        self.children.contains_key(field)
    }

    /// The nested policy for `field`, if the caller requested one.
    ///
    /// Returns `None` both when the field was not requested and when it was
    /// requested as a leaf; use [`has_child_field`](Self::has_child_field)
    /// to tell the two apart.
    pub fn child_policy(&self, field: &str) -> Option<&InflationPolicy> {
        self.children.get(field).and_then(|child| child.as_ref())
    }

    /// Names of the requested fields, in no particular order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// True when no fields are requested.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of requested fields on this node.
    pub fn len(&self) -> usize {
        self.children.len()
    }
}
