//! Field classification seam between the resolver and a storage backend.

use serde::{Deserialize, Serialize};

/// How a named field on an entity kind behaves during traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// A plain value, reached by attribute access.
    Scalar,
    /// A foreign key; the field holds the id of one `related` entity.
    ToOne { related: String },
    /// A reverse relation; entities of kind `related` whose `back_ref`
    /// field holds this entity's id.
    ToMany { related: String, back_ref: String },
    /// The kind has no such field.
    Unknown,
}

/// Reports the [`FieldKind`] of `field` on entities of `kind`.
pub trait SchemaAdapter {
    fn classify(&self, kind: &str, field: &str) -> FieldKind;
}
