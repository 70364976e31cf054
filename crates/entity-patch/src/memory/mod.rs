//! In-process backend: a declared schema plus an in-memory store.
//!
//! [`Schema`] answers both [`SchemaAdapter`](crate::SchemaAdapter) and
//! [`Binder`](crate::Binder); [`MemoryStore`] implements
//! [`Store`](crate::Store) with nested transactions. Keeping them separate
//! lets a [`Context`](crate::Context) borrow the store mutably while sharing
//! the schema.

pub mod schema;
pub mod store;

pub use schema::{FieldDef, FieldType, ModelDef, ScalarType, Schema};
pub use store::MemoryStore;
