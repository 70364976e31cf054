//! JSON Patch over graphs of stored entities.
//!
//! A patch is an ordered list of `{"op", "path", "value"}` descriptors. Paths
//! are [`Pointer`]s walked from a root [`Node`]: integer parts index into
//! sequences, other parts name fields on entities. Relations are followed
//! through a [`Store`], with a [`SchemaAdapter`] deciding what each field
//! is and a [`Binder`] turning raw values into validated field data.
//!
//! [`memory`] ships an in-process backend that implements all three seams.
//!
//! # Example
//!
//! ```
//! use entity_patch::memory::{FieldDef, MemoryStore, ModelDef, Schema};
//! use entity_patch::{Context, Node, Patch, Query, Sequence};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .model(ModelDef::new("author").field("name", FieldDef::string().max_length(255)))
//!     .model(
//!         ModelDef::new("book")
//!             .field("title", FieldDef::string())
//!             .field("author", FieldDef::foreign_key("author").related_name("books")),
//!     );
//! let mut store = MemoryStore::new();
//! let mut ctx = Context::new(&mut store, &schema, &schema);
//!
//! let mut root = Node::Sequence(Sequence::relation(Query::all("author")));
//! let patch = Patch::from_json(&json!([
//!     {"op": "add", "path": "/0", "value": {"name": "Jane"}},
//!     {"op": "add", "path": "/0/books/-", "value": {"title": "Emma"}},
//!     {"op": "test", "path": "/0/books/0/title", "value": "Emma"},
//! ]))
//! .unwrap();
//! let result = patch.apply(&mut root, &mut ctx).unwrap();
//! assert_eq!(result.res.len(), 3);
//! assert_eq!(result.res[1].entity.as_ref().unwrap().get("author"), json!(1));
//! ```

pub mod binder;
pub mod context;
pub mod error;
pub mod memory;
pub mod node;
pub mod patch;
pub mod resolve;
pub mod schema;
pub mod store;

pub use binder::{Binder, Binding, ValidationErrors};
pub use context::{Context, TransactionScope};
pub use entity_pointer::Pointer;
pub use error::{Error, PatchError, PointerError, Result, StoreError};
pub use node::{Entity, EntityId, Filter, Node, Query, Sequence};
pub use patch::{ApplyOptions, Op, OpResult, Patch, PatchResult, Verb};
pub use resolve::{Resolver, Target};
pub use schema::{FieldKind, SchemaAdapter};
pub use store::Store;
