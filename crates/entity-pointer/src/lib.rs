//! Pointers into entity graphs.
//!
//! A pointer is a `/`-delimited path such as `/0/books/1/title`. Each part is
//! either an integer position inside a collection or a field name on an
//! entity; which one is decided by whoever walks the pointer, not by the
//! pointer itself.
//!
//! Parsing is deliberately lenient: the leading `/` is optional and blank
//! segments are dropped, so `""`, `"/"` and `"/ "` all point at the root.
//! Components are unescaped per RFC 6901 (`~1` is `/`, `~0` is `~`).
//!
//! # Example
//!
//! ```
//! use entity_pointer::{Pointer, parse_index};
//!
//! let pointer = Pointer::new("/0/books/1");
//! assert_eq!(pointer.parts(), ["0", "books", "1"]);
//!
//! let (parent, last) = pointer.split_last();
//! assert_eq!(parent, ["0", "books"]);
//! assert_eq!(last, Some("1"));
//!
//! assert_eq!(parse_index("1"), Ok(1));
//! assert!(parse_index("books").is_err());
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep, Pointer};

pub mod util;
pub use util::{
    escape_component, format_pointer, is_valid_index, parse_index, parse_parts, unescape_component,
};

pub mod validate;
pub use validate::{validate_path, validate_pointer, MAX_PATH_LENGTH, MAX_POINTER_LENGTH};

/// Errors raised while parsing or walking a pointer.
///
/// The traversal variants carry only names and tokens so that this crate
/// stays independent of any concrete node model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("index is not an int: {0}")]
    IndexNotInt(String),
    #[error("index does not exist: {0}")]
    IndexOutOfRange(String),
    #[error("expected an entity, got {0}")]
    ExpectedEntity(String),
    #[error("unknown field type {kind}:{field}")]
    UnknownField { kind: String, field: String },
    #[error("pointer too long: {0} characters")]
    TooLong(usize),
    #[error("pointer too deep: {0} parts")]
    TooDeep(usize),
}
