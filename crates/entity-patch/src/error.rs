//! Error types for patch application.

use serde_json::Value;
use thiserror::Error;

pub use entity_pointer::PointerError;

use crate::binder::ValidationErrors;
use crate::node::EntityId;

/// Result type alias for patch operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A malformed patch document or a verb-level rule violation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    #[error("missing operation type")]
    MissingOp,
    #[error("missing operation path")]
    MissingPath,
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("invalid operation: {0}")]
    InvalidOp(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("entry exists at position: {0}")]
    EntryExists(String),
    #[error("index is not an int: {0}")]
    IndexNotInt(String),
    #[error("index does not exist: {0}")]
    IndexOutOfRange(String),
    #[error("failed validation: {0}")]
    FailedValidation(ValidationErrors),
    #[error("value does not match: expected {expected}, got {actual}")]
    ValueMismatch { expected: Value, actual: Value },
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

/// Failures reported by a [`Store`](crate::Store) implementation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("{kind} with id {id} does not exist")]
    NotFound { kind: String, id: EntityId },
    #[error("{0} has not been saved")]
    Unsaved(String),
    #[error("rejected by storage: {0}")]
    Validation(ValidationErrors),
    #[error("not supported by this store: {0}")]
    Unsupported(String),
    #[error("storage failure: {0}")]
    Backend(String),
}

/// Everything that can abort a patch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Pointer(#[from] PointerError),
    /// A reserved verb (`move`, `copy`) was applied.
    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            // Storage-level validation reads the same as binder validation.
            StoreError::Validation(errors) => Error::Patch(PatchError::FailedValidation(errors)),
            other => Error::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_validation_becomes_patch_error() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "This field is required.");
        let err: Error = StoreError::Validation(errors.clone()).into();
        assert_eq!(err, Error::Patch(PatchError::FailedValidation(errors)));
    }

    #[test]
    fn other_store_errors_stay_store_errors() {
        let err: Error = StoreError::Unsaved("author".into()).into();
        assert!(matches!(err, Error::Store(StoreError::Unsaved(_))));
    }

    #[test]
    fn mismatch_message_shows_both_values() {
        let err = PatchError::ValueMismatch {
            expected: json!("Bob"),
            actual: json!("Jeff"),
        };
        assert_eq!(
            err.to_string(),
            "value does not match: expected \"Bob\", got \"Jeff\""
        );
    }
}
