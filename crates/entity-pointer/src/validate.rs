//! Size limits for untrusted pointers.

use crate::util::parse_parts;
use crate::PointerError;

/// Maximum pointer length in bytes.
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Maximum number of parts after parsing.
pub const MAX_PATH_LENGTH: usize = 256;

/// Validate a pointer string.
///
/// Relative pointers are accepted; only the size is checked.
///
/// ```
/// use entity_pointer::validate_pointer;
///
/// validate_pointer("").unwrap();
/// validate_pointer("/0/books/0").unwrap();
/// validate_pointer(&"/a".repeat(600)).unwrap_err();
/// ```
pub fn validate_pointer(pointer: &str) -> Result<(), PointerError> {
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(PointerError::TooLong(pointer.len()));
    }
    validate_path(&parse_parts(pointer))
}

/// Checks the depth of already parsed parts.
pub fn validate_path(path: &[String]) -> Result<(), PointerError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(PointerError::TooDeep(path.len()));
    }
    Ok(())
}
