//! Type definitions for pointers.

use std::fmt;

use crate::util::parse_parts;

/// A single unescaped pointer token.
pub type PathStep = String;

/// A parsed pointer path.
pub type Path = Vec<PathStep>;

/// A parsed pointer.
///
/// Keeps the original string for error messages and logging alongside the
/// derived parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    path: String,
    parts: Path,
}

impl Pointer {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let parts = parse_parts(&path);
        Self { path, parts }
    }

    /// The pointer string as given.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// The unescaped, blank-filtered tokens.
    pub fn parts(&self) -> &[PathStep] {
        &self.parts
    }

    /// Returns `true` when the pointer has no parts and targets the root itself.
    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    /// Splits off the final token.
    ///
    /// The last token is returned raw; the caller decides whether it is an
    /// index or a field name. Returns `(&[], None)` for the root pointer.
    pub fn split_last(&self) -> (&[PathStep], Option<&str>) {
        match self.parts.split_last() {
            Some((last, parent)) => (parent, Some(last.as_str())),
            None => (&[], None),
        }
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for Pointer {
    fn from(path: &str) -> Self {
        Pointer::new(path)
    }
}

impl From<String> for Pointer {
    fn from(path: String) -> Self {
        Pointer::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_pointers_have_no_parts() {
        for path in ["", "/", "/ ", "//"] {
            let pointer = Pointer::new(path);
            assert!(pointer.is_root(), "{path:?} should point at the root");
            assert_eq!(pointer.split_last(), (&[][..], None));
        }
    }

    #[test]
    fn split_last_keeps_final_token_raw() {
        let pointer = Pointer::new("/0/name");
        let (parent, last) = pointer.split_last();
        assert_eq!(parent, ["0"]);
        assert_eq!(last, Some("name"));
    }

    #[test]
    fn display_preserves_input() {
        assert_eq!(Pointer::new("0/name").to_string(), "0/name");
    }
}
