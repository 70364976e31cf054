use crate::types::Path;
use crate::PointerError;

/// Unescapes a pointer component.
///
/// `~1` is replaced with `/` and `~0` with `~`, in that order.
///
/// ```
/// use entity_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a pointer component.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // ~ first, otherwise the ~ introduced by ~1 would be escaped again
    component.replace('~', "~0").replace('/', "~1")
}

/// Parses a pointer string into its parts.
///
/// The leading `/` is optional. Segments that are empty or whitespace-only
/// are dropped, which makes `""`, `"/"` and `"/ "` all root pointers.
///
/// ```
/// use entity_pointer::parse_parts;
///
/// assert_eq!(parse_parts("/0/name"), vec!["0", "name"]);
/// assert_eq!(parse_parts("0//name/"), vec!["0", "name"]);
/// assert!(parse_parts("/").is_empty());
/// ```
pub fn parse_parts(pointer: &str) -> Path {
    pointer
        .trim_start_matches('/')
        .split('/')
        .filter(|segment| !segment.trim().is_empty())
        .map(unescape_component)
        .collect()
}

/// Formats parts back into a pointer string.
///
/// Returns `"/"` for the root so the result always reads as absolute.
pub fn format_pointer(path: &[String]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Check if a string represents a valid non-negative integer index.
///
/// Digits only, and no leading zero unless the index is `0` itself.
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}

/// Parses a token as a collection position.
pub fn parse_index(step: &str) -> Result<usize, PointerError> {
    if !is_valid_index(step) {
        return Err(PointerError::IndexNotInt(step.to_string()));
    }
    // Digits that overflow usize can't address anything either.
    step.parse()
        .map_err(|_| PointerError::IndexOutOfRange(step.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_component() {
        assert_eq!(unescape_component("foo"), "foo");
        assert_eq!(unescape_component("a~0b~1c"), "a~b/c");
        assert_eq!(unescape_component("~01"), "~1");
    }

    #[test]
    fn test_escape_component() {
        assert_eq!(escape_component("foo"), "foo");
        assert_eq!(escape_component("a~b/c"), "a~0b~1c");
    }

    #[test]
    fn test_parse_parts() {
        assert!(parse_parts("").is_empty());
        assert!(parse_parts("/").is_empty());
        assert!(parse_parts("/ ").is_empty());
        assert_eq!(parse_parts("/0/name"), vec!["0", "name"]);
        assert_eq!(parse_parts("0/name"), vec!["0", "name"]);
        assert_eq!(parse_parts("/a~1b/~0"), vec!["a/b", "~"]);
    }

    #[test]
    fn test_format_pointer() {
        assert_eq!(format_pointer(&[]), "/");
        assert_eq!(
            format_pointer(&["books".to_string(), "a/b".to_string()]),
            "/books/a~1b"
        );
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("0"), Ok(0));
        assert_eq!(parse_index("42"), Ok(42));
        assert_eq!(
            parse_index("-1"),
            Err(PointerError::IndexNotInt("-1".to_string()))
        );
        assert_eq!(
            parse_index("01"),
            Err(PointerError::IndexNotInt("01".to_string()))
        );
        assert_eq!(
            parse_index("name"),
            Err(PointerError::IndexNotInt("name".to_string()))
        );
        assert!(matches!(
            parse_index("99999999999999999999999"),
            Err(PointerError::IndexOutOfRange(_))
        ));
    }
}
