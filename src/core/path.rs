//! Helpers for slash-separated repository paths.

pub const SEPARATOR: char = '/';

/// True if any segment of `path` is exactly `..`
pub fn has_parent_segment(path: &str) -> bool {
    path.split(SEPARATOR).any(|segment| segment == "..")
}

/// Last segment of `path`
pub fn name_of(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Path with the last segment removed, or `None` when the last segment hangs
/// directly off the leading separator
pub fn parent_of(path: &str) -> Option<&str> {
    match path.rfind(SEPARATOR) {
        Some(0) | None => None,
        Some(pos) => Some(&path[..pos]),
    }
}

/// Collapses empty and `.` segments. Always returns an absolute path.
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path
        .split(SEPARATOR)
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.is_empty() {
        return SEPARATOR.to_string();
    }

    let mut out = String::with_capacity(path.len());
    for segment in segments {
        out.push(SEPARATOR);
        out.push_str(segment);
    }
    out
}

/// Appends `relative` to `base` and normalizes the result
pub fn join(base: &str, relative: &str) -> String {
    normalize(&format!("{}{}{}", base, SEPARATOR, relative))
}

/// True if `candidate` equals `base` or lies below it
pub fn is_same_or_descendant(base: &str, candidate: &str) -> bool {
    if candidate == base {
        return true;
    }
    if base == "/" {
        return candidate.starts_with(SEPARATOR);
    }
    candidate
        .strip_prefix(base)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// Path of `candidate` relative to `base` without a leading separator, or
/// `None` if `candidate` is not below `base`
pub fn relative_to<'a>(base: &str, candidate: &'a str) -> Option<&'a str> {
    if candidate == base {
        return Some("");
    }
    if !is_same_or_descendant(base, candidate) {
        return None;
    }
    let offset = if base == "/" { 1 } else { base.len() + 1 };
    Some(&candidate[offset..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_segment_detection() {
        assert!(has_parent_segment("/a/../b"));
        assert!(has_parent_segment("/.."));
        assert!(!has_parent_segment("/a..b/c"));
        assert!(!has_parent_segment("/a/b"));
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent_of("/a/b/c"), Some("/a/b"));
        assert_eq!(parent_of("/a"), None);
        assert_eq!(parent_of("//a"), Some("/"));
        assert_eq!(name_of("/a/b/c"), "c");
        assert_eq!(name_of("c"), "c");
    }

    #[test]
    fn test_normalize_and_join() {
        assert_eq!(normalize("/a//b/./c/"), "/a/b/c");
        assert_eq!(normalize("//"), "/");
        assert_eq!(join("/home/users/alice", "/"), "/home/users/alice");
        assert_eq!(join("/home/users/alice", "/./nested"), "/home/users/alice/nested");
    }

    #[test]
    fn test_descendants() {
        assert!(is_same_or_descendant("/home/users/a", "/home/users/a"));
        assert!(is_same_or_descendant("/home/users/a", "/home/users/a/x"));
        assert!(!is_same_or_descendant("/home/users/a", "/home/users/ab"));
        assert_eq!(relative_to("/home/users/a", "/home/users/a/x/y"), Some("x/y"));
        assert_eq!(relative_to("/", "/x"), Some("x"));
        assert_eq!(relative_to("/home", "/other"), None);
    }
}
