//! Path rules over the flat directory list.
//!
//! The catalog stores no parent/child pointers; nesting is decided purely
//! by string structure, so these helpers must stay in sync with how
//! directory paths are built (absolute, '/'-separated, no trailing '/').

// Turn a possibly relative path into a canonical absolute one.
//
// ".." and "/.." resolve to the parent of `cwd` (root stays root). An
// absolute path passes through unchanged; anything else is joined onto
// `cwd` with a single separator.
pub fn canonicalize(path: &str, cwd: &str) -> String {
    if path == ".." || path == "/.." {
        return parent_of(cwd).to_string();
    }
    if path.starts_with('/') {
        return path.to_string();
    }
    if cwd == "/" {
        format!("/{path}")
    } else {
        format!("{cwd}/{path}")
    }
}

// The parent of an absolute path; root is its own parent.
pub fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

// True iff `candidate` is nested exactly one level below `parent`.
pub fn is_child(candidate: &str, parent: &str) -> bool {
    if candidate == parent {
        return false;
    }
    if parent == "/" {
        return candidate.starts_with('/') && candidate.bytes().filter(|&b| b == b'/').count() == 1;
    }
    match candidate.strip_prefix(parent) {
        Some(rest) => rest.starts_with('/') && !rest[1..].contains('/'),
        None => false,
    }
}

// True iff `candidate` equals `ancestor` or is nested below it at any depth.
pub fn is_descendant(candidate: &str, ancestor: &str) -> bool {
    if candidate == ancestor {
        return true;
    }
    if ancestor == "/" {
        return candidate.starts_with('/');
    }
    match candidate.strip_prefix(ancestor) {
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

// The display name of a direct child, i.e. `candidate` with the parent
// prefix stripped. Only meaningful when `is_child(candidate, parent)`.
pub fn child_name<'a>(candidate: &'a str, parent: &str) -> &'a str {
    if parent == "/" {
        &candidate[1..]
    } else {
        &candidate[parent.len() + 1..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_absolute_passes_through() {
        assert_eq!(canonicalize("/system", "/home"), "/system");
        assert_eq!(canonicalize("/a/b/c", "/"), "/a/b/c");
    }

    #[test]
    fn canonicalize_joins_relative_paths() {
        assert_eq!(canonicalize("docs", "/"), "/docs");
        assert_eq!(canonicalize("docs", "/home"), "/home/docs");
        assert_eq!(canonicalize("x", "/home/user"), "/home/user/x");
    }

    #[test]
    fn canonicalize_dotdot_pops_a_segment() {
        assert_eq!(canonicalize("..", "/home/user"), "/home");
        assert_eq!(canonicalize("..", "/home"), "/");
        assert_eq!(canonicalize("..", "/"), "/");
        assert_eq!(canonicalize("/..", "/home/user"), "/home");
    }

    #[test]
    fn child_rule_from_root() {
        assert!(is_child("/home", "/"));
        assert!(!is_child("/home/x", "/"));
        assert!(!is_child("/", "/"));
    }

    #[test]
    fn child_rule_one_level_only() {
        assert!(is_child("/home/x", "/home"));
        assert!(!is_child("/home/x/y", "/home"));
        assert!(!is_child("/home", "/home"));
        // Prefix match without a separator is not nesting.
        assert!(!is_child("/homely", "/home"));
    }

    #[test]
    fn descendant_rule() {
        assert!(is_descendant("/a", "/a"));
        assert!(is_descendant("/a/b", "/a"));
        assert!(is_descendant("/a/b/c", "/a"));
        assert!(!is_descendant("/ab", "/a"));
        assert!(!is_descendant("/b", "/a"));
        assert!(is_descendant("/anything", "/"));
    }

    #[test]
    fn child_name_strips_parent() {
        assert_eq!(child_name("/home", "/"), "home");
        assert_eq!(child_name("/home/x", "/home"), "x");
    }
}
