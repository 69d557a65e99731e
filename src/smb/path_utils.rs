//! Remote path utilities for share operations
//!
//! Paths handed to the core are relative to the share root and always use `/`.
//! The SMB wire format uses `\`; conversion happens only at the transport edge.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Remote path is empty")]
    Empty,

    #[error("Remote path segment '{0}' is not allowed")]
    ForbiddenSegment(String),

    #[error("Remote path contains an unsupported character: {0:?}")]
    ForbiddenCharacter(char),
}

/// Characters smbclient cannot carry inside a quoted `-c` argument, plus the
/// wildcards it would expand.
fn is_forbidden_char(c: char) -> bool {
    matches!(c, '"' | ';' | '*' | '?') || c.is_control()
}

/// Split a remote path into its non-empty segments.
///
/// Doubled, leading and trailing slashes are discarded.
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Normalize a caller-supplied remote path.
///
/// Converts `\` to `/`, drops empty segments (so the result never leads with
/// `/`), and rejects `.`/`..` segments and characters the transport cannot
/// quote. An empty result is returned as-is; callers decide whether that is an
/// error.
pub fn normalize_remote_path(raw: &str) -> Result<String, PathError> {
    if let Some(c) = raw.chars().find(|c| is_forbidden_char(*c)) {
        return Err(PathError::ForbiddenCharacter(c));
    }

    let unified = raw.replace('\\', "/");
    let segments = split_segments(&unified);
    for segment in &segments {
        if *segment == "." || *segment == ".." {
            return Err(PathError::ForbiddenSegment((*segment).to_string()));
        }
    }

    Ok(segments.join("/"))
}

/// Split a normalized path into `(parent directory, file name)`.
///
/// The parent is empty for paths at the share root.
pub fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Accumulated prefixes of a directory path: `a`, `a/b`, `a/b/c`.
pub fn directory_prefixes(dir_path: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut current = String::new();
    for segment in split_segments(dir_path) {
        if current.is_empty() {
            current.push_str(segment);
        } else {
            current = join_remote_path(&current, segment);
        }
        prefixes.push(current.clone());
    }
    prefixes
}

/// Join remote path components using the `/` separator.
pub fn join_remote_path(base: &str, component: &str) -> String {
    if base.is_empty() {
        component.to_string()
    } else if base.ends_with('/') {
        format!("{}{}", base, component)
    } else {
        format!("{}/{}", base, component)
    }
}

/// Convert a share-relative path to the backslash form used on the wire.
pub fn to_wire_path(path: &str) -> String {
    path.replace('/', "\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_segments() {
        assert_eq!(split_segments("a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(split_segments("/a//b/"), vec!["a", "b"]);
        assert!(split_segments("").is_empty());
        assert!(split_segments("///").is_empty());
    }

    #[test]
    fn test_normalize_remote_path() {
        assert_eq!(normalize_remote_path("/docs/report.pdf").unwrap(), "docs/report.pdf");
        assert_eq!(normalize_remote_path("docs\\2024\\q1.xlsx").unwrap(), "docs/2024/q1.xlsx");
        assert_eq!(normalize_remote_path("a//b///c.txt").unwrap(), "a/b/c.txt");
        assert_eq!(normalize_remote_path("///").unwrap(), "");
    }

    #[test]
    fn test_normalize_rejects_traversal_and_quoting_hazards() {
        assert_eq!(
            normalize_remote_path("a/../b.txt"),
            Err(PathError::ForbiddenSegment("..".to_string()))
        );
        assert_eq!(
            normalize_remote_path("./b.txt"),
            Err(PathError::ForbiddenSegment(".".to_string()))
        );
        assert_eq!(
            normalize_remote_path("a\"b.txt"),
            Err(PathError::ForbiddenCharacter('"'))
        );
        assert_eq!(
            normalize_remote_path("a;rm b.txt"),
            Err(PathError::ForbiddenCharacter(';'))
        );
        assert_eq!(
            normalize_remote_path("reports/*.pdf"),
            Err(PathError::ForbiddenCharacter('*'))
        );
        assert_eq!(
            normalize_remote_path("a\nb.txt"),
            Err(PathError::ForbiddenCharacter('\n'))
        );
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("a/b/c/file.txt"), ("a/b/c", "file.txt"));
        assert_eq!(split_parent("file.txt"), ("", "file.txt"));
    }

    #[test]
    fn test_directory_prefixes() {
        assert_eq!(directory_prefixes("a/b/c"), vec!["a", "a/b", "a/b/c"]);
        assert_eq!(directory_prefixes("/a//b/"), vec!["a", "a/b"]);
        assert!(directory_prefixes("").is_empty());
    }

    #[test]
    fn test_join_remote_path() {
        assert_eq!(join_remote_path("a", "b"), "a/b");
        assert_eq!(join_remote_path("a/", "b"), "a/b");
        assert_eq!(join_remote_path("", "b"), "b");
    }

    #[test]
    fn test_to_wire_path() {
        assert_eq!(to_wire_path("a/b/c.txt"), "a\\b\\c.txt");
        assert_eq!(to_wire_path("c.txt"), "c.txt");
    }
}
