//! Path validation for archive entries and workspace-relative paths
//!
//! Both entry names read from an archive and paths named by patch scripts
//! are untrusted. Anything that could land outside the extraction root is
//! rejected before touching the filesystem.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Split a workspace-relative path into a safe relative `PathBuf`
///
/// Accepts `/` and `\` as separators. Rejects empty paths, absolute paths,
/// drive prefixes, `..` components and control characters. `.` and empty
/// components are dropped.
pub fn check_relative_path(path: &str) -> std::result::Result<PathBuf, &'static str> {
    split_checked(path, &['/', '\\'])
}

/// Validate an archive entry name, returning the relative path to extract to
///
/// Entry names are split on `/` only. A backslash is an ordinary file name
/// character on Unix, so `a\b.txt` extracts to a single file and repacks
/// under the same name.
pub fn validate_entry_name(name: &str) -> Result<PathBuf> {
    split_checked(name, &['/']).map_err(|reason| Error::UnsafeEntryName {
        name: name.to_string(),
        reason,
    })
}

fn split_checked(path: &str, separators: &[char]) -> std::result::Result<PathBuf, &'static str> {
    if path.is_empty() {
        return Err("empty path");
    }
    if path.chars().any(|c| matches!(c, '\0'..='\x1f' | '\x7f')) {
        return Err("contains control characters");
    }
    if path.starts_with(['/', '\\']) {
        return Err("absolute path");
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err("drive-qualified path");
    }

    let mut out = PathBuf::new();
    for component in path.split(separators) {
        // `..` hidden behind a backslash still escapes on Windows
        if component.split('\\').any(|part| part == "..") {
            return Err("parent directory reference");
        }
        match component {
            "" | "." => {}
            name => out.push(name),
        }
    }

    if out.as_os_str().is_empty() {
        return Err("empty path");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_accepts_normal_entries() {
        assert_eq!(
            validate_entry_name("META-INF/mods.toml").unwrap(),
            Path::new("META-INF").join("mods.toml")
        );
        assert_eq!(
            validate_entry_name("assets/./x//y.png").unwrap(),
            Path::new("assets").join("x").join("y.png")
        );
        assert_eq!(
            validate_entry_name("data/").unwrap(),
            PathBuf::from("data")
        );
    }

    #[test]
    fn test_rejects_traversal() {
        for bad in [
            "../evil.class",
            "assets/../../evil",
            "..\\evil",
            "/etc/passwd",
            "\\windows\\system32",
            "C:/evil",
            "a/\0b",
            "a/\x1bb",
            "",
            "./",
        ] {
            assert!(validate_entry_name(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_backslash_is_part_of_the_name() {
        let path = validate_entry_name("assets/a\\b.txt").unwrap();
        assert_eq!(path, Path::new("assets").join("a\\b.txt"));
        assert_eq!(path.components().count(), 2);
    }

    #[test]
    fn test_script_paths_accept_backslashes() {
        assert_eq!(
            check_relative_path("data\\projecte\\recipes").unwrap(),
            Path::new("data").join("projecte").join("recipes")
        );
        assert!(check_relative_path("data\\..\\..\\evil").is_err());
    }

    #[test]
    fn test_reason_is_reported() {
        match validate_entry_name("../x").unwrap_err() {
            Error::UnsafeEntryName { name, reason } => {
                assert_eq!(name, "../x");
                assert_eq!(reason, "parent directory reference");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
