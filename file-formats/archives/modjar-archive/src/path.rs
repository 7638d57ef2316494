//! Entry name utilities
//!
//! ZIP entry names always use forward slashes, regardless of the host
//! operating system. Directory entries carry a trailing `/`.

use std::path::{Component, Path};

/// Whether an entry name denotes a directory
pub fn is_directory_entry(name: &str) -> bool {
    name.ends_with('/')
}

/// Convert a relative filesystem path to a ZIP entry name
///
/// Only normal components are kept, joined with `/`. Returns `None` if a
/// component is not valid UTF-8 or nothing remains.
pub fn entry_name_from_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str()?);
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
