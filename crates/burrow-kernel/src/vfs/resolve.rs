//! Path resolution: raw caller input to an absolute path.
//!
//! Rules are checked in order against the raw, unresolved string:
//!
//! 1. Contains the parent marker `..` anywhere: walk the segments left
//!    to right from the current directory. A `..` segment pops one
//!    level by looking up the accumulated path's folder (gates apply)
//!    and taking its parent; any other segment is appended. Popping at
//!    the root is rejected rather than escaping above it.
//! 2. Leading `~`: the remainder is already absolute, rooted at `/`.
//!    Resolution is independent of the current directory.
//! 3. Leading `.`: the remainder is appended to the current directory.
//! 4. No marker: the whole string is appended to the current directory.
//!
//! Resolution never collapses doubled separators; the tree walk ignores
//! empty segments later.

use burrow_types::{Error, Result};

use super::node::Folder;
use super::tree;

/// Two-character marker that pops one level.
pub const PARENT_MARKER: &str = "..";
/// Leading marker for home-rooted (absolute) paths.
pub const HOME_MARKER: char = '~';
/// Leading marker for current-directory-relative paths.
pub const CURRENT_MARKER: char = '.';

/// Resolve a raw path against the caller's current absolute path.
///
/// `root` is consulted only for parent-marker walks, which need to look
/// up intermediate folders; those lookups are gated, so a `..` through
/// a locked or unavailable location fails like any other traversal.
pub fn resolve(root: &Folder, raw: &str, current: &str) -> Result<String> {
    if raw.contains(PARENT_MARKER) {
        let mut accumulated = current.to_string();
        for segment in raw.split('/') {
            if segment.trim().is_empty() {
                continue;
            }
            if segment == PARENT_MARKER {
                if accumulated == "/" {
                    return Err(Error::InvalidPath(raw.to_string()));
                }
                let folder = tree::lookup_folder(root, &accumulated)?;
                accumulated = folder.parent_path();
            } else if accumulated == "/" {
                accumulated = format!("/{segment}");
            } else {
                accumulated = format!("{accumulated}/{segment}");
            }
        }
        Ok(accumulated)
    } else if let Some(rest) = raw.strip_prefix(HOME_MARKER) {
        Ok(format!("/{rest}"))
    } else if let Some(rest) = raw.strip_prefix(CURRENT_MARKER) {
        Ok(format!("{current}/{rest}"))
    } else {
        Ok(format!("{current}/{raw}"))
    }
}
