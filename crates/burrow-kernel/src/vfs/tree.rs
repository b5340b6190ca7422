//! Gated tree lookup.
//!
//! Lookups walk an absolute path segment by segment and evaluate every
//! traversed node's gate, time window first, then lock. A locked or
//! unavailable ancestor therefore blocks every descendant regardless of
//! the descendant's own flags; lock scope is transitive downward
//! through the path. Gate errors name the offending node's full path,
//! not the path the caller asked for.
//!
//! The mutable variants gate every ancestor but exempt the target
//! itself. They exist for the lock protocol: a locked node must still
//! be reachable by `unlock`.

use burrow_types::{Error, Result};

use super::node::{Access, File, Folder};

/// Split an absolute path into its non-empty segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.trim().is_empty())
}

fn check(access: &Access, abs: &str) -> Result<()> {
    if !access.window.is_open() {
        return Err(Error::Unavailable(abs.to_string()));
    }
    if access.locked {
        return Err(Error::Locked(abs.to_string()));
    }
    Ok(())
}

/// Look up a folder, gating every traversed level including the target.
///
/// A path of exactly `/` (or one that collapses to no segments) yields
/// the root without any check; the root is always reachable.
pub fn lookup_folder<'a>(root: &'a Folder, path: &str) -> Result<&'a Folder> {
    let mut current = root;
    for segment in segments(path) {
        let next = current
            .folders
            .get(segment)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        check(&next.access, &next.abs_path())?;
        current = next;
    }
    Ok(current)
}

/// Look up a file, gating every traversed folder and the file itself.
pub fn lookup_file<'a>(root: &'a Folder, path: &str) -> Result<&'a File> {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, dirs)) = parts.split_last() else {
        return Err(Error::NotFound(path.to_string()));
    };

    let mut current = root;
    for segment in dirs {
        let next = current
            .folders
            .get(*segment)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        check(&next.access, &next.abs_path())?;
        current = next;
    }

    let file = current
        .files
        .get(*last)
        .ok_or_else(|| Error::NotFound(path.to_string()))?;
    check(&file.access, &file.abs_path())?;
    Ok(file)
}

/// Mutable folder lookup. Ancestors are gated; the target is not.
pub fn lookup_folder_mut<'a>(root: &'a mut Folder, path: &str) -> Result<&'a mut Folder> {
    let parts: Vec<&str> = segments(path).collect();
    let mut current = root;
    for (i, segment) in parts.iter().enumerate() {
        let next = current
            .folders
            .get_mut(*segment)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        if i + 1 < parts.len() {
            check(&next.access, &next.abs_path())?;
        }
        current = next;
    }
    Ok(current)
}

/// Mutable file lookup. Ancestors are gated; the target is not.
pub fn lookup_file_mut<'a>(root: &'a mut Folder, path: &str) -> Result<&'a mut File> {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, dirs)) = parts.split_last() else {
        return Err(Error::NotFound(path.to_string()));
    };

    let mut current = root;
    for segment in dirs {
        let next = current
            .folders
            .get_mut(*segment)
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        check(&next.access, &next.abs_path())?;
        current = next;
    }

    current
        .files
        .get_mut(*last)
        .ok_or_else(|| Error::NotFound(path.to_string()))
}

/// Whether the final segment of `path` names a file, ignoring gates.
///
/// Used to decide which kind of node a lock/unlock request targets
/// before taking the mutable borrow.
pub fn names_file(root: &Folder, path: &str) -> bool {
    let parts: Vec<&str> = segments(path).collect();
    let Some((last, dirs)) = parts.split_last() else {
        return false;
    };
    let mut current = root;
    for segment in dirs {
        match current.folders.get(*segment) {
            Some(next) => current = next,
            None => return false,
        }
    }
    current.files.contains_key(*last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::Window;

    fn sample_tree() -> Folder {
        let mut root = Folder::root();
        let mut docs = Folder::new("docs", "/");
        let mut inner = Folder::new("inner", "/docs/");
        inner.insert_file(File::with_data("deep.txt", "/docs/inner/", "deep"));
        docs.insert_folder(inner);
        docs.insert_file(File::with_data("readme", "/docs/", "hello"));
        root.insert_folder(docs);
        root.insert_file(File::with_data("motd", "/", "welcome"));
        root
    }

    #[test]
    fn test_root_always_reachable() {
        let mut root = sample_tree();
        root.access.locked = true; // never consulted for "/"
        root.access.key = "k".into();
        let found = lookup_folder(&root, "/").unwrap();
        assert!(found.is_root());
    }

    #[test]
    fn test_lookup_folder_and_file() {
        let root = sample_tree();
        assert_eq!(lookup_folder(&root, "/docs/inner").unwrap().abs_path(), "/docs/inner");
        assert_eq!(lookup_file(&root, "/docs/readme").unwrap().data, "hello");
        // Empty segments from doubled separators are ignored
        assert_eq!(lookup_file(&root, "//docs//readme").unwrap().data, "hello");
    }

    #[test]
    fn test_not_found() {
        let root = sample_tree();
        assert!(matches!(lookup_folder(&root, "/nope"), Err(Error::NotFound(_))));
        assert!(matches!(lookup_file(&root, "/docs/nope"), Err(Error::NotFound(_))));
        // A folder does not satisfy a file lookup, and vice versa
        assert!(matches!(lookup_file(&root, "/docs/inner"), Err(Error::NotFound(_))));
        assert!(matches!(lookup_folder(&root, "/docs/readme"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_locked_ancestor_blocks_descendants() {
        let mut root = sample_tree();
        {
            let docs = root.folders.get_mut("docs").unwrap();
            docs.access.locked = true;
            docs.access.key = "key1".into();
        }
        // The file's own flag is clear, but the ancestor gate names /docs
        match lookup_file(&root, "/docs/inner/deep.txt") {
            Err(Error::Locked(path)) => assert_eq!(path, "/docs"),
            other => panic!("expected Locked, got {other:?}"),
        }
        assert!(matches!(lookup_folder(&root, "/docs/inner"), Err(Error::Locked(_))));
    }

    #[test]
    fn test_unavailable_intermediate_names_offender() {
        let mut root = sample_tree();
        root.folders.get_mut("docs").unwrap().access.window =
            Window::new("2020-01-01 00:00:00", "2020-01-02 00:00:00");
        match lookup_file(&root, "/docs/readme") {
            Err(Error::Unavailable(path)) => assert_eq!(path, "/docs"),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_window_checked_before_lock() {
        let mut root = sample_tree();
        let docs = root.folders.get_mut("docs").unwrap();
        docs.access.window = Window::new("2020-01-01 00:00:00", "2020-01-02 00:00:00");
        docs.access.locked = true;
        docs.access.key = "k".into();
        assert!(matches!(lookup_folder(&root, "/docs"), Err(Error::Unavailable(_))));
    }

    #[test]
    fn test_mut_lookup_exempts_target() {
        let mut root = sample_tree();
        {
            let docs = root.folders.get_mut("docs").unwrap();
            docs.access.locked = true;
            docs.access.key = "key1".into();
        }
        // The locked folder itself is still reachable mutably
        assert!(lookup_folder_mut(&mut root, "/docs").is_ok());
        // But a locked ancestor still blocks a deeper mutable lookup
        assert!(matches!(
            lookup_file_mut(&mut root, "/docs/readme"),
            Err(Error::Locked(_))
        ));
    }

    #[test]
    fn test_names_file() {
        let root = sample_tree();
        assert!(names_file(&root, "/docs/readme"));
        assert!(names_file(&root, "/motd"));
        assert!(!names_file(&root, "/docs"));
        assert!(!names_file(&root, "/docs/absent"));
        assert!(!names_file(&root, "/"));
    }
}
