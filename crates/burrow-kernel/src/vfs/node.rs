//! The tree data model: folders, files, and their access attributes.
//!
//! Paths are plain strings. Every node stores the absolute path of its
//! parent (`prefix`, trailing slash included) plus its own name, so a
//! node's absolute path is always `prefix + name`. The root folder has
//! an empty name and prefix `/`, which makes its absolute path `/`.
//!
//! Children are kept in `BTreeMap`s, one per kind. Name uniqueness is
//! per kind within a level; the sorted iteration order is what makes
//! serialization and rendering deterministic.

use std::collections::BTreeMap;

use super::gate::Window;

/// The availability/lock triple shared by folders and files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    /// When the node may be traversed or read.
    pub window: Window,
    /// Whether the node is locked. A locked ancestor blocks descendants
    /// at traversal time even when their own flag is clear.
    pub locked: bool,
    /// The lock key. Non-empty exactly while locked.
    pub key: String,
}

impl Access {
    /// Unlocked and always available.
    pub fn open() -> Self {
        Self { window: Window::always(), locked: false, key: String::new() }
    }
}

impl Default for Access {
    fn default() -> Self {
        Self::open()
    }
}

/// A directory in the simulated tree.
#[derive(Debug, Clone)]
pub struct Folder {
    pub name: String,
    /// Absolute path of the parent, trailing slash included.
    pub prefix: String,
    pub folders: BTreeMap<String, Folder>,
    pub files: BTreeMap<String, File>,
    pub access: Access,
}

impl Folder {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            folders: BTreeMap::new(),
            files: BTreeMap::new(),
            access: Access::open(),
        }
    }

    /// The root folder: empty name, path `/`, always reachable.
    pub fn root() -> Self {
        Self::new("", "/")
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty() && self.prefix == "/"
    }

    /// The node's own absolute path.
    pub fn abs_path(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }

    /// The prefix children of this folder carry.
    pub fn child_prefix(&self) -> String {
        let abs = self.abs_path();
        if abs == "/" { abs } else { format!("{abs}/") }
    }

    /// Absolute path of this folder's parent.
    pub fn parent_path(&self) -> String {
        if self.prefix == "/" {
            "/".to_string()
        } else {
            self.prefix.trim_end_matches('/').to_string()
        }
    }

    pub fn child_count(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Insert a subfolder, keyed by its name.
    pub fn insert_folder(&mut self, folder: Folder) {
        self.folders.insert(folder.name.clone(), folder);
    }

    /// Insert a file, keyed by its name.
    pub fn insert_file(&mut self, file: File) {
        self.files.insert(file.name.clone(), file);
    }
}

/// A leaf holding data, either inline or behind a cache reference.
#[derive(Debug, Clone)]
pub struct File {
    pub name: String,
    /// Absolute path of the parent, trailing slash included.
    pub prefix: String,
    /// Inline payload. Preferred over `cache` when both are present.
    pub data: String,
    /// Reference to externally stored content.
    pub cache: Option<String>,
    pub access: Access,
}

impl File {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            data: String::new(),
            cache: None,
            access: Access::open(),
        }
    }

    pub fn with_data(name: impl Into<String>, prefix: impl Into<String>, data: impl Into<String>) -> Self {
        let mut file = Self::new(name, prefix);
        file.data = data.into();
        file
    }

    pub fn abs_path(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_paths() {
        let root = Folder::root();
        assert!(root.is_root());
        assert_eq!(root.abs_path(), "/");
        assert_eq!(root.child_prefix(), "/");
        assert_eq!(root.parent_path(), "/");
    }

    #[test]
    fn test_nested_paths() {
        let docs = Folder::new("docs", "/");
        assert_eq!(docs.abs_path(), "/docs");
        assert_eq!(docs.child_prefix(), "/docs/");
        assert_eq!(docs.parent_path(), "/");

        let deep = Folder::new("inner", docs.child_prefix());
        assert_eq!(deep.abs_path(), "/docs/inner");
        assert_eq!(deep.parent_path(), "/docs");

        let file = File::new("readme", deep.child_prefix());
        assert_eq!(file.abs_path(), "/docs/inner/readme");
    }

    #[test]
    fn test_insert_children() {
        let mut root = Folder::root();
        root.insert_folder(Folder::new("b", "/"));
        root.insert_folder(Folder::new("a", "/"));
        root.insert_file(File::with_data("note", "/", "hi"));

        assert_eq!(root.child_count(), 3);
        // BTreeMap keeps children sorted by name
        let names: Vec<_> = root.folders.keys().collect();
        assert_eq!(names, ["a", "b"]);
    }
}
