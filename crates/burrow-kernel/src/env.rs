//! The environment: one explicitly owned value holding the whole world.
//!
//! Tree root, variable store, and permission table travel together.
//! Loading builds a complete replacement before anything is swapped, so
//! a malformed file never clobbers live state. There are no process
//! globals; whoever owns the `Environment` is the single logical actor
//! mutating it.

use std::fs;
use std::path::Path;

use burrow_types::{Error, Result};

use crate::codec;
use crate::perms::PermissionTable;
use crate::vars::VariableStore;
use crate::vfs::{tree, File, Folder};

/// The root folder plus the sibling stores loaded from the same file.
#[derive(Debug, Clone)]
pub struct Environment {
    pub root: Folder,
    pub vars: VariableStore,
    pub perms: PermissionTable,
}

impl Environment {
    /// An empty environment: bare root, seeded variables, open permissions.
    pub fn new() -> Self {
        Self {
            root: Folder::root(),
            vars: VariableStore::new(),
            perms: PermissionTable::new(),
        }
    }

    /// Load a fresh environment from a file on disk.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = fs::read_to_string(path.as_ref())?;
        codec::parse(&source)
    }

    /// Serialize and write this environment to a file on disk.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let serialized = codec::serialize(self)?;
        fs::write(path.as_ref(), serialized)?;
        Ok(())
    }

    /// Gated folder lookup by absolute path.
    pub fn folder(&self, path: &str) -> Result<&Folder> {
        tree::lookup_folder(&self.root, path)
    }

    /// Gated file lookup by absolute path.
    pub fn file(&self, path: &str) -> Result<&File> {
        tree::lookup_file(&self.root, path)
    }

    /// A file's content: inline data when present, otherwise the cache
    /// reference read from the local filesystem.
    pub fn file_content(&self, file: &File) -> Result<String> {
        if !file.data.is_empty() {
            return Ok(file.data.clone());
        }
        match &file.cache {
            Some(cache) => Ok(fs::read_to_string(cache)?),
            None => Ok(String::new()),
        }
    }

    /// Lock the node at `path`, file or folder, with the given key.
    ///
    /// Ancestors must be reachable; the target itself is exempt from
    /// gate checks so the protocol can report `AlreadyLocked` instead
    /// of a bare traversal failure.
    pub fn lock(&mut self, path: &str, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidInput("a lock key must not be empty".to_string()));
        }
        if tree::names_file(&self.root, path) {
            let file = tree::lookup_file_mut(&mut self.root, path)?;
            let abs = file.abs_path();
            file.access.lock(&abs, key)
        } else {
            let folder = tree::lookup_folder_mut(&mut self.root, path)?;
            if folder.is_root() {
                return Err(Error::InvalidPath(path.to_string()));
            }
            let abs = folder.abs_path();
            folder.access.lock(&abs, key)
        }
    }

    /// Unlock the node at `path` by presenting its exact key.
    pub fn unlock(&mut self, path: &str, key: &str) -> Result<()> {
        if tree::names_file(&self.root, path) {
            let file = tree::lookup_file_mut(&mut self.root, path)?;
            let abs = file.abs_path();
            file.access.unlock(&abs, key)
        } else {
            let folder = tree::lookup_folder_mut(&mut self.root, path)?;
            if folder.is_root() {
                return Err(Error::InvalidPath(path.to_string()));
            }
            let abs = folder.abs_path();
            folder.access.unlock(&abs, key)
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
