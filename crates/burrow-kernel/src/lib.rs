//! burrow-kernel: the engine behind the burrow shell.
//!
//! This crate provides:
//!
//! - **VFS**: the simulated folder/file tree, path resolution, gated
//!   lookup (availability windows and locks checked at every traversed
//!   level), the lock protocol, and a bounded-depth tree renderer
//! - **Variables**: a small named store with the offset-based `time`
//!   pseudo-variable
//! - **Permissions**: role grants, the declaration-order priority list,
//!   and the `RoleDirectory` boundary to whatever identity system hosts
//!   the callers
//! - **Codec**: load/save of the whole environment to a JSON file
//! - **Shell**: per-session working directories and the command surface
//!   (`pwd`, `ls`, `cd`, `cat`, `get`, `set`, `delete`, `lock`,
//!   `unlock`, `save`, `load`, `su`, `echo`, `help`)
//!
//! The engine is synchronous and single-actor: callers are assumed to
//! be serialized by the surrounding dispatch layer, and one command is
//! always processed to completion before the next.

pub mod codec;
pub mod env;
pub mod perms;
pub mod shell;
pub mod vars;
pub mod vfs;

pub use env::Environment;
pub use shell::Shell;
