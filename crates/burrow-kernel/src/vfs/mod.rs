//! The virtual filesystem: tree model, path resolution, gated lookup,
//! lock protocol, and rendering.

pub mod gate;
pub mod lock;
pub mod node;
pub mod render;
pub mod resolve;
pub mod tree;

pub use gate::Window;
pub use node::{Access, File, Folder};
