//! burrow-types: pure data types shared across the burrow crates.
//!
//! This crate holds the error taxonomy, the reply type handed back to
//! whatever dispatch layer is driving the engine (REPL, chat bridge),
//! and the canonical timestamp format. It deliberately has no logic of
//! its own beyond constructors and `Display` impls.

pub mod error;
pub mod reply;

pub use error::{Error, Result};
pub use reply::{Reply, Tone};

/// Canonical timestamp format used everywhere a literal time appears:
/// availability windows, the clock variable, and the environment file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Human-readable rendering of [`TIMESTAMP_FORMAT`], for error messages.
pub const TIMESTAMP_HINT: &str = "YYYY-MM-DD HH:MM:SS";
