//! The variable store: named, typed mutable values.
//!
//! Two entries are pre-seeded on every fresh store: `version`
//! (immutable, the build version) and `time` (mutable, but special).
//! `time` is a tagged clock variant rather than text: it stores a
//! signed offset in seconds between the wall clock and the displayed
//! clock. Reading applies the offset; writing either resets it (`now`)
//! or recomputes it from a supplied literal timestamp, so the variable
//! keeps advancing with real time from that point.

use std::collections::BTreeMap;

use burrow_types::{Error, Result, TIMESTAMP_FORMAT};
use chrono::Duration;

use crate::vfs::gate;

/// Name of the offset-based clock variable. Never deletable.
pub const TIME_VARIABLE: &str = "time";
/// Name of the immutable build-version variable.
pub const VERSION_VARIABLE: &str = "version";
/// Token accepted by `set time` to reset the offset to zero.
pub const NOW_TOKEN: &str = "now";

/// A variable's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Ordinary stored text.
    Text(String),
    /// Signed offset in seconds between the wall clock and the
    /// displayed clock. The stored value is not the displayed value.
    Clock { offset_secs: i64 },
}

/// A single named slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub immutable: bool,
    pub value: Value,
}

impl Variable {
    /// The value as persisted: text verbatim, a clock as its raw offset.
    pub fn raw_value(&self) -> String {
        match &self.value {
            Value::Text(text) => text.clone(),
            Value::Clock { offset_secs } => offset_secs.to_string(),
        }
    }
}

/// Named variable store, seeded with `version` and `time`.
#[derive(Debug, Clone)]
pub struct VariableStore {
    vars: BTreeMap<String, Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        let mut vars = BTreeMap::new();
        vars.insert(
            VERSION_VARIABLE.to_string(),
            Variable {
                name: VERSION_VARIABLE.to_string(),
                immutable: true,
                value: Value::Text(env!("CARGO_PKG_VERSION").to_string()),
            },
        );
        vars.insert(
            TIME_VARIABLE.to_string(),
            Variable {
                name: TIME_VARIABLE.to_string(),
                immutable: false,
                value: Value::Clock { offset_secs: 0 },
            },
        );
        Self { vars }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Read a variable. A clock yields the current wall-clock time
    /// minus its offset, formatted as a literal timestamp.
    pub fn get(&self, name: &str) -> Result<String> {
        let variable = self
            .vars
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        match &variable.value {
            Value::Text(text) => Ok(text.clone()),
            Value::Clock { offset_secs } => {
                let shown = gate::now() - Duration::seconds(*offset_secs);
                Ok(shown.format(TIMESTAMP_FORMAT).to_string())
            }
        }
    }

    /// Overwrite a variable.
    ///
    /// For a clock, `raw` is either the `now` token (offset reset to
    /// zero) or a literal timestamp; the offset becomes now minus the
    /// supplied time, so the variable displays that timestamp until
    /// real time advances past it.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<()> {
        let variable = self
            .vars
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        if variable.immutable {
            return Err(Error::Immutable(name.to_string()));
        }
        match &mut variable.value {
            Value::Text(text) => {
                *text = raw.to_string();
            }
            Value::Clock { offset_secs } => {
                if raw == NOW_TOKEN {
                    *offset_secs = 0;
                } else {
                    let supplied = gate::parse_timestamp(raw)?;
                    *offset_secs = (gate::now() - supplied).num_seconds();
                }
            }
        }
        Ok(())
    }

    /// Create a fresh mutable text variable.
    pub fn create(&mut self, name: &str, value: &str) -> Result<()> {
        if self.exists(name) {
            return Err(Error::AlreadyExists(name.to_string()));
        }
        self.vars.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                immutable: false,
                value: Value::Text(value.to_string()),
            },
        );
        Ok(())
    }

    /// Delete a variable. Immutable variables and `time` are protected.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let variable = self
            .vars
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        if variable.immutable || name == TIME_VARIABLE {
            return Err(Error::Protected(name.to_string()));
        }
        self.vars.remove(name);
        Ok(())
    }

    /// All variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}
