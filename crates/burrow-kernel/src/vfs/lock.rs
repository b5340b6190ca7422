//! The lock/unlock protocol.
//!
//! A lock is a per-node boolean gate with an opaque key compared by
//! exact equality. This is not a cryptographic verification: anyone who
//! obtains the literal key string can unlock. Locking does not touch
//! descendants; transitivity is enforced at traversal time by the
//! gated lookup.

use burrow_types::{Error, Result};

use super::node::Access;

impl Access {
    /// Lock with the given key. No previous key is required.
    pub fn lock(&mut self, abs: &str, key: &str) -> Result<()> {
        if self.locked {
            return Err(Error::AlreadyLocked(abs.to_string()));
        }
        self.key = key.to_string();
        self.locked = true;
        Ok(())
    }

    /// Unlock if `key` matches the stored key exactly.
    ///
    /// On success both the flag and the key are cleared, so a second
    /// unlock fails with `NotLocked`.
    pub fn unlock(&mut self, abs: &str, key: &str) -> Result<()> {
        if !self.locked {
            return Err(Error::NotLocked(abs.to_string()));
        }
        if self.key != key {
            return Err(Error::WrongKey(abs.to_string()));
        }
        self.locked = false;
        self.key.clear();
        Ok(())
    }
}
