//! The error taxonomy for every engine operation.
//!
//! Every failure is reported synchronously to the immediate caller as
//! the operation's result; nothing is retried. Variants carry the path,
//! variable, or role name they are about so messages can be shown to a
//! chat user verbatim.

use thiserror::Error;

/// Convenience alias used throughout the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All the ways a burrow operation can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// A path or variable does not exist.
    #[error("could not find \"{0}\"")]
    NotFound(String),

    /// A node (or one of its ancestors) is outside its availability window.
    #[error("\"{0}\" is unavailable at the moment")]
    Unavailable(String),

    /// A node (or one of its ancestors) is locked.
    #[error("\"{0}\" is locked")]
    Locked(String),

    /// Lock was requested on a node that already carries a lock.
    #[error("\"{0}\" is already locked")]
    AlreadyLocked(String),

    /// Unlock was requested on a node that is not locked.
    #[error("\"{0}\" is not locked")]
    NotLocked(String),

    /// The supplied unlock key does not match the stored key.
    #[error("unable to unlock \"{0}\": the key might be incorrect")]
    WrongKey(String),

    /// Assignment to an immutable variable.
    #[error("the variable \"{0}\" is immutable")]
    Immutable(String),

    /// Creation of a variable whose name is already taken.
    #[error("the variable \"{0}\" already exists")]
    AlreadyExists(String),

    /// Deletion of a variable that may never be deleted.
    #[error("the variable \"{0}\" is protected and cannot be deleted")]
    Protected(String),

    /// A literal timestamp that does not match the canonical format.
    #[error("invalid timestamp \"{0}\": expected {hint}", hint = crate::TIMESTAMP_HINT)]
    InvalidTimestamp(String),

    /// A raw path that cannot be resolved, e.g. `..` past the root.
    #[error("invalid path \"{0}\"")]
    InvalidPath(String),

    /// An environment element declared a kind other than folder or file.
    #[error("unknown element kind \"{kind}\" for {path}")]
    UnknownElementKind { path: String, kind: String },

    /// The environment file is structurally unusable.
    #[error("malformed environment: {0}")]
    Malformed(String),

    /// Reading or writing the environment (or a cache reference) failed.
    #[error("environment I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The caller's roles do not grant the command.
    #[error("you do not have permission to use \"{0}\"")]
    PermissionDenied(String),

    /// A role name that is not declared in the permission table.
    #[error("role \"{0}\" not found")]
    UnknownRole(String),

    /// Subscribe to a role the caller already holds.
    #[error("you are already subscribed to role \"{0}\"")]
    AlreadySubscribed(String),

    /// Unsubscribe from a role the caller does not hold.
    #[error("you are not subscribed to role \"{0}\"")]
    NotSubscribed(String),

    /// Subscribe to a role at or above the caller's own authority.
    #[error("you do not have the authority to subscribe to role \"{0}\"")]
    InsufficientAuthority(String),

    /// A command line that cannot be parsed or is missing arguments.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_subject() {
        assert_eq!(
            Error::NotFound("/docs/readme".into()).to_string(),
            "could not find \"/docs/readme\""
        );
        assert_eq!(Error::Locked("/docs".into()).to_string(), "\"/docs\" is locked");
        assert_eq!(
            Error::InvalidTimestamp("yesterday".into()).to_string(),
            "invalid timestamp \"yesterday\": expected YYYY-MM-DD HH:MM:SS"
        );
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
