//! Command permissions and the role boundary.
//!
//! A role grants a set of permission tokens; a token is a command name
//! or the wildcard `*`. The special role `everyone` applies to every
//! caller. Alongside the grants, a priority list records role names in
//! declaration order, first declared meaning highest authority; it
//! gates the self-service `su subscribe` protocol.
//!
//! Who actually holds which roles lives outside the engine. The
//! [`RoleDirectory`] trait is that boundary: resolve a caller to role
//! names, and add or remove a membership.

use std::collections::HashMap;

use burrow_types::{Error, Result};

/// Token granting every command.
pub const WILDCARD_PERMISSION: &str = "*";
/// Role applied to every caller regardless of membership.
pub const EVERYONE_ROLE: &str = "everyone";

/// Role grants plus the declaration-order priority list.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    grants: HashMap<String, Vec<String>>,
    /// Role names in declaration order. Index 0 is the highest authority.
    priority: Vec<String>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a role with its permission tokens.
    ///
    /// First declaration fixes the role's position in the priority
    /// list; re-declaring replaces the grants but keeps the position.
    pub fn declare(&mut self, role: &str, tokens: Vec<String>) {
        if !self.grants.contains_key(role) {
            self.priority.push(role.to_string());
        }
        self.grants.insert(role.to_string(), tokens);
    }

    /// Whether a caller holding `roles` may run `command`.
    ///
    /// An empty table is fully open: permission checks only start to
    /// bind once a perms section has been declared.
    pub fn allows(&self, roles: &[String], command: &str) -> bool {
        if self.grants.is_empty() {
            return true;
        }
        std::iter::once(EVERYONE_ROLE)
            .chain(roles.iter().map(String::as_str))
            .any(|role| self.role_allows(role, command))
    }

    fn role_allows(&self, role: &str, command: &str) -> bool {
        self.grants
            .get(role)
            .is_some_and(|tokens| tokens.iter().any(|t| t == command || t == WILDCARD_PERMISSION))
    }

    /// A role's rank in the priority list. 0 is the highest authority.
    pub fn rank(&self, role: &str) -> Option<usize> {
        self.priority.iter().position(|r| r == role)
    }

    /// The best (numerically lowest) rank among the given roles.
    pub fn highest_rank(&self, roles: &[String]) -> Option<usize> {
        roles.iter().filter_map(|r| self.rank(r)).min()
    }

    /// Gate a self-service subscription: the target role must exist and
    /// sit strictly below the caller's own best rank. A caller with no
    /// ranked role falls back to `everyone`'s rank, if declared.
    pub fn check_subscription(&self, caller_roles: &[String], role: &str) -> Result<()> {
        let target = self
            .rank(role)
            .ok_or_else(|| Error::UnknownRole(role.to_string()))?;
        let current = self
            .highest_rank(caller_roles)
            .or_else(|| self.rank(EVERYONE_ROLE));
        match current {
            Some(current) if target > current => Ok(()),
            _ => Err(Error::InsufficientAuthority(role.to_string())),
        }
    }

    /// Role names in declaration order.
    pub fn roles(&self) -> &[String] {
        &self.priority
    }

    pub fn grants_of(&self, role: &str) -> Option<&[String]> {
        self.grants.get(role).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Boundary to the external identity system.
///
/// The engine only ever needs the set of role names a caller holds,
/// plus the ability to add or remove one for the subscribe protocol.
pub trait RoleDirectory {
    fn roles_of(&self, caller: &str) -> Vec<String>;
    fn add_role(&mut self, caller: &str, role: &str) -> Result<()>;
    fn remove_role(&mut self, caller: &str, role: &str) -> Result<()>;
}

/// In-process role directory, used by the REPL and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoles {
    members: HashMap<String, Vec<String>>,
}

impl InMemoryRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a caller with an initial set of roles.
    pub fn with_member(mut self, caller: &str, roles: &[&str]) -> Self {
        self.members
            .insert(caller.to_string(), roles.iter().map(|r| r.to_string()).collect());
        self
    }
}

impl RoleDirectory for InMemoryRoles {
    fn roles_of(&self, caller: &str) -> Vec<String> {
        self.members.get(caller).cloned().unwrap_or_default()
    }

    fn add_role(&mut self, caller: &str, role: &str) -> Result<()> {
        let roles = self.members.entry(caller.to_string()).or_default();
        if roles.iter().any(|r| r == role) {
            return Err(Error::AlreadySubscribed(role.to_string()));
        }
        roles.push(role.to_string());
        Ok(())
    }

    fn remove_role(&mut self, caller: &str, role: &str) -> Result<()> {
        let roles = self
            .members
            .get_mut(caller)
            .ok_or_else(|| Error::NotSubscribed(role.to_string()))?;
        let Some(index) = roles.iter().position(|r| r == role) else {
            return Err(Error::NotSubscribed(role.to_string()));
        };
        roles.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> PermissionTable {
        let mut table = PermissionTable::new();
        table.declare("admin", vec![WILDCARD_PERMISSION.to_string()]);
        table.declare("operator", vec!["lock".into(), "unlock".into(), "save".into()]);
        table.declare(EVERYONE_ROLE, vec!["pwd".into(), "ls".into(), "cat".into()]);
        table
    }

    #[test]
    fn test_empty_table_is_open() {
        let table = PermissionTable::new();
        assert!(table.allows(&[], "lock"));
    }

    #[test]
    fn test_everyone_applies_without_membership() {
        let table = sample_table();
        assert!(table.allows(&[], "pwd"));
        assert!(!table.allows(&[], "lock"));
    }

    #[test]
    fn test_role_grants_and_wildcard() {
        let table = sample_table();
        let operator = vec!["operator".to_string()];
        let admin = vec!["admin".to_string()];
        assert!(table.allows(&operator, "lock"));
        assert!(!table.allows(&operator, "load"));
        assert!(table.allows(&admin, "load"));
    }

    #[test]
    fn test_priority_follows_declaration_order() {
        let table = sample_table();
        assert_eq!(table.rank("admin"), Some(0));
        assert_eq!(table.rank("operator"), Some(1));
        assert_eq!(table.rank(EVERYONE_ROLE), Some(2));
        assert_eq!(table.rank("ghost"), None);
        assert_eq!(table.roles(), ["admin", "operator", EVERYONE_ROLE]);
    }

    #[test]
    fn test_redeclare_keeps_position() {
        let mut table = sample_table();
        table.declare("admin", vec!["pwd".into()]);
        assert_eq!(table.rank("admin"), Some(0));
        assert_eq!(table.grants_of("admin"), Some(&["pwd".to_string()][..]));
    }

    #[test]
    fn test_subscription_requires_higher_authority() {
        let table = sample_table();
        let admin = vec!["admin".to_string()];
        let operator = vec!["operator".to_string()];

        // Admin outranks operator, so the subscription is allowed
        assert!(table.check_subscription(&admin, "operator").is_ok());
        // Equal or higher targets are rejected
        assert!(matches!(
            table.check_subscription(&operator, "operator"),
            Err(Error::InsufficientAuthority(_))
        ));
        assert!(matches!(
            table.check_subscription(&operator, "admin"),
            Err(Error::InsufficientAuthority(_))
        ));
        // Unknown target
        assert!(matches!(
            table.check_subscription(&admin, "ghost"),
            Err(Error::UnknownRole(_))
        ));
    }

    #[test]
    fn test_subscription_fallback_to_everyone() {
        let mut table = PermissionTable::new();
        table.declare(EVERYONE_ROLE, vec!["pwd".into()]);
        table.declare("guest", vec!["ls".into()]);
        // No held roles: authority comes from everyone (rank 0 here),
        // which outranks guest
        assert!(table.check_subscription(&[], "guest").is_ok());
        // And nobody can climb to everyone itself
        assert!(table.check_subscription(&[], EVERYONE_ROLE).is_err());
    }

    #[test]
    fn test_in_memory_directory() {
        let mut roles = InMemoryRoles::new().with_member("amy", &["operator"]);
        assert_eq!(roles.roles_of("amy"), ["operator"]);
        assert!(roles.roles_of("stranger").is_empty());

        roles.add_role("amy", "scribe").unwrap();
        assert!(matches!(
            roles.add_role("amy", "scribe"),
            Err(Error::AlreadySubscribed(_))
        ));

        roles.remove_role("amy", "scribe").unwrap();
        assert!(matches!(
            roles.remove_role("amy", "scribe"),
            Err(Error::NotSubscribed(_))
        ));
    }
}
