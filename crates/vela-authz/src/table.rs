//! Role to capability table.
//!
//! # Purpose
//! Holds the fixed capability set of every role. The built-in table is the
//! deployment default; configuration may replace individual roles.
//!
//! # Key invariants
//! - Every [`Role`] has an entry, possibly empty.
//! - The owner entry is reported as `all:*` and is never consulted for checks.
use crate::{AuthzResult, Capability, CapabilitySet, Role};
use std::collections::HashMap;

const OWNER: &[&str] = &["all:*"];

const ADMIN: &[&str] = &[
    "bookings:*",
    "customers:*",
    "services:*",
    "inventory:*",
    "products:*",
    "invoices:*",
    "payments:view",
    "payments:refund",
    "marketing:*",
    "reports:*",
    "team:view",
    "team:invite",
    "team:edit",
    "settings:view",
    "settings:edit",
    "visibility_rules:*",
    "coating:*",
];

const MANAGER: &[&str] = &[
    "bookings:view",
    "bookings:create",
    "bookings:edit",
    "bookings:cancel",
    "customers:view",
    "customers:create",
    "customers:edit",
    "services:view",
    "inventory:view",
    "inventory:adjust",
    "products:view",
    "invoices:view",
    "invoices:create",
    "marketing:view",
    "reports:view",
    "team:view",
    "coating:view",
];

const USER: &[&str] = &[
    "bookings:view",
    "bookings:create",
    "customers:view",
    "services:view",
    "inventory:view",
    "products:view",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTable {
    entries: HashMap<Role, CapabilitySet>,
}

impl RoleTable {
    /// The default table shipped with every deployment.
    pub fn builtin() -> Self {
        let entries = Role::ALL
            .into_iter()
            .map(|role| {
                let raw = match role {
                    Role::Owner => OWNER,
                    Role::Admin => ADMIN,
                    Role::Manager => MANAGER,
                    Role::User => USER,
                };
                (
                    role,
                    raw.iter()
                        .copied()
                        .map(Capability::parse)
                        .collect::<CapabilitySet>(),
                )
            })
            .collect();
        Self { entries }
    }

    /// Replace the capability sets of the given roles.
    ///
    /// # Errors
    /// - [`crate::AuthzError::InvalidCapability`] if any override entry is
    ///   not a well-formed `resource:action` string.
    pub fn with_overrides(mut self, overrides: &HashMap<Role, Vec<String>>) -> AuthzResult<Self> {
        for (role, capabilities) in overrides {
            let parsed = CapabilitySet::from_strings(capabilities)?;
            self.entries.insert(*role, parsed);
        }
        Ok(self)
    }

    pub fn capabilities(&self, role: Role) -> Option<&CapabilitySet> {
        self.entries.get(&role)
    }

    pub fn grants(&self, role: Role, capability: &Capability) -> bool {
        self.capabilities(role)
            .is_some_and(|set| set.grants(capability))
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthzError;

    #[test]
    fn builtin_covers_every_role() {
        let table = RoleTable::builtin();
        for role in Role::ALL {
            assert!(table.capabilities(role).is_some(), "missing {role}");
        }
        let owner = table.capabilities(Role::Owner).expect("owner");
        assert!(owner.iter().all(Capability::is_full_access));
    }

    #[test]
    fn builtin_entries_are_well_formed() {
        for raw in OWNER.iter().chain(ADMIN).chain(MANAGER).chain(USER) {
            assert!(raw.parse::<Capability>().is_ok(), "{raw}");
        }
    }

    #[test]
    fn manager_grants() {
        let table = RoleTable::builtin();
        assert!(table.grants(Role::Manager, &Capability::parse("bookings:edit")));
        assert!(!table.grants(Role::Manager, &Capability::parse("settings:billing")));
        assert!(table.grants(Role::Admin, &Capability::parse("customers:export")));
    }

    #[test]
    fn overrides_replace_role_entry() {
        let overrides = HashMap::from([(Role::User, vec!["reports:view".to_string()])]);
        let table = RoleTable::builtin()
            .with_overrides(&overrides)
            .expect("overrides");
        assert!(table.grants(Role::User, &Capability::parse("reports:view")));
        assert!(!table.grants(Role::User, &Capability::parse("bookings:view")));
        assert!(table.grants(Role::Manager, &Capability::parse("bookings:view")));
    }

    #[test]
    fn overrides_reject_malformed_entries() {
        let overrides = HashMap::from([(Role::Admin, vec!["reports".to_string()])]);
        let err = RoleTable::builtin()
            .with_overrides(&overrides)
            .expect_err("malformed");
        assert!(matches!(err, AuthzError::InvalidCapability(value) if value == "reports"));
    }
}
