//! Permission resolver.
//!
//! # Purpose
//! Answers capability checks for a role plus optional per-actor custom grants.
//!
//! # Key invariants
//! - Owners are granted everything before any lookup happens.
//! - Custom grants are consulted first and can only add access.
//! - Checks never fail; anything unresolvable is a denial.
use crate::matcher::grants_in;
use crate::{Capability, CapabilitySet, Role, RoleTable};

/// Resolves capability checks against a [`RoleTable`].
///
/// # Summary
/// Pure and synchronous; safe to share across threads and call concurrently.
///
/// # Example
/// ```rust
/// use vela_authz::{Capability, PermissionResolver, Role};
///
/// let resolver = PermissionResolver::default();
/// let custom = [Capability::parse("coating:*")];
/// let wanted = Capability::parse("coating:certificate");
/// assert!(!resolver.has_permission(Role::User, &wanted, &[]));
/// assert!(resolver.has_permission(Role::User, &wanted, &custom));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PermissionResolver {
    table: RoleTable,
}

impl PermissionResolver {
    pub fn new(table: RoleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RoleTable {
        &self.table
    }

    /// Decide whether `role` (with `custom` grants) holds `capability`.
    ///
    /// # Parameters
    /// - `role`: the actor's role in the organization.
    /// - `capability`: the requested capability.
    /// - `custom`: per-actor grants; pass an empty slice when there are none.
    ///
    /// # Returns
    /// - `true` when the capability or its `resource:*` form is granted by
    ///   the custom grants or the role table; `false` otherwise.
    pub fn has_permission(&self, role: Role, capability: &Capability, custom: &[Capability]) -> bool {
        if role.is_owner() {
            return true;
        }
        if !custom.is_empty() && grants_in(|candidate| custom.contains(candidate), capability) {
            return true;
        }
        self.table.grants(role, capability)
    }

    /// True if any of `capabilities` is granted. Empty input is `false`.
    pub fn has_any_permission(
        &self,
        role: Role,
        capabilities: &[Capability],
        custom: &[Capability],
    ) -> bool {
        capabilities
            .iter()
            .any(|capability| self.has_permission(role, capability, custom))
    }

    /// True if every one of `capabilities` is granted. Empty input is `true`.
    pub fn has_all_permissions(
        &self,
        role: Role,
        capabilities: &[Capability],
        custom: &[Capability],
    ) -> bool {
        capabilities
            .iter()
            .all(|capability| self.has_permission(role, capability, custom))
    }

    /// Effective capability list for display and token embedding.
    ///
    /// # Returns
    /// - `[all:*]` for owners.
    /// - Otherwise the role's table entries followed by custom grants, with
    ///   duplicates removed and first-seen order kept.
    pub fn get_permissions(&self, role: Role, custom: &[Capability]) -> Vec<Capability> {
        if role.is_owner() {
            return vec![Capability::full_access()];
        }
        let mut effective = self.table.capabilities(role).cloned().unwrap_or_default();
        effective.extend(custom.iter().cloned());
        effective.into_vec()
    }

    /// Same as [`Self::get_permissions`] but as a set for repeated checks.
    pub fn effective_set(&self, role: Role, custom: &[Capability]) -> CapabilitySet {
        CapabilitySet::new(self.get_permissions(role, custom))
    }
}
