use crate::{AuthzResult, Capability};
use std::collections::HashSet;

/// Ordered, de-duplicated set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    ordered: Vec<Capability>,
    index: HashSet<Capability>,
}

impl CapabilitySet {
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        let mut set = Self::default();
        set.extend(capabilities);
        set
    }

    pub fn from_strings(capabilities: &[String]) -> AuthzResult<Self> {
        let mut parsed = Vec::with_capacity(capabilities.len());
        for capability in capabilities {
            parsed.push(capability.parse()?);
        }
        Ok(Self::new(parsed))
    }

    /// Insert keeping first-seen order; returns false for duplicates.
    pub fn insert(&mut self, capability: Capability) -> bool {
        if self.index.contains(&capability) {
            return false;
        }
        self.index.insert(capability.clone());
        self.ordered.push(capability);
        true
    }

    pub fn extend(&mut self, capabilities: impl IntoIterator<Item = Capability>) {
        for capability in capabilities {
            self.insert(capability);
        }
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.index.contains(capability)
    }

    /// Direct membership first, then the `resource:*` form.
    pub fn grants(&self, capability: &Capability) -> bool {
        grants_in(|candidate| self.contains(candidate), capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn into_vec(self) -> Vec<Capability> {
        self.ordered
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Shared two-step lookup used for both role tables and ad-hoc custom grants.
pub(crate) fn grants_in(contains: impl Fn(&Capability) -> bool, capability: &Capability) -> bool {
    if contains(capability) {
        return true;
    }
    capability
        .resource_wildcard()
        .is_some_and(|wildcard| contains(&wildcard))
}
