//! Per-request actor context.
//!
//! # Purpose
//! Bundles the resolved identity and attributes every evaluation reads.
//!
//! # Key invariants
//! - Built fresh per request by the caller; never persisted here.
//! - Blank attributes are treated as absent.
use serde::{Deserialize, Serialize};
use vela_authz::{Capability, Role};
use vela_common::ids::{ActorId, OrgId};

/// Actor attributes a visibility rule can condition on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    CustomerType,
    Location,
    Plan,
}

impl AttributeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::CustomerType => "customer_type",
            AttributeKind::Location => "location",
            AttributeKind::Plan => "plan",
        }
    }
}

/// Resolved identity and attribute bundle for one request.
///
/// # Example
/// ```rust
/// use vela_authz::Role;
/// use vela_common::ids::{ActorId, OrgId};
/// use vela_visibility::{ActorContext, AttributeKind};
///
/// let actor = ActorContext::new(OrgId::new(), ActorId::new(), Role::User)
///     .with_customer_type("vip")
///     .with_plan("  ");
/// assert_eq!(actor.attribute(AttributeKind::CustomerType), Some("vip"));
/// assert_eq!(actor.attribute(AttributeKind::Plan), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorContext {
    pub org_id: OrgId,
    pub actor_id: ActorId,
    pub role: Role,
    #[serde(default)]
    pub custom_permissions: Vec<Capability>,
    #[serde(default)]
    pub customer_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

impl ActorContext {
    pub fn new(org_id: OrgId, actor_id: ActorId, role: Role) -> Self {
        Self {
            org_id,
            actor_id,
            role,
            custom_permissions: Vec::new(),
            customer_type: None,
            location: None,
            plan: None,
        }
    }

    pub fn with_custom_permissions(mut self, custom: Vec<Capability>) -> Self {
        self.custom_permissions = custom;
        self
    }

    pub fn with_customer_type(mut self, value: impl Into<String>) -> Self {
        self.customer_type = Some(value.into());
        self
    }

    pub fn with_location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn with_plan(mut self, value: impl Into<String>) -> Self {
        self.plan = Some(value.into());
        self
    }

    /// Attribute value, or `None` when absent or blank.
    pub fn attribute(&self, kind: AttributeKind) -> Option<&str> {
        let value = match kind {
            AttributeKind::CustomerType => self.customer_type.as_deref(),
            AttributeKind::Location => self.location.as_deref(),
            AttributeKind::Plan => self.plan.as_deref(),
        };
        value.filter(|value| !value.trim().is_empty())
    }
}
