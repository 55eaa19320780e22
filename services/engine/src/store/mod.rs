//! Store seams consumed by the engine.
//!
//! # Purpose
//! The engine never owns identity, rule, or catalog data. These traits are the
//! read surfaces it needs from the stores that do; `memory` provides a
//! self-contained backend for tests, demos, and embedding.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vela_authz::{Capability, Role};
use vela_common::ids::{ActorId, OrgId};
use vela_visibility::{ActorContext, CatalogQuery, Product, VisibilityRule};

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid: {0}")]
    Invalid(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An actor's membership in one organization, as the identity layer reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
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

impl RoleAssignment {
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

    pub fn into_context(self) -> ActorContext {
        ActorContext {
            org_id: self.org_id,
            actor_id: self.actor_id,
            role: self.role,
            custom_permissions: self.custom_permissions,
            customer_type: self.customer_type,
            location: self.location,
            plan: self.plan,
        }
    }
}

#[async_trait]
pub trait RoleAssignmentStore: Send + Sync {
    async fn role_assignment(&self, org_id: OrgId, actor_id: ActorId) -> StoreResult<RoleAssignment>;
}

#[async_trait]
pub trait VisibilityRuleStore: Send + Sync {
    /// Active rules of `org_id`. Returned order carries no meaning.
    async fn active_rules(&self, org_id: OrgId) -> StoreResult<Vec<VisibilityRule>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn query_first_party(&self, org_id: OrgId, query: &CatalogQuery) -> StoreResult<Vec<Product>>;
    async fn query_partner(&self, org_id: OrgId, query: &CatalogQuery) -> StoreResult<Vec<Product>>;
    fn backend_name(&self) -> &'static str;
}
