//! In-memory implementation of the engine stores.
//!
//! # Purpose
//! Implements [`RoleAssignmentStore`], [`VisibilityRuleStore`], and
//! [`CatalogStore`] entirely in memory using `HashMap`s guarded by
//! `tokio::sync::RwLock`. It exists for:
//! - tests and demos (no external dependencies)
//! - embedding the engine where the hosted backend is mirrored locally
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: writes take a write lock, reads a read lock.
//!
//! # Ordering
//! Rules come back in insertion order and products in insertion order per
//! source. The engine does not depend on rule order; it re-sorts.
//!
//! # Metrics
//! Rule and product gauges are updated on every write so local runs expose the
//! same series a hosted backend would. Product counts are labeled by `source`.
use super::{
    CatalogStore, RoleAssignment, RoleAssignmentStore, StoreError, StoreResult,
    VisibilityRuleStore,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vela_common::ProductSource;
use vela_common::ids::{ActorId, OrgId, RuleId};
use vela_visibility::{CatalogQuery, Product, VisibilityRule};

#[derive(Default)]
pub struct InMemoryStore {
    /// Role assignments keyed by `(org_id, actor_id)`.
    assignments: Arc<RwLock<HashMap<(OrgId, ActorId), RoleAssignment>>>,
    /// Visibility rules per organization, active or not.
    rules: Arc<RwLock<HashMap<OrgId, Vec<VisibilityRule>>>>,
    /// First-party products per organization.
    first_party: Arc<RwLock<HashMap<OrgId, Vec<Product>>>>,
    /// Partner products offered to each organization.
    partner: Arc<RwLock<HashMap<OrgId, Vec<Product>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_assignment(&self, assignment: RoleAssignment) {
        let mut assignments = self.assignments.write().await;
        assignments.insert((assignment.org_id, assignment.actor_id), assignment);
    }

    pub async fn remove_assignment(&self, org_id: OrgId, actor_id: ActorId) -> StoreResult<()> {
        let mut assignments = self.assignments.write().await;
        assignments
            .remove(&(org_id, actor_id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("assignment {org_id}/{actor_id}")))
    }

    /// Insert a new rule after validating it.
    pub async fn create_rule(&self, rule: VisibilityRule) -> StoreResult<VisibilityRule> {
        rule.validate()
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let mut rules = self.rules.write().await;
        let org_rules = rules.entry(rule.org_id).or_default();
        if org_rules.iter().any(|existing| existing.id == rule.id) {
            return Err(StoreError::Conflict(format!("rule {}", rule.id)));
        }
        org_rules.push(rule.clone());
        metrics::gauge!("vela_visibility_rules_total").set(count_rules(&rules) as f64);
        Ok(rule)
    }

    /// Replace an existing rule in place, keeping its position.
    pub async fn update_rule(&self, rule: VisibilityRule) -> StoreResult<VisibilityRule> {
        rule.validate()
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        let mut rules = self.rules.write().await;
        let slot = rules
            .get_mut(&rule.org_id)
            .and_then(|org_rules| org_rules.iter_mut().find(|existing| existing.id == rule.id))
            .ok_or_else(|| StoreError::NotFound(format!("rule {}", rule.id)))?;
        *slot = rule.clone();
        Ok(rule)
    }

    pub async fn set_rule_active(&self, org_id: OrgId, rule_id: RuleId, active: bool) -> StoreResult<()> {
        let mut rules = self.rules.write().await;
        let rule = rules
            .get_mut(&org_id)
            .and_then(|org_rules| org_rules.iter_mut().find(|rule| rule.id == rule_id))
            .ok_or_else(|| StoreError::NotFound(format!("rule {rule_id}")))?;
        rule.is_active = active;
        Ok(())
    }

    pub async fn delete_rule(&self, org_id: OrgId, rule_id: RuleId) -> StoreResult<()> {
        let mut rules = self.rules.write().await;
        let org_rules = rules
            .get_mut(&org_id)
            .ok_or_else(|| StoreError::NotFound(format!("rule {rule_id}")))?;
        let before = org_rules.len();
        org_rules.retain(|rule| rule.id != rule_id);
        if org_rules.len() == before {
            return Err(StoreError::NotFound(format!("rule {rule_id}")));
        }
        metrics::gauge!("vela_visibility_rules_total").set(count_rules(&rules) as f64);
        Ok(())
    }

    /// Add a product to the catalog matching its `source`.
    pub async fn add_product(&self, product: Product) {
        let target = match product.source {
            ProductSource::FirstParty => &self.first_party,
            ProductSource::Partner => &self.partner,
        };
        let source = product.source;
        let mut products = target.write().await;
        products.entry(product.org_id).or_default().push(product);
        let total: usize = products.values().map(Vec::len).sum();
        metrics::gauge!("vela_catalog_products_total", "source" => source.as_str()).set(total as f64);
    }
}

fn count_rules(rules: &HashMap<OrgId, Vec<VisibilityRule>>) -> usize {
    rules.values().map(Vec::len).sum()
}

async fn run_query(
    source: &RwLock<HashMap<OrgId, Vec<Product>>>,
    org_id: OrgId,
    query: &CatalogQuery,
) -> Vec<Product> {
    let products = source.read().await;
    let matching = products
        .get(&org_id)
        .into_iter()
        .flatten()
        .filter(|product| query.matches(product))
        .cloned();
    match query.limit {
        Some(limit) => matching.take(limit).collect(),
        None => matching.collect(),
    }
}

#[async_trait]
impl RoleAssignmentStore for InMemoryStore {
    async fn role_assignment(&self, org_id: OrgId, actor_id: ActorId) -> StoreResult<RoleAssignment> {
        let assignments = self.assignments.read().await;
        assignments
            .get(&(org_id, actor_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("assignment {org_id}/{actor_id}")))
    }
}

#[async_trait]
impl VisibilityRuleStore for InMemoryStore {
    async fn active_rules(&self, org_id: OrgId) -> StoreResult<Vec<VisibilityRule>> {
        let rules = self.rules.read().await;
        Ok(rules
            .get(&org_id)
            .into_iter()
            .flatten()
            .filter(|rule| rule.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn query_first_party(&self, org_id: OrgId, query: &CatalogQuery) -> StoreResult<Vec<Product>> {
        Ok(run_query(&self.first_party, org_id, query).await)
    }

    async fn query_partner(&self, org_id: OrgId, query: &CatalogQuery) -> StoreResult<Vec<Product>> {
        Ok(run_query(&self.partner, org_id, query).await)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
