//! Request-level evaluation entry points.
//!
//! # Purpose
//! [`VisibilityEngine`] answers two questions for a caller: may this actor do
//! X, and which products may this actor see. It reads the actor's role
//! assignment, the organization's visibility rules, and the catalog through
//! the store traits, and evaluates everything else in memory.
//!
//! # Failure model
//! - Role assignment lookup failures propagate as [`EngineError::ActorContext`].
//! - Rule store failures are logged and treated as "no rule matched", which
//!   leaves the actor unrestricted.
//! - Catalog failures propagate as [`EngineError::Catalog`].
use crate::config::EngineConfig;
use crate::store::{CatalogStore, RoleAssignmentStore, StoreError, VisibilityRuleStore};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use vela_authz::{AuthzError, Capability, PermissionResolver, RoleTable};
use vela_common::ids::{ActorId, OrgId};
use vela_visibility::{
    ActorContext, CatalogQuery, CustomConditionMatcher, Field, FilterCompositor, PresenceMatcher,
    Product, ProductFilter, RuleResolver,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot determine actor context for {actor_id} in {org_id}")]
    ActorContext {
        org_id: OrgId,
        actor_id: ActorId,
        #[source]
        source: StoreError,
    },
    #[error("actor {actor_id} in {org_id} lacks {capability}")]
    PermissionDenied {
        org_id: OrgId,
        actor_id: ActorId,
        capability: Capability,
    },
    #[error("catalog query failed")]
    Catalog(#[source] StoreError),
    #[error(transparent)]
    Authz(#[from] AuthzError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Caller-side narrowing for a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductQueryOptions {
    /// Case-insensitive substring over product name and description.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Capped by the configured `max_results`.
    #[serde(default)]
    pub limit: Option<usize>,
}

pub struct VisibilityEngine {
    permissions: PermissionResolver,
    rules: RuleResolver<Arc<dyn CustomConditionMatcher>>,
    role_store: Arc<dyn RoleAssignmentStore>,
    rule_store: Arc<dyn VisibilityRuleStore>,
    catalog: Arc<dyn CatalogStore>,
    config: EngineConfig,
}

impl VisibilityEngine {
    /// Build an engine over separate stores.
    ///
    /// # Errors
    /// - [`EngineError::Authz`] if a configured role override is malformed.
    pub fn new(
        config: EngineConfig,
        role_store: Arc<dyn RoleAssignmentStore>,
        rule_store: Arc<dyn VisibilityRuleStore>,
        catalog: Arc<dyn CatalogStore>,
    ) -> EngineResult<Self> {
        let table = RoleTable::builtin().with_overrides(&config.role_overrides)?;
        let default_matcher: Arc<dyn CustomConditionMatcher> = Arc::new(PresenceMatcher);
        Ok(Self {
            permissions: PermissionResolver::new(table),
            rules: RuleResolver::with_custom_matcher(default_matcher),
            role_store,
            rule_store,
            catalog,
            config,
        })
    }

    /// Build an engine over one backend that serves every store trait.
    pub fn from_store<S>(config: EngineConfig, store: Arc<S>) -> EngineResult<Self>
    where
        S: RoleAssignmentStore + VisibilityRuleStore + CatalogStore + 'static,
    {
        Self::new(config, store.clone(), store.clone(), store)
    }

    /// Replace the default "matches if present" semantics of `custom` rules.
    pub fn with_custom_matcher(mut self, matcher: impl CustomConditionMatcher + 'static) -> Self {
        let matcher: Arc<dyn CustomConditionMatcher> = Arc::new(matcher);
        self.rules = RuleResolver::with_custom_matcher(matcher);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn permissions(&self) -> &PermissionResolver {
        &self.permissions
    }

    pub fn has_permission(&self, actor: &ActorContext, capability: &Capability) -> bool {
        self.permissions
            .has_permission(actor.role, capability, &actor.custom_permissions)
    }

    pub fn get_permissions(&self, actor: &ActorContext) -> Vec<Capability> {
        self.permissions
            .get_permissions(actor.role, &actor.custom_permissions)
    }

    /// Load the actor's role and attributes for `org_id`.
    pub async fn actor_context(&self, org_id: OrgId, actor_id: ActorId) -> EngineResult<ActorContext> {
        match self.role_store.role_assignment(org_id, actor_id).await {
            Ok(assignment) => Ok(assignment.into_context()),
            Err(source) => {
                tracing::warn!(
                    org_id = %org_id,
                    actor_id = %actor_id,
                    error = %source,
                    "role assignment lookup failed"
                );
                Err(EngineError::ActorContext {
                    org_id,
                    actor_id,
                    source,
                })
            }
        }
    }

    /// Resolve the product filter for `actor`.
    ///
    /// # Returns
    /// - `Some(filter)` from the first matching rule.
    /// - `None` when no rule matches or the rule store is unavailable; both
    ///   mean unrestricted.
    pub async fn evaluate_visibility_rules(&self, actor: &ActorContext) -> Option<ProductFilter> {
        let rules = match self.rule_store.active_rules(actor.org_id).await {
            Ok(rules) => rules,
            Err(err) => {
                tracing::warn!(
                    org_id = %actor.org_id,
                    actor_id = %actor.actor_id,
                    error = %err,
                    "visibility rule fetch failed, serving unrestricted"
                );
                metrics::counter!("vela_rule_store_errors_total").increment(1);
                metrics::counter!("vela_visibility_evaluations_total", "outcome" => "store_error")
                    .increment(1);
                return None;
            }
        };
        let filter = self.rules.resolve(&rules, actor);
        let outcome = if filter.is_some() { "matched" } else { "unrestricted" };
        metrics::counter!("vela_visibility_evaluations_total", "outcome" => outcome).increment(1);
        filter
    }

    /// List the products `actor_id` may see in `org_id`.
    ///
    /// # Errors
    /// - [`EngineError::ActorContext`] if the role assignment cannot be read.
    /// - [`EngineError::PermissionDenied`] if the actor lacks the browse
    ///   capability.
    /// - [`EngineError::Catalog`] if either catalog source fails.
    pub async fn get_visible_products_for_user(
        &self,
        org_id: OrgId,
        actor_id: ActorId,
        options: &ProductQueryOptions,
    ) -> EngineResult<Vec<Product>> {
        let actor = self.actor_context(org_id, actor_id).await?;
        let capability = &self.config.browse_capability;
        if !self.has_permission(&actor, capability) {
            tracing::info!(
                org_id = %org_id,
                actor_id = %actor_id,
                capability = %capability,
                "product listing denied"
            );
            metrics::counter!("vela_permission_denials_total").increment(1);
            return Err(EngineError::PermissionDenied {
                org_id,
                actor_id,
                capability: capability.clone(),
            });
        }

        let filter = self.evaluate_visibility_rules(&actor).await;
        let limit = self.effective_limit(options.limit);
        let plan = FilterCompositor::plan(
            base_query(options, limit),
            filter.as_ref(),
            self.config.partner_catalog,
        );

        let first_party = self
            .catalog
            .query_first_party(org_id, &plan.first_party)
            .await
            .map_err(|err| self.catalog_error(org_id, actor_id, err))?;
        let partner = match &plan.partner {
            Some(query) => self
                .catalog
                .query_partner(org_id, query)
                .await
                .map_err(|err| self.catalog_error(org_id, actor_id, err))?,
            None => Vec::new(),
        };

        let products = FilterCompositor::merge(first_party, partner, Some(limit));
        tracing::debug!(
            org_id = %org_id,
            actor_id = %actor_id,
            restricted = filter.is_some(),
            partner_queried = plan.partner.is_some(),
            count = products.len(),
            "visible products listed"
        );
        Ok(products)
    }

    fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.map_or(self.config.max_results, |limit| {
            limit.min(self.config.max_results)
        })
    }

    fn catalog_error(&self, org_id: OrgId, actor_id: ActorId, err: StoreError) -> EngineError {
        tracing::warn!(
            org_id = %org_id,
            actor_id = %actor_id,
            backend = self.catalog.backend_name(),
            error = %err,
            "catalog query failed"
        );
        EngineError::Catalog(err)
    }
}

fn base_query(options: &ProductQueryOptions, limit: usize) -> CatalogQuery {
    let mut query = CatalogQuery::new().limit(limit);
    if let Some(term) = options.search.as_deref() {
        query = query.search(term);
    }
    if let Some(category) = options.category.as_deref().map(str::trim)
        && !category.is_empty()
    {
        query = query.is_in(Field::Category, [category]);
    }
    query
}
