#![allow(dead_code)]

use async_trait::async_trait;
use engine::VisibilityEngine;
use engine::config::EngineConfig;
use engine::store::memory::InMemoryStore;
use engine::store::{
    CatalogStore, RoleAssignment, RoleAssignmentStore, StoreError, StoreResult,
    VisibilityRuleStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vela_authz::{Capability, Role};
use vela_common::ProductSource;
use vela_common::ids::{ActorId, OrgId};
use vela_visibility::{
    CatalogQuery, Product, ProductFilters, RuleConditions, RuleType, VisibilityRule,
};

pub struct Fixture {
    pub org: OrgId,
    pub store: Arc<InMemoryStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            org: OrgId::new(),
            store: Arc::new(InMemoryStore::new()),
        }
    }

    pub fn engine(&self) -> VisibilityEngine {
        self.engine_with(EngineConfig::default())
    }

    pub fn engine_with(&self, config: EngineConfig) -> VisibilityEngine {
        VisibilityEngine::from_store(config, self.store.clone()).expect("engine")
    }

    pub async fn actor(&self, role: Role) -> ActorId {
        self.actor_with(RoleAssignment::new(self.org, ActorId::new(), role))
            .await
    }

    pub async fn actor_with(&self, assignment: RoleAssignment) -> ActorId {
        let actor_id = assignment.actor_id;
        self.store.upsert_assignment(assignment).await;
        actor_id
    }

    pub fn assignment(&self, role: Role) -> RoleAssignment {
        RoleAssignment::new(self.org, ActorId::new(), role)
    }

    pub async fn product(&self, name: &str, category: &str, price: f64, tags: &[&str]) -> Product {
        let product = Product::new(self.org, name, price, ProductSource::FirstParty)
            .with_category(category)
            .with_tags(tags);
        self.store.add_product(product.clone()).await;
        product
    }

    pub async fn partner_product(&self, name: &str, category: &str, price: f64) -> Product {
        let product =
            Product::new(self.org, name, price, ProductSource::Partner).with_category(category);
        self.store.add_product(product.clone()).await;
        product
    }

    pub async fn rule(&self, rule: VisibilityRule) -> VisibilityRule {
        self.store.create_rule(rule).await.expect("create rule")
    }
}

pub fn customer_type_rule(org: OrgId, priority: i32, types: &[&str], categories: &[&str]) -> VisibilityRule {
    VisibilityRule::new(org, RuleType::CustomerType, priority)
        .with_conditions(RuleConditions {
            customer_types: Some(strings(types)),
            ..RuleConditions::default()
        })
        .with_filters(ProductFilters {
            categories: Some(strings(categories)),
            ..ProductFilters::default()
        })
}

pub fn plan_rule(org: OrgId, priority: i32, plans: &[&str], categories: &[&str]) -> VisibilityRule {
    VisibilityRule::new(org, RuleType::Plan, priority)
        .with_conditions(RuleConditions {
            plans: Some(strings(plans)),
            ..RuleConditions::default()
        })
        .with_filters(ProductFilters {
            categories: Some(strings(categories)),
            ..ProductFilters::default()
        })
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn names(products: &[Product]) -> Vec<&str> {
    products.iter().map(|product| product.name.as_str()).collect()
}

pub fn caps(values: &[&str]) -> Vec<Capability> {
    values.iter().map(|value| Capability::parse(value)).collect()
}

/// Rule store that always fails.
pub struct UnavailableRules {
    pub calls: AtomicUsize,
}

impl UnavailableRules {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl VisibilityRuleStore for UnavailableRules {
    async fn active_rules(&self, _org_id: OrgId) -> StoreResult<Vec<VisibilityRule>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unexpected(anyhow::anyhow!("rule store offline")))
    }
}

/// Role store that always fails.
pub struct UnavailableRoles;

#[async_trait]
impl RoleAssignmentStore for UnavailableRoles {
    async fn role_assignment(&self, _org_id: OrgId, _actor_id: ActorId) -> StoreResult<RoleAssignment> {
        Err(StoreError::Unexpected(anyhow::anyhow!("identity provider offline")))
    }
}

/// Catalog that records the queries it receives and can fail either source.
#[derive(Default)]
pub struct RecordingCatalog {
    pub first_party: std::sync::Mutex<Vec<CatalogQuery>>,
    pub partner: std::sync::Mutex<Vec<CatalogQuery>>,
    pub fail_first_party: bool,
    pub fail_partner: bool,
}

#[async_trait]
impl CatalogStore for RecordingCatalog {
    async fn query_first_party(&self, _org_id: OrgId, query: &CatalogQuery) -> StoreResult<Vec<Product>> {
        self.first_party
            .lock()
            .expect("lock")
            .push(query.clone());
        if self.fail_first_party {
            return Err(StoreError::Unexpected(anyhow::anyhow!("catalog offline")));
        }
        Ok(Vec::new())
    }

    async fn query_partner(&self, _org_id: OrgId, query: &CatalogQuery) -> StoreResult<Vec<Product>> {
        self.partner.lock().expect("lock").push(query.clone());
        if self.fail_partner {
            return Err(StoreError::Unexpected(anyhow::anyhow!("partner catalog offline")));
        }
        Ok(Vec::new())
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}
