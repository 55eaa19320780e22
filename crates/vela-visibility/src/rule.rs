//! Stored visibility rule shapes.
//!
//! # Purpose
//! Mirrors the rule records organization admins create. These are read-only
//! inputs to evaluation.
//!
//! # Key invariants
//! - A rule belongs to exactly one organization.
//! - `conditions` fields that are `None` were never recorded; a recorded but
//!   empty list admits nobody.
//! - `validate` is for administrative tooling; evaluation never rejects a rule.
use crate::{AttributeKind, VisibilityError, VisibilityResult};
use serde::{Deserialize, Serialize};
use vela_common::ids::{OrgId, ProductId, RuleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    CustomerType,
    Location,
    Plan,
    Custom,
}

impl RuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::CustomerType => "customer_type",
            RuleType::Location => "location",
            RuleType::Plan => "plan",
            RuleType::Custom => "custom",
        }
    }

    /// Actor attribute this rule type compares against; `None` for custom rules.
    pub fn attribute(self) -> Option<AttributeKind> {
        match self {
            RuleType::CustomerType => Some(AttributeKind::CustomerType),
            RuleType::Location => Some(AttributeKind::Location),
            RuleType::Plan => Some(AttributeKind::Plan),
            RuleType::Custom => None,
        }
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plans: Option<Vec<String>>,
    /// Organization-defined payload for `custom` rules; not interpreted here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

impl RuleConditions {
    pub fn allowed(&self, kind: AttributeKind) -> Option<&[String]> {
        match kind {
            AttributeKind::CustomerType => self.customer_types.as_deref(),
            AttributeKind::Location => self.locations.as_deref(),
            AttributeKind::Plan => self.plans.as_deref(),
        }
    }
}

/// Filter settings as stored on a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_partner_products: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<ProductId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityRule {
    pub id: RuleId,
    pub org_id: OrgId,
    #[serde(default)]
    pub name: String,
    pub rule_type: RuleType,
    #[serde(default)]
    pub conditions: RuleConditions,
    #[serde(default)]
    pub product_filters: ProductFilters,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl VisibilityRule {
    pub fn new(org_id: OrgId, rule_type: RuleType, priority: i32) -> Self {
        Self {
            id: RuleId::new(),
            org_id,
            name: String::new(),
            rule_type,
            conditions: RuleConditions::default(),
            product_filters: ProductFilters::default(),
            priority,
            is_active: true,
        }
    }

    pub fn with_conditions(mut self, conditions: RuleConditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_filters(mut self, filters: ProductFilters) -> Self {
        self.product_filters = filters;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Check a rule before an admin saves it.
    ///
    /// # Errors
    /// - [`VisibilityError::InvalidRule`] for negative or non-finite price
    ///   bounds, or `min_price > max_price`.
    pub fn validate(&self) -> VisibilityResult<()> {
        let filters = &self.product_filters;
        for (label, bound) in [("min_price", filters.min_price), ("max_price", filters.max_price)] {
            if bound.is_some_and(|value| !value.is_finite() || value < 0.0) {
                return Err(self.invalid(format!("{label} must be a non-negative number")));
            }
        }
        if let (Some(min), Some(max)) = (filters.min_price, filters.max_price) {
            if min > max {
                return Err(self.invalid("min_price exceeds max_price".to_string()));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> VisibilityError {
        VisibilityError::InvalidRule {
            rule_id: self.id,
            reason,
        }
    }
}
