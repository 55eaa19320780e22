//! Visibility rule resolution.
//!
//! # Purpose
//! Picks the single winning rule for an actor and turns it into a
//! [`ProductFilter`].
//!
//! # Key invariants
//! - Only active rules of the actor's organization take part.
//! - Order is descending priority; equal priorities keep input order. The
//!   tie-break is carried explicitly as the input index.
//! - Attribute rules skip actors whose attribute is blank or not listed.
//! - A rule with no conditions recorded for its type always matches.
//! - Custom payloads are handed to a [`CustomConditionMatcher`]; the default
//!   matches whenever a payload is present.
use crate::{ActorContext, ProductFilter, RuleType, VisibilityRule};
use std::cmp::Reverse;

/// Hook for organization-defined `custom` rule payloads.
pub trait CustomConditionMatcher: Send + Sync {
    fn matches(&self, payload: &serde_json::Value, actor: &ActorContext) -> bool;
}

impl<T: CustomConditionMatcher + ?Sized> CustomConditionMatcher for std::sync::Arc<T> {
    fn matches(&self, payload: &serde_json::Value, actor: &ActorContext) -> bool {
        (**self).matches(payload, actor)
    }
}

/// Matches any non-null custom payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceMatcher;

impl CustomConditionMatcher for PresenceMatcher {
    fn matches(&self, payload: &serde_json::Value, _actor: &ActorContext) -> bool {
        !payload.is_null()
    }
}

/// First-match resolver over an organization's visibility rules.
///
/// # Example
/// ```rust
/// use vela_authz::Role;
/// use vela_common::ids::{ActorId, OrgId};
/// use vela_visibility::{
///     ActorContext, ProductFilters, RuleConditions, RuleResolver, RuleType, VisibilityRule,
/// };
///
/// let org = OrgId::new();
/// let vip = VisibilityRule::new(org, RuleType::CustomerType, 10)
///     .with_conditions(RuleConditions {
///         customer_types: Some(vec!["vip".into()]),
///         ..Default::default()
///     })
///     .with_filters(ProductFilters {
///         categories: Some(vec!["premium".into()]),
///         ..Default::default()
///     });
/// let actor = ActorContext::new(org, ActorId::new(), Role::User).with_customer_type("vip");
/// let filter = RuleResolver::new().resolve(&[vip], &actor).expect("vip rule");
/// assert_eq!(filter.categories, Some(vec!["premium".to_string()]));
/// ```
#[derive(Debug, Clone)]
pub struct RuleResolver<M = PresenceMatcher> {
    custom: M,
}

impl RuleResolver {
    pub fn new() -> Self {
        Self {
            custom: PresenceMatcher,
        }
    }
}

impl Default for RuleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: CustomConditionMatcher> RuleResolver<M> {
    pub fn with_custom_matcher(custom: M) -> Self {
        Self { custom }
    }

    /// Return the winning rule, if any.
    ///
    /// # Parameters
    /// - `rules`: the organization's rules in store order; order is not trusted.
    /// - `actor`: the requesting actor.
    ///
    /// # Returns
    /// - The first eligible rule by descending priority, ties in input order.
    pub fn select<'a>(
        &self,
        rules: &'a [VisibilityRule],
        actor: &ActorContext,
    ) -> Option<&'a VisibilityRule> {
        let mut candidates: Vec<(usize, &VisibilityRule)> = rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.is_active && rule.org_id == actor.org_id)
            .collect();
        candidates.sort_by_key(|(index, rule)| (Reverse(rule.priority), *index));

        let winner = candidates
            .into_iter()
            .map(|(_, rule)| rule)
            .find(|rule| self.rule_matches(rule, actor));
        match winner {
            Some(rule) => tracing::debug!(
                org_id = %actor.org_id,
                actor_id = %actor.actor_id,
                rule_id = %rule.id,
                rule_type = %rule.rule_type,
                priority = rule.priority,
                "visibility rule matched"
            ),
            None => tracing::debug!(
                org_id = %actor.org_id,
                actor_id = %actor.actor_id,
                "no visibility rule matched"
            ),
        }
        winner
    }

    /// Resolve the filter for `actor`; `None` means unrestricted.
    ///
    /// A winning rule that fails [`VisibilityRule::validate`] is still applied
    /// as written; it is logged because its filter can hide every product.
    pub fn resolve(&self, rules: &[VisibilityRule], actor: &ActorContext) -> Option<ProductFilter> {
        let rule = self.select(rules, actor)?;
        if let Err(err) = rule.validate() {
            tracing::warn!(
                org_id = %actor.org_id,
                actor_id = %actor.actor_id,
                rule_id = %rule.id,
                error = %err,
                "winning visibility rule is invalid, listing may be empty"
            );
        }
        Some(ProductFilter::from(&rule.product_filters))
    }

    /// Whether `rule`'s condition is satisfied by `actor`, ignoring activity
    /// and organization.
    pub fn rule_matches(&self, rule: &VisibilityRule, actor: &ActorContext) -> bool {
        match rule.rule_type {
            RuleType::Custom => rule
                .conditions
                .custom
                .as_ref()
                .is_none_or(|payload| self.custom.matches(payload, actor)),
            attribute_rule => {
                let Some(kind) = attribute_rule.attribute() else {
                    return false;
                };
                let Some(allowed) = rule.conditions.allowed(kind) else {
                    return true;
                };
                actor
                    .attribute(kind)
                    .is_some_and(|value| allowed.iter().any(|candidate| candidate == value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProductFilters, RuleConditions};
    use vela_authz::Role;
    use vela_common::ids::{ActorId, OrgId};

    fn categories(values: &[&str]) -> ProductFilters {
        ProductFilters {
            categories: Some(values.iter().map(|v| v.to_string()).collect()),
            ..ProductFilters::default()
        }
    }

    fn list(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    fn customer_rule(org: OrgId, priority: i32, types: &[&str], cats: &[&str]) -> VisibilityRule {
        VisibilityRule::new(org, RuleType::CustomerType, priority)
            .with_conditions(RuleConditions {
                customer_types: list(types),
                ..RuleConditions::default()
            })
            .with_filters(categories(cats))
    }

    fn plan_rule(org: OrgId, priority: i32, plans: &[&str], cats: &[&str]) -> VisibilityRule {
        VisibilityRule::new(org, RuleType::Plan, priority)
            .with_conditions(RuleConditions {
                plans: list(plans),
                ..RuleConditions::default()
            })
            .with_filters(categories(cats))
    }

    fn actor(org: OrgId) -> ActorContext {
        ActorContext::new(org, ActorId::new(), Role::User)
    }

    #[test]
    fn no_rules_is_unrestricted() {
        let org = OrgId::new();
        assert_eq!(RuleResolver::new().resolve(&[], &actor(org)), None);
    }

    #[test]
    fn higher_priority_wins_when_both_match() {
        let org = OrgId::new();
        let rules = vec![
            plan_rule(org, 1, &["free"], &["basic"]),
            customer_rule(org, 10, &["vip"], &["premium"]),
        ];
        let vip = actor(org).with_customer_type("vip").with_plan("free");
        let filter = RuleResolver::new().resolve(&rules, &vip).expect("match");
        assert_eq!(filter.categories, list(&["premium"]));
    }

    #[test]
    fn equal_priorities_keep_input_order() {
        let org = OrgId::new();
        let rules = vec![
            plan_rule(org, 1, &["free"], &["one"]),
            plan_rule(org, 5, &["free"], &["first-five"]),
            plan_rule(org, 10, &["pro"], &["ten"]),
            plan_rule(org, 5, &["free"], &["second-five"]),
        ];
        let free = actor(org).with_plan("free");
        let resolver = RuleResolver::new();
        for _ in 0..16 {
            let selected = resolver.select(&rules, &free).expect("match");
            assert_eq!(selected.id, rules[1].id);
        }
    }

    #[test]
    fn unmatched_attribute_rules_fall_through() {
        let org = OrgId::new();
        let rules = vec![
            customer_rule(org, 10, &["vip"], &["premium"]),
            plan_rule(org, 1, &["free"], &["basic"]),
        ];
        let regular = actor(org).with_customer_type("regular").with_plan("free");
        let filter = RuleResolver::new().resolve(&rules, &regular).expect("plan rule");
        assert_eq!(filter.categories, list(&["basic"]));

        let nobody = actor(org);
        assert_eq!(RuleResolver::new().resolve(&rules, &nobody), None);
    }

    #[test]
    fn blank_attribute_never_satisfies_listed_values() {
        let org = OrgId::new();
        let rules = vec![customer_rule(org, 1, &[""], &["premium"])];
        let blank = actor(org).with_customer_type("");
        assert_eq!(RuleResolver::new().resolve(&rules, &blank), None);
    }

    #[test]
    fn recorded_empty_list_admits_nobody() {
        let org = OrgId::new();
        let rules = vec![customer_rule(org, 1, &[], &["premium"])];
        let vip = actor(org).with_customer_type("vip");
        assert_eq!(RuleResolver::new().resolve(&rules, &vip), None);
    }

    #[test]
    fn missing_conditions_match_unconditionally() {
        let org = OrgId::new();
        let rule = VisibilityRule::new(org, RuleType::Location, 3).with_filters(categories(&["local"]));
        let filter = RuleResolver::new()
            .resolve(&[rule], &actor(org))
            .expect("unconditional");
        assert_eq!(filter.categories, list(&["local"]));
    }

    #[test]
    fn location_rules_follow_attribute_shape() {
        let org = OrgId::new();
        let rule = VisibilityRule::new(org, RuleType::Location, 3)
            .with_conditions(RuleConditions {
                locations: list(&["north", "south"]),
                ..RuleConditions::default()
            })
            .with_filters(categories(&["regional"]));
        let resolver = RuleResolver::new();
        assert!(resolver.resolve(std::slice::from_ref(&rule), &actor(org).with_location("south")).is_some());
        assert!(resolver.resolve(std::slice::from_ref(&rule), &actor(org).with_location("east")).is_none());
    }

    #[test]
    fn custom_rules_match_with_or_without_payload() {
        let org = OrgId::new();
        let with_payload = VisibilityRule::new(org, RuleType::Custom, 2).with_conditions(RuleConditions {
            custom: Some(serde_json::json!({ "segment": "fleet" })),
            ..RuleConditions::default()
        });
        let without_payload = VisibilityRule::new(org, RuleType::Custom, 1);
        let resolver = RuleResolver::new();
        assert!(resolver.rule_matches(&with_payload, &actor(org)));
        assert!(resolver.rule_matches(&without_payload, &actor(org)));
    }

    #[test]
    fn custom_matcher_hook_is_consulted() {
        struct Never;
        impl CustomConditionMatcher for Never {
            fn matches(&self, _payload: &serde_json::Value, _actor: &ActorContext) -> bool {
                false
            }
        }

        let org = OrgId::new();
        let rules = vec![
            VisibilityRule::new(org, RuleType::Custom, 9).with_conditions(RuleConditions {
                custom: Some(serde_json::json!({ "segment": "fleet" })),
                ..RuleConditions::default()
            }),
            plan_rule(org, 1, &["free"], &["basic"]),
        ];
        let resolver = RuleResolver::with_custom_matcher(Never);
        let selected = resolver
            .select(&rules, &actor(org).with_plan("free"))
            .expect("plan rule");
        assert_eq!(selected.id, rules[1].id);
    }

    #[test]
    fn inactive_and_foreign_rules_are_ignored() {
        let org = OrgId::new();
        let other = OrgId::new();
        let rules = vec![
            customer_rule(org, 50, &["vip"], &["hidden"]).inactive(),
            customer_rule(other, 40, &["vip"], &["foreign"]),
            customer_rule(org, 1, &["vip"], &["premium"]),
        ];
        let vip = actor(org).with_customer_type("vip");
        let filter = RuleResolver::new().resolve(&rules, &vip).expect("match");
        assert_eq!(filter.categories, list(&["premium"]));
    }

    #[test]
    fn negative_priorities_sort_below_zero() {
        let org = OrgId::new();
        let rules = vec![
            plan_rule(org, -5, &["free"], &["negative"]),
            plan_rule(org, 0, &["free"], &["zero"]),
        ];
        let filter = RuleResolver::new()
            .resolve(&rules, &actor(org).with_plan("free"))
            .expect("match");
        assert_eq!(filter.categories, list(&["zero"]));
    }

    #[derive(Clone, Default)]
    struct SharedBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn invalid_winning_rule_is_applied_and_logged() {
        let org = OrgId::new();
        let rule = customer_rule(org, 10, &["vip"], &["premium"]).with_filters(ProductFilters {
            min_price: Some(50.0),
            max_price: Some(10.0),
            ..ProductFilters::default()
        });
        assert!(rule.validate().is_err());
        let rule_id = rule.id;
        let rules = vec![rule];

        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let filter = tracing::subscriber::with_default(subscriber, || {
            RuleResolver::new().resolve(&rules, &actor(org).with_customer_type("vip"))
        })
        .expect("invalid rule still wins");
        assert_eq!(filter.min_price, Some(50.0));
        assert_eq!(filter.max_price, Some(10.0));

        let logged = String::from_utf8(buf.0.lock().expect("log buffer").clone()).expect("utf8");
        let line = logged
            .lines()
            .find(|line| line.contains("winning visibility rule is invalid"))
            .expect("warning logged");
        assert!(line.contains("WARN"));
        assert!(line.contains(&rule_id.to_string()));
    }
}
