//! Catalog query model.
//!
//! # Purpose
//! An abstract, backend-neutral description of a filtered catalog read. Store
//! backends translate it to their own query language; the in-memory backend
//! evaluates it directly with [`CatalogQuery::matches`].
//!
//! # Key invariants
//! - Top-level predicates are combined with AND; [`Predicate::Or`] nests.
//! - `overlaps` is non-empty intersection, not containment.
//! - Text search is a case-insensitive substring match.
//! - Inactive products never match unless `active_only` is cleared.
use serde::{Deserialize, Serialize};
use vela_common::ProductSource;
use vela_common::ids::{OrgId, ProductId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub org_id: OrgId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub source: ProductSource,
}

fn default_active() -> bool {
    true
}

impl Product {
    pub fn new(org_id: OrgId, name: impl Into<String>, price: f64, source: ProductSource) -> Self {
        Self {
            id: ProductId::new(),
            org_id,
            name: name.into(),
            description: None,
            category: None,
            tags: Vec::new(),
            price,
            is_active: true,
            source,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|tag| tag.to_string()).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn text_values(&self, field: Field) -> Vec<String> {
        match field {
            Field::Id => vec![self.id.to_string()],
            Field::Category => self.category.iter().cloned().collect(),
            Field::Tags => self.tags.clone(),
            Field::Name => vec![self.name.clone()],
            Field::Description => self.description.iter().cloned().collect(),
            Field::Price => vec![self.price.to_string()],
        }
    }

    fn numeric_value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Price => Some(self.price),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Category,
    Tags,
    Name,
    Description,
    Price,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Category => "category",
            Field::Tags => "tags",
            Field::Name => "name",
            Field::Description => "description",
            Field::Price => "price",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    In { field: Field, values: Vec<String> },
    Overlaps { field: Field, values: Vec<String> },
    Gte { field: Field, value: f64 },
    Lte { field: Field, value: f64 },
    Contains { field: Field, needle: String },
    Or { any: Vec<Predicate> },
}

impl Predicate {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Predicate::In { field, values } | Predicate::Overlaps { field, values } => product
                .text_values(*field)
                .iter()
                .any(|value| values.contains(value)),
            Predicate::Gte { field, value } => product
                .numeric_value(*field)
                .is_some_and(|actual| actual >= *value),
            Predicate::Lte { field, value } => product
                .numeric_value(*field)
                .is_some_and(|actual| actual <= *value),
            Predicate::Contains { field, needle } => {
                let needle = needle.to_lowercase();
                product
                    .text_values(*field)
                    .iter()
                    .any(|value| value.to_lowercase().contains(&needle))
            }
            Predicate::Or { any } => any.iter().any(|predicate| predicate.matches(product)),
        }
    }
}

/// Filterable query over one catalog source.
///
/// # Example
/// ```rust
/// use vela_common::ProductSource;
/// use vela_common::ids::OrgId;
/// use vela_visibility::{CatalogQuery, Field, Product};
///
/// let product = Product::new(OrgId::new(), "Ceramic Coat", 120.0, ProductSource::FirstParty)
///     .with_tags(&["premium", "new"]);
/// let query = CatalogQuery::new()
///     .overlaps(Field::Tags, ["premium"])
///     .lte(Field::Price, 150.0);
/// assert!(query.matches(&product));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub predicates: Vec<Predicate>,
    pub active_only: bool,
    pub limit: Option<usize>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
            active_only: true,
            limit: None,
        }
    }

    /// Narrow to rows whose `field` equals one of `values`.
    pub fn is_in<I, S>(self, field: Field, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Predicate::In {
            field,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Narrow to rows whose array `field` shares at least one of `values`.
    pub fn overlaps<I, S>(self, field: Field, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Predicate::Overlaps {
            field,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn gte(self, field: Field, value: f64) -> Self {
        self.with(Predicate::Gte { field, value })
    }

    pub fn lte(self, field: Field, value: f64) -> Self {
        self.with(Predicate::Lte { field, value })
    }

    pub fn or(self, any: Vec<Predicate>) -> Self {
        self.with(Predicate::Or { any })
    }

    /// Free-text search across name and description.
    pub fn search(self, term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            return self;
        }
        self.or(vec![
            Predicate::Contains {
                field: Field::Name,
                needle: term.to_string(),
            },
            Predicate::Contains {
                field: Field::Description,
                needle: term.to_string(),
            },
        ])
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn include_inactive(mut self) -> Self {
        self.active_only = false;
        self
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn matches(&self, product: &Product) -> bool {
        if self.active_only && !product.is_active {
            return false;
        }
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product::new(OrgId::new(), "Ceramic Coat", 120.0, ProductSource::FirstParty)
            .with_category("premium")
            .with_tags(&["premium", "new"])
            .with_description("Nine month gloss protection")
    }

    #[test]
    fn in_matches_membership() {
        let p = product();
        assert!(CatalogQuery::new().is_in(Field::Category, ["basic", "premium"]).matches(&p));
        assert!(!CatalogQuery::new().is_in(Field::Category, ["basic"]).matches(&p));
        assert!(CatalogQuery::new().is_in(Field::Id, [p.id.to_string()]).matches(&p));
    }

    #[test]
    fn missing_category_never_matches_in() {
        let mut p = product();
        p.category = None;
        assert!(!CatalogQuery::new().is_in(Field::Category, ["premium"]).matches(&p));
    }

    #[test]
    fn overlaps_is_intersection_not_containment() {
        let premium_new = product();
        let mut only_new = product();
        only_new.tags = vec!["new".to_string()];
        let query = CatalogQuery::new().overlaps(Field::Tags, ["premium"]);
        assert!(query.matches(&premium_new));
        assert!(!query.matches(&only_new));
        let wide = CatalogQuery::new().overlaps(Field::Tags, ["premium", "sale", "clearance"]);
        assert!(wide.matches(&premium_new));
    }

    #[test]
    fn price_bounds_are_inclusive_and_independent() {
        let p = product();
        assert!(CatalogQuery::new().gte(Field::Price, 120.0).matches(&p));
        assert!(CatalogQuery::new().lte(Field::Price, 120.0).matches(&p));
        assert!(!CatalogQuery::new().gte(Field::Price, 120.5).matches(&p));
        assert!(!CatalogQuery::new().gte(Field::Price, 10.0).lte(Field::Price, 100.0).matches(&p));
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let p = product();
        assert!(CatalogQuery::new().search("ceramic").matches(&p));
        assert!(CatalogQuery::new().search("GLOSS").matches(&p));
        assert!(!CatalogQuery::new().search("tint").matches(&p));
        assert_eq!(CatalogQuery::new().search("   "), CatalogQuery::new());
    }

    #[test]
    fn inactive_products_are_hidden_by_default() {
        let mut p = product();
        p.is_active = false;
        assert!(!CatalogQuery::new().matches(&p));
        assert!(CatalogQuery::new().include_inactive().matches(&p));
    }

    #[test]
    fn predicates_serialize_with_op_tag() {
        let query = CatalogQuery::new().gte(Field::Price, 5.0);
        let encoded = serde_json::to_value(&query).expect("encode");
        assert_eq!(encoded["predicates"][0]["op"], "gte");
        assert_eq!(encoded["predicates"][0]["field"], "price");
    }
}
