use crate::ProductFilters;
use serde::{Deserialize, Serialize};
use vela_common::ids::ProductId;

/// Normalized filter derived from a winning rule.
///
/// Empty or blank lists are dropped (`None` means "no constraint on this
/// field"), values are trimmed and de-duplicated, and the partner flag
/// defaults to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub include_partner_products: bool,
    pub product_ids: Option<Vec<ProductId>>,
}

impl ProductFilter {
    /// True when applying this filter narrows nothing.
    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_none()
            && self.tags.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.product_ids.is_none()
            && self.include_partner_products
    }
}

impl From<&ProductFilters> for ProductFilter {
    fn from(stored: &ProductFilters) -> Self {
        Self {
            categories: normalize_values(stored.categories.as_deref()),
            tags: normalize_values(stored.tags.as_deref()),
            min_price: stored.min_price,
            max_price: stored.max_price,
            include_partner_products: stored.include_partner_products.unwrap_or(true),
            product_ids: stored
                .product_ids
                .as_ref()
                .filter(|ids| !ids.is_empty())
                .map(|ids| dedup(ids.iter().copied())),
        }
    }
}

fn normalize_values(values: Option<&[String]>) -> Option<Vec<String>> {
    let cleaned = dedup(
        values?
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string),
    );
    (!cleaned.is_empty()).then_some(cleaned)
}

// Order-preserving; lists are short so a linear scan is fine.
fn dedup<T: PartialEq>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
