//! Filter composition onto catalog queries.
//!
//! # Purpose
//! Applies a resolved [`ProductFilter`] (or no restriction) to a base query and
//! plans the per-source reads for the first-party and partner catalogs.
//!
//! # Key invariants
//! - `None` leaves the base query untouched.
//! - The same filter is applied to each source independently.
//! - A filter with `include_partner_products == false` yields no partner
//!   query at all.
//! - Merged output lists first-party products before partner products.
use crate::{CatalogQuery, Field, Product, ProductFilter};
use std::collections::HashSet;

/// Per-source queries for one visibility evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePlan {
    pub first_party: CatalogQuery,
    /// `None` when the partner catalog must not be queried.
    pub partner: Option<CatalogQuery>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterCompositor;

impl FilterCompositor {
    /// Narrow `base` by `filter`.
    ///
    /// # Parameters
    /// - `base`: query carrying caller-side predicates (search, category).
    /// - `filter`: the resolved rule filter; `None` means unrestricted.
    ///
    /// # Returns
    /// - The refined query. Categories and ids use `in`, tags use
    ///   `overlaps`, price bounds use `gte` / `lte`.
    pub fn apply(base: CatalogQuery, filter: Option<&ProductFilter>) -> CatalogQuery {
        let Some(filter) = filter else {
            return base;
        };
        let mut query = base;
        if let Some(categories) = &filter.categories {
            query = query.is_in(Field::Category, categories.iter().cloned());
        }
        if let Some(tags) = &filter.tags {
            query = query.overlaps(Field::Tags, tags.iter().cloned());
        }
        if let Some(min) = filter.min_price {
            query = query.gte(Field::Price, min);
        }
        if let Some(max) = filter.max_price {
            query = query.lte(Field::Price, max);
        }
        if let Some(ids) = &filter.product_ids {
            query = query.is_in(Field::Id, ids.iter().map(ToString::to_string));
        }
        query
    }

    /// Build the per-source queries.
    ///
    /// # Parameters
    /// - `base`: caller-side query shared by both sources.
    /// - `filter`: resolved rule filter.
    /// - `partner_catalog_enabled`: deployment switch for the partner source.
    pub fn plan(
        base: CatalogQuery,
        filter: Option<&ProductFilter>,
        partner_catalog_enabled: bool,
    ) -> SourcePlan {
        let include_partner =
            partner_catalog_enabled && filter.is_none_or(|filter| filter.include_partner_products);
        let first_party = Self::apply(base.clone(), filter);
        let partner = include_partner.then(|| Self::apply(base, filter));
        SourcePlan {
            first_party,
            partner,
        }
    }

    /// Union of both sources: first-party first, partner rows whose id was
    /// already seen are dropped, then truncated to `limit`.
    pub fn merge(first_party: Vec<Product>, partner: Vec<Product>, limit: Option<usize>) -> Vec<Product> {
        let mut seen = HashSet::with_capacity(first_party.len() + partner.len());
        let mut merged: Vec<Product> = first_party
            .into_iter()
            .chain(partner)
            .filter(|product| seen.insert(product.id))
            .collect();
        if let Some(limit) = limit {
            merged.truncate(limit);
        }
        merged
    }
}
