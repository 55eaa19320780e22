//! Catalog visibility for vela organizations.
//!
//! # Purpose
//! Turns an organization's visibility rules plus an actor's attributes into a
//! single product filter, and composes that filter onto catalog queries for
//! the first-party and partner catalogs.
//!
//! # How it fits
//! The engine service fetches rules and products through its stores and uses
//! [`RuleResolver`] and [`FilterCompositor`] from this crate in between.
//! Nothing here performs I/O.
//!
//! # Key invariants
//! - At most one rule wins: the first active rule of the actor's organization,
//!   by descending priority with ties kept in input order, whose conditions
//!   the actor satisfies.
//! - No winning rule means `None`, which is "show everything".
//! - Tag filters match on overlap, not containment.
//!
//! # Examples
//! ```rust
//! use vela_authz::Role;
//! use vela_common::ids::{ActorId, OrgId};
//! use vela_visibility::{ActorContext, RuleResolver};
//!
//! let actor = ActorContext::new(OrgId::new(), ActorId::new(), Role::User);
//! assert!(RuleResolver::new().resolve(&[], &actor).is_none());
//! ```
//!
//! # Common pitfalls
//! - Treating `None` as "hide everything"; it is the unrestricted result.
//! - Pre-sorting rules in the store and assuming the order survives; the
//!   resolver always re-sorts.
mod compositor;
mod context;
mod errors;
mod filter;
mod query;
mod resolver;
mod rule;

pub use compositor::{FilterCompositor, SourcePlan};
pub use context::{ActorContext, AttributeKind};
pub use errors::{VisibilityError, VisibilityResult};
pub use filter::ProductFilter;
pub use query::{CatalogQuery, Field, Predicate, Product};
pub use resolver::{CustomConditionMatcher, PresenceMatcher, RuleResolver};
pub use rule::{ProductFilters, RuleConditions, RuleType, VisibilityRule};
