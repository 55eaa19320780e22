//! Vela authorization primitives shared by the visibility engine and its callers.
//!
//! # Purpose
//! Centralizes the capability model, the role to capability table, and the
//! permission resolver that answers "may this role perform this action".
//!
//! # How it fits
//! The engine service asks the resolver whether an actor may browse the
//! catalog before any visibility rule is fetched. Request handlers elsewhere
//! use the same resolver for every other `resource:action` check.
//!
//! # Key invariants
//! - `owner` holds every capability, whatever its table entry says.
//! - Absence is denial: there are no explicit deny entries.
//! - Wildcards are one level deep (`resource:*`) and derived from the first
//!   `:`-separated segment only.
//! - A capability without a colon only ever matches itself.
//!
//! # Examples
//! ```rust
//! use vela_authz::{Capability, PermissionResolver, Role};
//!
//! let resolver = PermissionResolver::default();
//! let edit = Capability::parse("bookings:edit");
//! assert!(resolver.has_permission(Role::Manager, &edit, &[]));
//! assert!(!resolver.has_permission(Role::Manager, &Capability::parse("settings:billing"), &[]));
//! ```
//!
//! # Common pitfalls
//! - Parsing role tables from configuration with [`Capability::parse`] instead
//!   of `str::parse` lets malformed entries through silently.
//! - Custom grants extend the role table; they are never a replacement for it.
mod capability;
mod errors;
mod matcher;
mod resolver;
mod role;
mod table;

pub use capability::{Capability, FULL_ACCESS_RESOURCE, WILDCARD_ACTION};
pub use errors::{AuthzError, AuthzResult};
pub use matcher::CapabilitySet;
pub use resolver::PermissionResolver;
pub use role::Role;
pub use table::RoleTable;
