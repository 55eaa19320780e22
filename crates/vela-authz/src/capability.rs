//! Capability values and their string grammar.
//!
//! # Purpose
//! Replaces raw `resource:action` strings with a tagged value so matching code
//! never has to re-split strings.
//!
//! # Key invariants
//! - `resource` is everything before the first `:`; `action` is the rest.
//! - An action of exactly `*` makes the capability a resource-wide wildcard.
//! - `all:*` is the full-access sentinel reported for owners.
//! - Input without a colon is kept as [`Capability::Literal`] and is never
//!   covered by a wildcard.
//! - Equality and hashing follow the canonical string, so values built from
//!   variants or constructors compare equal to their parsed form.
//!
//! # Examples
//! ```rust
//! use vela_authz::Capability;
//!
//! let cap = Capability::parse("coating:certificate");
//! assert_eq!(cap.resource_wildcard(), Some(Capability::parse("coating:*")));
//! assert_eq!(Capability::parse("dashboard").resource_wildcard(), None);
//! ```
//!
//! # Common pitfalls
//! - `a:b:c` has resource `a` and action `b:c`; there is no deeper hierarchy.
use crate::{AuthzError, AuthzResult};
use serde::{Deserialize, Serialize};

/// Resource name of the full-access sentinel (`all:*`).
pub const FULL_ACCESS_RESOURCE: &str = "all";
/// Action segment that turns a capability into a resource-wide wildcard.
pub const WILDCARD_ACTION: &str = "*";

/// A single grantable (or requested) permission.
///
/// # Summary
/// Either a concrete `resource:action` pair, a `resource:*` wildcard, or a
/// colon-less literal that only ever matches itself.
///
/// # Example
/// ```rust
/// use vela_authz::Capability;
///
/// let cap = Capability::action("bookings", "edit");
/// assert_eq!(cap.to_string(), "bookings:edit");
/// assert_eq!(Capability::parse("bookings:edit"), cap);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    Action { resource: String, action: String },
    Wildcard { resource: String },
    Literal(String),
}

impl Capability {
    /// Build `resource:action`; an action of `*` yields the wildcard form.
    pub fn action(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self::parse(&format!("{}:{}", resource.into(), action.into()))
    }

    pub fn wildcard(resource: impl Into<String>) -> Self {
        Self::parse(&format!("{}:{WILDCARD_ACTION}", resource.into()))
    }

    /// The `all:*` sentinel.
    pub fn full_access() -> Self {
        Self::wildcard(FULL_ACCESS_RESOURCE)
    }

    /// Parse a capability without validation.
    ///
    /// # Parameters
    /// - `raw`: capability string as supplied by a request or a custom grant.
    ///
    /// # Returns
    /// - The tagged [`Capability`]; never fails. Strings without a colon
    ///   become [`Capability::Literal`].
    pub fn parse(raw: &str) -> Self {
        // Only the first colon separates resource from action.
        match raw.split_once(':') {
            None => Self::Literal(raw.to_string()),
            Some((resource, WILDCARD_ACTION)) => Self::Wildcard {
                resource: resource.to_string(),
            },
            Some((resource, action)) => Self::Action {
                resource: resource.to_string(),
                action: action.to_string(),
            },
        }
    }

    /// Re-tag through the string grammar. Hand-built variants such as
    /// `Action { action: "*" }` or `Literal("a:b")` come back in parsed form.
    pub fn normalized(&self) -> Self {
        Self::parse(&self.as_string())
    }

    /// Resource segment (text before the first colon), if there is a colon.
    pub fn resource(&self) -> Option<&str> {
        let head = match self {
            Self::Action { resource, .. } | Self::Wildcard { resource } => resource.as_str(),
            Self::Literal(raw) => raw.split_once(':')?.0,
        };
        Some(head.split_once(':').map_or(head, |(resource, _)| resource))
    }

    /// Derive the `resource:*` form that would cover this capability.
    ///
    /// # Returns
    /// - `Some(wildcard)` for actions and wildcards (a wildcard covers itself).
    /// - `None` for literals, which no wildcard can cover.
    pub fn resource_wildcard(&self) -> Option<Capability> {
        self.resource().map(Self::wildcard)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.normalized(), Self::Wildcard { .. })
    }

    pub fn is_full_access(&self) -> bool {
        matches!(self.normalized(), Self::Wildcard { resource } if resource == FULL_ACCESS_RESOURCE)
    }

    /// Render the canonical string form.
    ///
    /// # Performance
    /// - Allocates a new `String` each call.
    pub fn as_string(&self) -> String {
        match self {
            Self::Action { resource, action } => format!("{resource}:{action}"),
            Self::Wildcard { resource } => format!("{resource}:{WILDCARD_ACTION}"),
            Self::Literal(raw) => raw.clone(),
        }
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.as_string() == other.as_string()
    }
}

impl Eq for Capability {}

impl std::hash::Hash for Capability {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_string().hash(state);
    }
}

impl std::str::FromStr for Capability {
    type Err = AuthzError;

    /// Strict parsing for configuration: both segments must be present and
    /// non-empty.
    fn from_str(value: &str) -> AuthzResult<Self> {
        let (resource, action) = value
            .split_once(':')
            .ok_or_else(|| AuthzError::InvalidCapability(value.to_string()))?;
        if resource.trim().is_empty() || action.trim().is_empty() {
            return Err(AuthzError::InvalidCapability(value.to_string()));
        }
        Ok(Self::parse(value))
    }
}

impl From<String> for Capability {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Capability {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Capability> for String {
    fn from(value: Capability) -> Self {
        value.as_string()
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_string())
    }
}
