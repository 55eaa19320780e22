//! Vela policy and visibility evaluation service.
//!
//! # Purpose
//! Wires the permission resolver, the visibility rule resolver, and the filter
//! compositor to the external role, rule, and catalog stores, and exposes the
//! request-level entry points callers use.
//!
//! # Notes
//! The engine holds no mutable state; every call is a fresh chain of store
//! reads plus pure evaluation, so one instance can serve many actors at once.
pub mod config;
pub mod engine;
pub mod observability;
pub mod store;

pub use engine::{EngineError, EngineResult, ProductQueryOptions, VisibilityEngine};
