//! Error types for Catalyst layout operations.
//!
//! [`LayoutError`] is the only error returned by the public API. Everything
//! that is not a structural problem with the input (dangling relations,
//! degenerate sizes, out-of-range option values) is recovered locally and
//! never surfaces here.

use thiserror::Error;

/// The main error type for Catalyst operations.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The entity forest is not a strict tree.
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(#[from] HierarchyError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Structural defects detected while building the containment tree.
///
/// These are reported before any placement happens, so a malformed tree can
/// never cause unbounded traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("duplicate entity id `{0}`")]
    DuplicateId(String),

    #[error("entity `{id}` names unknown parent `{parent}`")]
    UnknownParent { id: String, parent: String },

    #[error("entity `{id}` is nested in `{enclosing}` but declares parent `{declared}`")]
    ConflictingParent {
        id: String,
        enclosing: String,
        declared: String,
    },

    /// The parent chain of this entity never reaches a root.
    #[error("containment cycle through entity `{0}`")]
    Cycle(String),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),
}
