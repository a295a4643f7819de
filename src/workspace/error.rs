//! Error types for workspace management.
//!
//! Only configuration-class failures are represented here. Filesystem
//! absence and VCS probe failures are absorbed by the callers and never
//! surface through this type.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors surfaced by the manager and resolver.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// No root matches the given name or identifier.
    #[error("workspace not found: {0}")]
    NotFound(String),

    /// No root is registered at the given path.
    #[error("workspace not found at path: {}", .0.display())]
    NotFoundAtPath(PathBuf),

    /// Primary index outside the registered roots.
    #[error("invalid workspace index: {index} (have {count} roots)")]
    InvalidIndex { index: usize, count: usize },

    /// An operation's assumption about the root set does not hold.
    #[error("invalid workspace state: {0}")]
    InvalidState(String),

    /// The manager has no roots to resolve against.
    #[error("no workspace roots available")]
    NoRoots,

    /// A workspace config file failed validation.
    #[error("invalid workspace config: {0}")]
    InvalidConfig(String),

    /// Persisted state could not be encoded or decoded.
    #[error("failed to (de)serialize workspace state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for workspace operations
pub type WorkspaceResult<T> = std::result::Result<T, WorkspaceError>;
