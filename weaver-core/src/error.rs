//! Error types for design operations.
//!
//! Structural edits never surface these to the editing session: the public
//! mutation methods on [`crate::Design`] log and swallow them. The `try_*`
//! variants return them so hosts and tests can see why an edit was a no-op.

use thiserror::Error;

/// Result type for design operations.
pub type WeaverResult<T> = Result<T, WeaverError>;

/// Errors that can occur in design operations.
#[derive(Debug, Error)]
pub enum WeaverError {
    /// Widget type is not registered in the catalog.
    #[error("Unknown widget type: {0}")]
    UnknownWidget(String),

    /// Node not found anywhere in the forest.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Requested parent does not exist.
    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    /// Requested parent cannot own children.
    #[error("Widget is not a container: {0}")]
    NotAContainer(String),

    /// Operation is only defined for top-level nodes.
    #[error("Node is not top-level: {0}")]
    NotTopLevel(String),

    /// The caller's parent hint does not match the node's current parent.
    #[error("Stale parent hint for {id}: node is not under {expected}")]
    StaleParent {
        /// Node the operation targeted.
        id: String,
        /// Parent the caller believed the node to be under.
        expected: String,
    },

    /// Action reference is neither `module/function` nor a bare name.
    #[error("Invalid action reference: {0:?}")]
    InvalidAction(String),

    /// Action reference has no registered implementation.
    #[error("Action not registered: {0}")]
    ActionNotFound(String),

    /// Setter name does not match any value source.
    #[error("Unknown setter: {0}")]
    UnknownSetter(String),

    /// Session does not exist in the store.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Snapshot or configuration (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
