//! Shared design storage for concurrent hosts.
//!
//! A [`Design`] edits its forest read-modify-write, so every mutation goes
//! through the single write lock of [`DesignStore`]. Reads clone the design,
//! which only bumps the reference count of the shared forest.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::DesignConfig;
use crate::error::{WeaverError, WeaverResult};
use crate::snapshot::DesignSnapshot;
use crate::tree::Design;

/// Default session identifier.
pub const DEFAULT_SESSION: &str = "default";

/// Thread-safe design storage keyed by session id.
///
/// # Example
///
/// ```
/// use weaver_core::store::{DesignStore, DEFAULT_SESSION};
/// use weaver_core::Point;
///
/// let store = DesignStore::new();
/// let id = store
///     .update(DEFAULT_SESSION, |design| {
///         design.add_node("button", Point::new(40.0, 40.0), None)
///     })
///     .unwrap();
/// assert!(id.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct DesignStore {
    designs: Arc<RwLock<HashMap<String, Design>>>,
    config: DesignConfig,
}

impl Default for DesignStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignStore {
    /// Create a store with an empty default session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DesignConfig::default())
    }

    /// Create a store whose new sessions use the given configuration.
    #[must_use]
    pub fn with_config(config: DesignConfig) -> Self {
        let mut designs = HashMap::new();
        designs.insert(
            DEFAULT_SESSION.to_string(),
            Design::with_config(config.clone()),
        );
        Self {
            designs: Arc::new(RwLock::new(designs)),
            config,
        }
    }

    /// Get or create the design for a session.
    #[must_use]
    pub fn get_or_create(&self, session_id: &str) -> Design {
        let mut designs = self
            .designs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs
            .entry(session_id.to_string())
            .or_insert_with(|| Design::with_config(self.config.clone()))
            .clone()
    }

    /// Get the design for a session if it exists.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<Design> {
        let designs = self
            .designs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs.get(session_id).cloned()
    }

    /// Replace the design of a session, creating the session if needed.
    pub fn replace(&self, session_id: &str, design: Design) {
        let mut designs = self
            .designs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs.insert(session_id.to_string(), design);
        tracing::debug!("Replaced design for session {session_id}");
    }

    /// Edit a session's design under the write lock.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::SessionNotFound`] if the session does not exist.
    pub fn update<F, R>(&self, session_id: &str, f: F) -> WeaverResult<R>
    where
        F: FnOnce(&mut Design) -> R,
    {
        let mut designs = self
            .designs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let design = designs
            .get_mut(session_id)
            .ok_or_else(|| WeaverError::SessionNotFound(session_id.to_string()))?;
        Ok(f(design))
    }

    /// Export a session's design as a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::SessionNotFound`] if the session does not exist.
    pub fn snapshot(&self, session_id: &str) -> WeaverResult<DesignSnapshot> {
        self.get(session_id)
            .map(|design| design.export_snapshot())
            .ok_or_else(|| WeaverError::SessionNotFound(session_id.to_string()))
    }

    /// Replace a session's design with one rebuilt from a snapshot.
    ///
    /// The rebuilt design keeps the store's grid size.
    pub fn restore(&self, session_id: &str, snapshot: DesignSnapshot) {
        self.replace(
            session_id,
            Design::from_snapshot_with_config(snapshot, &self.config),
        );
    }

    /// Remove a session. Returns whether it existed.
    pub fn remove(&self, session_id: &str) -> bool {
        let mut designs = self
            .designs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs.remove(session_id).is_some()
    }

    /// All session ids, sorted.
    #[must_use]
    pub fn session_ids(&self) -> Vec<String> {
        let designs = self
            .designs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut ids: Vec<_> = designs.keys().cloned().collect();
        ids.sort();
        ids
    }
}
