//! Design session configuration.

use serde::{Deserialize, Serialize};

use crate::catalog::{Props, GRID_SIZE};
use crate::error::WeaverResult;
use crate::node::CanvasSize;

/// Configuration for a new design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignConfig {
    /// Grid unit used for snapping positions and sizes.
    pub grid_size: i32,
    /// Initial canvas size.
    pub canvas: CanvasSize,
    /// Value sources seeded before any widget binds them.
    pub initial_global_states: Props,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            canvas: CanvasSize::default(),
            initial_global_states: Props::new(),
        }
    }
}

impl DesignConfig {
    /// Load configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> WeaverResult<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.grid_size <= 0 {
            tracing::warn!(
                "Ignoring non-positive grid size {}, using {GRID_SIZE}",
                config.grid_size
            );
            config.grid_size = GRID_SIZE;
        }
        Ok(config)
    }

    /// Seed a value source.
    #[must_use]
    pub fn with_state(mut self, source: impl Into<String>, value: serde_json::Value) -> Self {
        self.initial_global_states.insert(source.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = DesignConfig::default();
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.canvas, CanvasSize::new(1200, 800));
        assert!(config.initial_global_states.is_empty());
    }

    #[test]
    fn test_from_json_partial() {
        let config = DesignConfig::from_json(
            r#"{ "canvas": { "width": 640, "height": 480 },
                 "initialGlobalStates": { "myProgress": 10 } }"#,
        )
        .expect("parse");
        assert_eq!(config.grid_size, 20);
        assert_eq!(config.canvas, CanvasSize::new(640, 480));
        assert_eq!(config.initial_global_states["myProgress"], 10);
    }

    #[test]
    fn test_from_json_rejects_bad_grid() {
        let config = DesignConfig::from_json(r#"{ "gridSize": 0 }"#).expect("parse");
        assert_eq!(config.grid_size, GRID_SIZE);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(DesignConfig::from_json("[1, 2").is_err());
    }

    #[test]
    fn test_with_state() {
        let config = DesignConfig::default().with_state("appTitle", json!("Weaver"));
        assert_eq!(config.initial_global_states["appTitle"], "Weaver");
    }
}
