//! Shared-state runtime: value-source slots, setters and the action registry.
//!
//! This is the live counterpart of the generated code. A host previewing a
//! design keeps one [`SharedState`] per binding table, hands
//! [`AvailableSetters`] to actions, and dispatches button triggers through
//! the [`ActionRegistry`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::binding::BindingTable;
use crate::error::{WeaverError, WeaverResult};

/// Parsed click-action reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionRef {
    /// `module/function`, implemented in an external module.
    Imported {
        /// Module name.
        module: String,
        /// Function name.
        function: String,
    },
    /// A bare name with no implementation; gets a generated stub.
    Local(String),
}

impl ActionRef {
    /// Parse a trigger value.
    ///
    /// Splits at the first `/`. Both halves must be non-empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::InvalidAction`] for blank values and for
    /// references with an empty module or function.
    pub fn parse(reference: &str) -> WeaverResult<Self> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(WeaverError::InvalidAction(reference.to_string()));
        }
        match trimmed.split_once('/') {
            Some((module, function)) => {
                let (module, function) = (module.trim(), function.trim());
                if module.is_empty() || function.is_empty() {
                    return Err(WeaverError::InvalidAction(reference.to_string()));
                }
                Ok(Self::Imported {
                    module: module.to_string(),
                    function: function.to_string(),
                })
            }
            None => Ok(Self::Local(trimmed.to_string())),
        }
    }

    /// The callable name used in generated code.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Imported { function, .. } => function,
            Self::Local(name) => name,
        }
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imported { module, function } => write!(f, "{module}/{function}"),
            Self::Local(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    source: String,
    setter: String,
    value: Value,
}

/// Current values of every value source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SharedState {
    slots: Vec<Slot>,
}

impl SharedState {
    /// One slot per binding, holding its initial value.
    #[must_use]
    pub fn from_bindings(table: &BindingTable) -> Self {
        Self {
            slots: table
                .iter()
                .map(|b| Slot {
                    source: b.source.clone(),
                    setter: b.setter_name.clone(),
                    value: b.initial_value.clone(),
                })
                .collect(),
        }
    }

    /// Current value of a source.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&Value> {
        self.slots
            .iter()
            .find(|s| s.source == source)
            .map(|s| &s.value)
    }

    /// Sources with their current values, in binding order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().map(|s| (s.source.as_str(), &s.value))
    }

    /// Borrow the setter table for this render.
    pub fn setters(&mut self) -> AvailableSetters<'_> {
        AvailableSetters { state: self }
    }
}

/// Setter-name to slot-writer view over a [`SharedState`].
///
/// Rebuilt for every dispatch and never stored.
#[derive(Debug)]
pub struct AvailableSetters<'a> {
    state: &'a mut SharedState,
}

impl AvailableSetters<'_> {
    /// Setter names in binding order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.state.slots.iter().map(|s| s.setter.as_str()).collect()
    }

    /// Check if a setter exists.
    #[must_use]
    pub fn contains(&self, setter: &str) -> bool {
        self.state.slots.iter().any(|s| s.setter == setter)
    }

    /// Current value behind a setter.
    #[must_use]
    pub fn current(&self, setter: &str) -> Option<&Value> {
        self.state
            .slots
            .iter()
            .find(|s| s.setter == setter)
            .map(|s| &s.value)
    }

    /// Replace the value behind a setter.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::UnknownSetter`] if no source has this setter.
    pub fn set(&mut self, setter: &str, value: Value) -> WeaverResult<()> {
        self.update(setter, |_| value)
    }

    /// Compute a new value from the current one.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::UnknownSetter`] if no source has this setter.
    pub fn update(&mut self, setter: &str, f: impl FnOnce(&Value) -> Value) -> WeaverResult<()> {
        let slot = self
            .state
            .slots
            .iter_mut()
            .find(|s| s.setter == setter)
            .ok_or_else(|| WeaverError::UnknownSetter(setter.to_string()))?;
        slot.value = f(&slot.value);
        tracing::debug!("{setter}({})", slot.value);
        Ok(())
    }
}

/// An action implementation.
pub type ActionFn = Arc<dyn Fn(&mut AvailableSetters<'_>) + Send + Sync>;

/// Registry of importable actions keyed by `module/function`.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, ActionFn>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Module holding the bundled example actions.
pub const EXAMPLE_ACTIONS_MODULE: &str = "exampleActions";

impl ActionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled `exampleActions` module.
    #[must_use]
    pub fn with_examples() -> Self {
        let mut registry = Self::new();
        registry.register(EXAMPLE_ACTIONS_MODULE, "showMessage", |setters| {
            tracing::info!(
                "showMessage called; available setters: {}",
                setters.names().join(", ")
            );
        });
        registry.register(EXAMPLE_ACTIONS_MODULE, "anotherAction", |_| {
            tracing::info!("anotherAction called");
        });
        registry.register(EXAMPLE_ACTIONS_MODULE, "updateExampleProgress", |setters| {
            if !setters.contains("setMyProgress") {
                tracing::warn!("updateExampleProgress needs a myProgress value source");
                return;
            }
            let _ = setters.update("setMyProgress", |current| {
                let now = current.as_i64().unwrap_or(0);
                Value::from((now + 10) % 110)
            });
        });
        registry
    }

    /// Register an action under `module/function`, replacing any existing one.
    pub fn register<F>(&mut self, module: &str, function: &str, action: F)
    where
        F: Fn(&mut AvailableSetters<'_>) + Send + Sync + 'static,
    {
        self.actions
            .insert(format!("{module}/{function}"), Arc::new(action));
    }

    /// Check if an imported action is registered.
    #[must_use]
    pub fn contains(&self, reference: &str) -> bool {
        self.actions.contains_key(reference.trim())
    }

    /// Registered references, sorted, for the action picker.
    #[must_use]
    pub fn action_options(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    /// Run the action a trigger refers to against the shared state.
    ///
    /// Local actions have no implementation and only log.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::InvalidAction`] for malformed references and
    /// [`WeaverError::ActionNotFound`] for unregistered imported actions.
    pub fn dispatch(&self, reference: &str, state: &mut SharedState) -> WeaverResult<()> {
        match ActionRef::parse(reference)? {
            action @ ActionRef::Imported { .. } => {
                let key = action.to_string();
                let f = self
                    .actions
                    .get(&key)
                    .ok_or_else(|| WeaverError::ActionNotFound(key.clone()))?;
                tracing::info!("Dispatching {key}");
                f(&mut state.setters());
            }
            ActionRef::Local(name) => {
                let setters = state.setters();
                tracing::info!(
                    "Local action \"{name}\" triggered. Implement your logic here. Available setters: {}",
                    setters.names().join(", ")
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Props};
    use crate::node::{CanvasNode, Layout, NodeId};
    use serde_json::json;

    fn state_with(seeds: &[(&str, Value)]) -> SharedState {
        let seeds: Props = seeds
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        let table = BindingTable::resolve(&[], &seeds, &Catalog::builtin());
        SharedState::from_bindings(&table)
    }

    #[test]
    fn test_parse_action_refs() {
        assert_eq!(
            ActionRef::parse("scoring/increment").expect("imported"),
            ActionRef::Imported {
                module: "scoring".to_string(),
                function: "increment".to_string(),
            }
        );
        assert_eq!(
            ActionRef::parse(" handleClick ").expect("local"),
            ActionRef::Local("handleClick".to_string())
        );
        assert_eq!(
            ActionRef::parse("a/b/c").expect("first slash splits"),
            ActionRef::Imported {
                module: "a".to_string(),
                function: "b/c".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "   ", "/fn", "module/", " / "] {
            assert!(
                matches!(ActionRef::parse(bad), Err(WeaverError::InvalidAction(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_action_ref_display_and_name() {
        let imported = ActionRef::parse("scoring/increment").expect("imported");
        assert_eq!(imported.to_string(), "scoring/increment");
        assert_eq!(imported.name(), "increment");
        assert_eq!(ActionRef::Local("go".to_string()).name(), "go");
    }

    #[test]
    fn test_shared_state_from_bindings() {
        let forest = vec![Arc::new(CanvasNode {
            id: NodeId::from("s"),
            widget_type: "slider".to_string(),
            props: Props::from([
                ("valueSource".to_string(), json!("volume")),
                ("value".to_string(), json!(30)),
            ]),
            layout: Layout::default(),
            parent_id: None,
            children: None,
        })];
        let table = BindingTable::resolve(&forest, &Props::new(), &Catalog::builtin());
        let state = SharedState::from_bindings(&table);
        assert_eq!(state.get("volume"), Some(&json!(30)));
        assert_eq!(state.values().count(), 1);
    }

    #[test]
    fn test_setters_set_and_update() {
        let mut state = state_with(&[("count", json!(1))]);
        let mut setters = state.setters();
        assert_eq!(setters.names(), vec!["setCount"]);
        setters
            .update("setCount", |v| json!(v.as_i64().unwrap_or(0) + 1))
            .expect("known setter");
        assert_eq!(setters.current("setCount"), Some(&json!(2)));
        setters.set("setCount", json!(7)).expect("known setter");
        assert!(matches!(
            setters.set("setMissing", json!(0)),
            Err(WeaverError::UnknownSetter(_))
        ));
        assert_eq!(state.get("count"), Some(&json!(7)));
    }

    #[test]
    fn test_update_example_progress_wraps() {
        let registry = ActionRegistry::with_examples();
        let mut state = state_with(&[("myProgress", json!(90))]);

        registry
            .dispatch("exampleActions/updateExampleProgress", &mut state)
            .expect("registered");
        assert_eq!(state.get("myProgress"), Some(&json!(100)));

        registry
            .dispatch("exampleActions/updateExampleProgress", &mut state)
            .expect("registered");
        assert_eq!(state.get("myProgress"), Some(&json!(0)));
    }

    #[test]
    fn test_update_example_progress_without_source_is_harmless() {
        let registry = ActionRegistry::with_examples();
        let mut state = state_with(&[]);
        registry
            .dispatch("exampleActions/updateExampleProgress", &mut state)
            .expect("registered");
        assert_eq!(state.values().count(), 0);
    }

    #[test]
    fn test_dispatch_errors_and_local_actions() {
        let registry = ActionRegistry::with_examples();
        let mut state = state_with(&[]);
        assert!(matches!(
            registry.dispatch("exampleActions/nope", &mut state),
            Err(WeaverError::ActionNotFound(_))
        ));
        assert!(matches!(
            registry.dispatch("/", &mut state),
            Err(WeaverError::InvalidAction(_))
        ));
        registry
            .dispatch("handleLocal", &mut state)
            .expect("local actions only log");
    }

    #[test]
    fn test_action_options_sorted() {
        let registry = ActionRegistry::with_examples();
        assert_eq!(
            registry.action_options(),
            vec![
                "exampleActions/anotherAction",
                "exampleActions/showMessage",
                "exampleActions/updateExampleProgress",
            ]
        );
        assert!(registry.contains("exampleActions/showMessage"));
    }

    #[test]
    fn test_register_custom_action() {
        let mut registry = ActionRegistry::new();
        registry.register("scoring", "increment", |setters| {
            let _ = setters.update("setScore", |v| json!(v.as_i64().unwrap_or(0) + 1));
        });
        let mut state = state_with(&[("score", json!(0))]);
        registry
            .dispatch("scoring/increment", &mut state)
            .expect("registered");
        assert_eq!(state.get("score"), Some(&json!(1)));
    }
}
