//! Import and action collection over a whole forest.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use weaver_core::binding::js_identifier;
use weaver_core::{
    ActionRef, BindingTable, CanvasNode, Catalog, WeaverResult, WidgetDefinition, WidgetKind,
    TRIGGER_PROP,
};

use crate::strategy::ui_imports;
use crate::synthesis::SynthesisConfig;

/// The statement every generated component starts with.
pub const REACT_IMPORT: &str = "import React, { useState } from 'react';";

/// Deduplicated import statements.
///
/// Named imports are merged per module so a symbol is never imported twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    named: BTreeMap<String, BTreeSet<String>>,
    defaults: BTreeSet<(String, String)>,
}

impl ImportSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `import { symbol } from 'module';`.
    pub fn add_named(&mut self, module: &str, symbol: &str) {
        self.named
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string());
    }

    /// Add `import symbol from 'module';`.
    pub fn add_default(&mut self, module: &str, symbol: &str) {
        self.defaults
            .insert((module.to_string(), symbol.to_string()));
    }

    /// Check if nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.defaults.is_empty()
    }

    /// Import statements, sorted lexicographically.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .named
            .iter()
            .map(|(module, symbols)| {
                let symbols: Vec<&str> = symbols.iter().map(String::as_str).collect();
                format!("import {{ {} }} from '{module}';", symbols.join(", "))
            })
            .chain(
                self.defaults
                    .iter()
                    .map(|(module, symbol)| format!("import {symbol} from '{module}';")),
            )
            .collect();
        lines.sort();
        lines
    }
}

/// Identifiers chosen for click actions.
///
/// Names never collide with state variables, setters, imported symbols or
/// each other: an imported action whose name is taken is aliased, and a
/// local action whose name is taken gets a numeric suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionNames {
    imported: BTreeMap<(String, String), String>,
    local: BTreeMap<String, String>,
}

impl ActionNames {
    /// Identifier bound to an imported `module/function` action.
    #[must_use]
    pub fn imported(&self, module: &str, function: &str) -> Option<&str> {
        self.imported
            .get(&(module.to_string(), function.to_string()))
            .map(String::as_str)
    }

    /// Identifier of the stub for a local action.
    #[must_use]
    pub fn local(&self, name: &str) -> Option<&str> {
        self.local.get(name).map(String::as_str)
    }

    /// Stub identifiers, sorted.
    #[must_use]
    pub fn stubs(&self) -> Vec<&str> {
        let mut stubs: Vec<&str> = self.local.values().map(String::as_str).collect();
        stubs.sort_unstable();
        stubs
    }
}

/// Everything gathered from one walk of the forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    /// Widget and action imports.
    pub imports: ImportSet,
    /// Identifiers for imported and local actions.
    pub actions: ActionNames,
}

/// Collect imports and actions for every node that will be emitted.
///
/// Subtrees under nodes of unknown widget types are skipped, since only a
/// marker comment is emitted for them.
#[must_use]
pub fn collect(
    forest: &[Arc<CanvasNode>],
    catalog: &Catalog,
    bindings: &BindingTable,
    config: &SynthesisConfig,
) -> Collected {
    let mut collected = Collected::default();
    let mut taken: BTreeSet<String> = ["React", "useState"].map(String::from).into();
    taken.insert(js_identifier(&config.component_name));
    for binding in bindings {
        taken.insert(binding.variable.clone());
        taken.insert(binding.setter_name.clone());
    }

    let mut imported = BTreeSet::new();
    let mut local = BTreeSet::new();
    let mut stack: Vec<&CanvasNode> = forest.iter().rev().map(|n| &**n).collect();
    while let Some(node) = stack.pop() {
        let Some(definition) = catalog.lookup(&node.widget_type) else {
            tracing::debug!("Skipping subtree of unknown widget type {}", node.widget_type);
            continue;
        };
        stack.extend(node.children().iter().rev().map(|c| &**c));

        if let WidgetKind::Custom(custom) = &definition.kind {
            collected.imports.add_default(
                &join_module(&config.custom_root, &custom.module),
                &custom.component,
            );
            taken.insert(custom.component.clone());
        }
        for (module, symbols) in ui_imports(&definition.kind) {
            let module = join_module(&config.ui_root, module);
            for symbol in *symbols {
                collected.imports.add_named(&module, symbol);
                taken.insert((*symbol).to_string());
            }
        }

        match node_action(node, definition) {
            Some(Ok(ActionRef::Imported { module, function })) => {
                imported.insert((module, function));
            }
            Some(Ok(ActionRef::Local(name))) => {
                local.insert(name);
            }
            Some(Err(e)) => tracing::warn!("Skipping click action of {}: {e}", node.id),
            None => {}
        }
    }

    for (module, function) in imported {
        let export = js_identifier(&function);
        let name = if taken.contains(&export) {
            unique_identifier(&format!("{}_{export}", js_identifier(&module)), &taken)
        } else {
            export.clone()
        };
        let symbol = if name == export {
            export
        } else {
            tracing::debug!("Importing {module}/{function} as {name}");
            format!("{export} as {name}")
        };
        collected
            .imports
            .add_named(&join_module(&config.action_root, &module), &symbol);
        taken.insert(name.clone());
        collected.actions.imported.insert((module, function), name);
    }
    for action in local {
        let name = unique_identifier(&js_identifier(&action), &taken);
        taken.insert(name.clone());
        collected.actions.local.insert(action, name);
    }

    collected
}

/// `base`, or `base_2`, `base_3`, ... whichever is free first.
fn unique_identifier(base: &str, taken: &BTreeSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// The parsed click action of a node, if its widget has a trigger and it is set.
pub(crate) fn node_action(
    node: &CanvasNode,
    definition: &WidgetDefinition,
) -> Option<WeaverResult<ActionRef>> {
    if !definition.has_trigger() {
        return None;
    }
    let reference = node.prop_str(TRIGGER_PROP)?;
    if reference.trim().is_empty() {
        return None;
    }
    Some(ActionRef::parse(reference))
}

fn join_module(root: &str, module: &str) -> String {
    let module: String = module
        .trim()
        .trim_start_matches('/')
        .chars()
        .map(|c| if matches!(c, '\'' | '\\' | '\n' | '\r') { '_' } else { c })
        .collect();
    format!("{}/{module}", root.trim_end_matches('/'))
}
