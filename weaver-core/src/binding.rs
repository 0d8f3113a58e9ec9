//! Value-source bindings derived from a forest.
//!
//! A value source is a name a user types into a widget's `valueSource`
//! property. Every distinct name becomes one shared slot with a state
//! variable, a setter and an initial value. The table is a pure function
//! of the forest and the seeded values; recompute it after every edit.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::catalog::{BindingKind, Catalog, Props};
use crate::node::{pre_order, CanvasNode};

/// One resolved value source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Source name as the user typed it (trimmed).
    pub source: String,
    /// State variable name, a valid identifier.
    pub variable: String,
    /// Setter name: `set` followed by the capitalized variable.
    pub setter_name: String,
    /// Inferred or seeded initial value.
    pub initial_value: Value,
}

/// Ordered table of bindings: seeds first, then sources in pre-order of first use.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BindingTable {
    entries: Vec<Binding>,
}

impl BindingTable {
    /// Resolve the bindings of a forest.
    #[must_use]
    pub fn resolve(forest: &[Arc<CanvasNode>], seeds: &Props, catalog: &Catalog) -> Self {
        let nodes = pre_order(forest);
        let mut table = Self::default();
        let mut seen = HashSet::new();
        let mut setters = HashSet::new();

        for (source, value) in seeds {
            let source = source.trim();
            if source.is_empty() || !seen.insert(source.to_string()) {
                continue;
            }
            table.push(source, value.clone(), &mut setters);
        }

        for node in &nodes {
            let Some(source) = node.value_source() else {
                continue;
            };
            if !seen.insert(source.to_string()) {
                continue;
            }
            let initial_value = infer_initial_value(node, catalog);
            table.push(source, initial_value, &mut setters);
        }

        tracing::debug!("Resolved {} value sources", table.entries.len());
        table
    }

    /// Append a binding, suffixing the identifier until its setter is unique.
    fn push(&mut self, source: &str, initial_value: Value, setters: &mut HashSet<String>) {
        let base = js_identifier(source);
        let mut variable = base.clone();
        let mut suffix = 2;
        while !setters.insert(setter_name(&variable)) {
            variable = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.entries.push(Binding {
            source: source.to_string(),
            setter_name: setter_name(&variable),
            variable,
            initial_value,
        });
    }

    /// Look up a binding by source name.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&Binding> {
        let source = source.trim();
        self.entries.iter().find(|b| b.source == source)
    }

    /// Look up a binding by setter name.
    #[must_use]
    pub fn by_setter(&self, setter: &str) -> Option<&Binding> {
        self.entries.iter().find(|b| b.setter_name == setter)
    }

    /// Setter names in table order.
    #[must_use]
    pub fn setter_names(&self) -> Vec<&str> {
        self.entries.iter().map(|b| b.setter_name.as_str()).collect()
    }

    /// Iterate over bindings in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.iter()
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a BindingTable {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Turn a source name into an identifier.
///
/// Characters outside `[A-Za-z0-9_$]` become `_`; a leading digit gets a `_` prefix.
#[must_use]
pub fn js_identifier(source: &str) -> String {
    let mut ident: String = source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// `set` followed by the variable with its first character upper-cased.
#[must_use]
pub fn setter_name(variable: &str) -> String {
    let mut chars = variable.chars();
    match chars.next() {
        Some(first) => format!("set{}{}", first.to_uppercase(), chars.as_str()),
        None => "set".to_string(),
    }
}

fn infer_initial_value(node: &CanvasNode, catalog: &Catalog) -> Value {
    let Some(definition) = catalog.lookup(&node.widget_type) else {
        return Value::Null;
    };
    let Some(kind) = definition.kind.binding() else {
        return Value::Null;
    };

    let prop = kind.bound_prop();
    let literal = node
        .prop(prop)
        .filter(|v| !v.is_null())
        .or_else(|| definition.schema_default(prop).filter(|v| !v.is_null()));

    match kind {
        BindingKind::Numeric => literal
            .and_then(as_number)
            .unwrap_or_else(|| Value::from(0)),
        BindingKind::Toggle => Value::Bool(literal.is_some_and(as_bool)),
        BindingKind::Text | BindingKind::Display => {
            Value::String(literal.map(display_text).unwrap_or_default())
        }
    }
}

fn as_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Value::from(i))
            } else {
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
        }
        Value::Array(items) => items.first().and_then(as_number),
        _ => None,
    }
}

fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// Text form of a literal: strings as-is, anything else as JSON.
pub(crate) fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VALUE_SOURCE_PROP;
    use crate::node::{Layout, NodeId};
    use serde_json::json;

    fn node(id: &str, widget_type: &str, props: Value) -> Arc<CanvasNode> {
        let catalog = Catalog::builtin();
        let mut merged = catalog
            .lookup(widget_type)
            .map(|d| d.default_props.clone())
            .unwrap_or_default();
        if let Value::Object(map) = props {
            merged.extend(map);
        }
        Arc::new(CanvasNode {
            id: NodeId::from(id),
            widget_type: widget_type.to_string(),
            props: merged,
            layout: Layout::default(),
            parent_id: None,
            children: None,
        })
    }

    fn resolve(forest: &[Arc<CanvasNode>], seeds: &Props) -> BindingTable {
        BindingTable::resolve(forest, seeds, &Catalog::builtin())
    }

    #[test]
    fn test_numeric_without_value_infers_zero() {
        let forest = vec![node("p", "progress", json!({ "valueSource": "score" }))];
        let table = resolve(&forest, &Props::new());
        let score = table.get("score").expect("score bound");
        assert_eq!(score.initial_value, json!(0));
        assert_eq!(score.setter_name, "setScore");
        assert_eq!(score.variable, "score");
    }

    #[test]
    fn test_inference_per_kind() {
        let forest = vec![
            node("s", "slider", json!({ "valueSource": "volume", "value": 70 })),
            node("i", "input", json!({ "valueSource": "name" })),
            node("c", "checkbox", json!({ "valueSource": "agreed", "checked": true })),
            node("t", "text", json!({ "valueSource": "title", "children": "Hello" })),
            node("l", "label", json!({ "valueSource": "count", "children": 3 })),
        ];
        let table = resolve(&forest, &Props::new());
        assert_eq!(table.get("volume").expect("volume").initial_value, json!(70));
        assert_eq!(table.get("name").expect("name").initial_value, json!(""));
        assert_eq!(table.get("agreed").expect("agreed").initial_value, json!(true));
        assert_eq!(table.get("title").expect("title").initial_value, json!("Hello"));
        assert_eq!(table.get("count").expect("count").initial_value, json!("3"));
    }

    #[test]
    fn test_numeric_string_value_is_parsed() {
        let forest = vec![node("p", "progress", json!({ "valueSource": "x", "value": " 42 " }))];
        let table = resolve(&forest, &Props::new());
        assert_eq!(table.get("x").expect("x").initial_value, json!(42));
    }

    #[test]
    fn test_first_node_in_pre_order_wins() {
        let mut card = (*node("card", "card", json!({}))).clone();
        card.children = Some(vec![node(
            "inner",
            "slider",
            json!({ "valueSource": "level", "value": 10 }),
        )]);
        let forest = vec![
            Arc::new(card),
            node("later", "slider", json!({ "valueSource": "level", "value": 90 })),
        ];
        let table = resolve(&forest, &Props::new());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("level").expect("level").initial_value, json!(10));
    }

    #[test]
    fn test_seeds_come_first_and_are_not_inferred() {
        let forest = vec![
            node("a", "text", json!({ "valueSource": "greeting" })),
            node("b", "slider", json!({ "valueSource": "myProgress", "value": 99 })),
        ];
        let seeds = Props::from([("myProgress".to_string(), json!(10))]);
        let table = resolve(&forest, &seeds);
        let sources: Vec<_> = table.iter().map(|b| b.source.as_str()).collect();
        assert_eq!(sources, vec!["myProgress", "greeting"]);
        assert_eq!(table.get("myProgress").expect("seed").initial_value, json!(10));
    }

    #[test]
    fn test_unbindable_and_unknown_widgets_infer_null() {
        let mut ghost = (*node("g", "ghost", json!({}))).clone();
        ghost
            .props
            .insert(VALUE_SOURCE_PROP.to_string(), json!("haunt"));
        let forest = vec![
            node("b", "badge", json!({ "valueSource": "status" })),
            Arc::new(ghost),
        ];
        let table = resolve(&forest, &Props::new());
        assert_eq!(table.get("status").expect("status").initial_value, Value::Null);
        assert_eq!(table.get("haunt").expect("haunt").initial_value, Value::Null);
    }

    #[test]
    fn test_blank_sources_are_ignored_and_names_trimmed() {
        let forest = vec![
            node("a", "input", json!({ "valueSource": "   " })),
            node("b", "input", json!({ "valueSource": " user name " })),
        ];
        let table = resolve(&forest, &Props::new());
        assert_eq!(table.len(), 1);
        let binding = table.get("user name").expect("trimmed");
        assert_eq!(binding.variable, "user_name");
        assert_eq!(binding.setter_name, "setUser_name");
    }

    #[test]
    fn test_colliding_identifiers_are_disambiguated() {
        let forest = vec![
            node("a", "input", json!({ "valueSource": "my-value" })),
            node("b", "input", json!({ "valueSource": "my_value" })),
        ];
        let table = resolve(&forest, &Props::new());
        assert_eq!(table.setter_names(), vec!["setMy_value", "setMy_value_2"]);
        assert!(table.by_setter("setMy_value_2").is_some());
    }

    #[test]
    fn test_setters_differing_only_in_case_are_disambiguated() {
        let forest = vec![
            node("a", "input", json!({ "valueSource": "total" })),
            node("b", "input", json!({ "valueSource": "Total" })),
        ];
        let table = resolve(&forest, &Props::new());
        assert_eq!(table.setter_names(), vec!["setTotal", "setTotal_2"]);
    }

    #[test]
    fn test_js_identifier() {
        assert_eq!(js_identifier("score"), "score");
        assert_eq!(js_identifier("2fast"), "_2fast");
        assert_eq!(js_identifier("a.b c"), "a_b_c");
        assert_eq!(js_identifier("$cash"), "$cash");
        assert_eq!(js_identifier(""), "_");
    }

    #[test]
    fn test_setter_name() {
        assert_eq!(setter_name("score"), "setScore");
        assert_eq!(setter_name("myProgress"), "setMyProgress");
        assert_eq!(setter_name("_x"), "set_x");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_resolve_is_deterministic(
                sources in prop::collection::vec("[a-z ]{0,6}", 0..8),
            ) {
                let forest: Vec<_> = sources
                    .iter()
                    .enumerate()
                    .map(|(i, s)| node(&format!("n{i}"), "slider", json!({ "valueSource": s })))
                    .collect();
                let first = resolve(&forest, &Props::new());
                let second = resolve(&forest, &Props::new());
                prop_assert_eq!(&first, &second);

                let mut setters: Vec<_> = first.setter_names();
                let count = setters.len();
                setters.sort_unstable();
                setters.dedup();
                prop_assert_eq!(setters.len(), count);
            }
        }
    }
}
