//! Design to React component synthesis.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use weaver_core::binding::js_identifier;
use weaver_core::{
    stacking_order, BindingTable, CanvasNode, CanvasSize, Catalog, Design, WeaverResult,
};

use crate::emit::NodeEmitter;
use crate::imports::{collect, REACT_IMPORT};
use crate::jsx::JsxWriter;

/// Configuration for code synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthesisConfig {
    /// Name of the generated component function.
    pub component_name: String,
    /// Module root of the UI component library.
    pub ui_root: String,
    /// Module root that `module/function` actions are imported from.
    pub action_root: String,
    /// Module root of custom components.
    pub custom_root: String,
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            component_name: "MyDesignedComponent".to_string(),
            ui_root: "@/components/ui".to_string(),
            action_root: "@/app-logic".to_string(),
            custom_root: "@/custom-components".to_string(),
            indent_width: 2,
        }
    }
}

impl SynthesisConfig {
    /// Load configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> WeaverResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Turns a design tree into the source text of one React component.
///
/// Output depends only on the inputs: the same forest, canvas, bindings and
/// catalog always produce byte-identical text.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthesisConfig,
}

impl Synthesizer {
    /// Create a synthesizer with the given configuration.
    #[must_use]
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// Create a synthesizer with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(SynthesisConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize a design, resolving its bindings first.
    #[must_use]
    pub fn synthesize_design(&self, design: &Design) -> String {
        self.synthesize(
            design.forest(),
            design.canvas(),
            &design.bindings(),
            design.catalog(),
        )
    }

    /// Synthesize the component source for a forest.
    ///
    /// Never fails: nodes of unknown widget types become a marker comment.
    #[must_use]
    pub fn synthesize(
        &self,
        forest: &[Arc<CanvasNode>],
        canvas: CanvasSize,
        bindings: &BindingTable,
        catalog: &Catalog,
    ) -> String {
        let collected = collect(forest, catalog, bindings, &self.config);
        let mut out = JsxWriter::new(self.config.indent_width);

        let mut imports = collected.imports.lines();
        imports.push(REACT_IMPORT.to_string());
        imports.sort();
        for line in &imports {
            out.line(0, line);
        }
        out.blank();

        out.line(
            0,
            &format!(
                "export default function {}() {{",
                js_identifier(&self.config.component_name)
            ),
        );

        for binding in bindings {
            out.line(
                1,
                &format!(
                    "const [{}, {}] = useState({});",
                    binding.variable, binding.setter_name, binding.initial_value
                ),
            );
        }
        if !bindings.is_empty() {
            out.blank();
        }

        let setters = bindings.setter_names();
        let available = if setters.is_empty() {
            "none".to_string()
        } else {
            setters.join(", ")
        };
        for name in collected.actions.stubs() {
            out.line(1, &format!("const {name} = () => {{"));
            out.line(
                2,
                &format!(
                    "console.log('Local action \"{name}\" triggered. Implement your logic here.');"
                ),
            );
            out.line(2, &format!("// Available state setters: {available}"));
            if let Some(first) = setters.first() {
                out.line(2, &format!("// Example: {first}(prev => (prev + 10) % 110);"));
            }
            out.line(1, "};");
            out.blank();
        }

        out.line(1, "return (");
        out.line(
            2,
            &format!(
                "<div style={{{{ position: 'relative', width: '{}px', height: '{}px', border: '1px solid #ccc', overflow: 'hidden', background: 'hsl(var(--background))' }}}}>",
                canvas.width, canvas.height
            ),
        );
        let emitter = NodeEmitter::new(catalog, bindings, &collected.actions);
        for node in stacking_order(forest) {
            emitter.emit(&mut out, node, 3, true);
        }
        out.line(2, "</div>");
        out.line(1, ");");
        out.line(0, "}");

        tracing::debug!(
            "Synthesized {} with {} imports, {} bindings, {} local actions",
            self.config.component_name,
            imports.len(),
            bindings.len(),
            collected.actions.stubs().len()
        );
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use weaver_core::{DesignConfig, ParentHint, Point, Props, TRIGGER_PROP, VALUE_SOURCE_PROP};

    fn props(pairs: &[(&str, serde_json::Value)]) -> Props {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_empty_design() {
        let out = Synthesizer::with_defaults().synthesize_design(&Design::new());
        let expected = "\
import React, { useState } from 'react';

export default function MyDesignedComponent() {
  return (
    <div style={{ position: 'relative', width: '1200px', height: '800px', border: '1px solid #ccc', overflow: 'hidden', background: 'hsl(var(--background))' }}>
    </div>
  );
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_state_declarations_and_stub() {
        let mut design = Design::with_config(DesignConfig::default().with_state("count", json!(3)));
        let button = design
            .add_node("button", Point::new(0.0, 0.0), None)
            .expect("button added");
        design.update_props(&button, props(&[(TRIGGER_PROP, json!("handleClick"))]));

        let out = Synthesizer::with_defaults().synthesize_design(&design);
        assert!(out.contains("  const [count, setCount] = useState(3);\n"), "{out}");
        assert!(out.contains(
            "  const handleClick = () => {\n    console.log('Local action \"handleClick\" triggered. Implement your logic here.');\n    // Available state setters: setCount\n    // Example: setCount(prev => (prev + 10) % 110);\n  };\n"
        ));
        assert!(out.contains("onClick={handleClick}"));
    }

    #[test]
    fn test_stub_without_setters() {
        let mut design = Design::new();
        let button = design
            .add_node("button", Point::new(0.0, 0.0), None)
            .expect("button added");
        design.update_props(&button, props(&[(TRIGGER_PROP, json!("go"))]));

        let out = Synthesizer::with_defaults().synthesize_design(&design);
        assert!(out.contains("// Available state setters: none"));
        assert!(!out.contains("// Example:"));
    }

    #[test]
    fn test_action_names_never_redeclare() {
        let mut design = Design::new();
        let progress = design
            .add_node("progress", Point::new(0.0, 0.0), None)
            .expect("progress added");
        design.update_props(&progress, props(&[(VALUE_SOURCE_PROP, json!("score"))]));
        for (i, action) in ["setScore", "m/go", "go"].into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let y = (i * 60 + 60) as f32;
            let button = design
                .add_node("button", Point::new(0.0, y), None)
                .expect("button added");
            design.update_props(&button, props(&[(TRIGGER_PROP, json!(action))]));
        }

        let out = Synthesizer::with_defaults().synthesize_design(&design);
        assert!(out.contains("  const [score, setScore] = useState("), "{out}");
        assert!(!out.contains("const setScore ="), "{out}");
        assert!(out.contains("  const setScore_2 = () => {\n"));
        assert!(out.contains("onClick={setScore_2}"));
        assert!(out.contains("import { go } from '@/app-logic/m';"));
        assert!(out.contains("onClick={() => go({ setScore })}"));
        assert!(out.contains("  const go_2 = () => {\n"));
        assert!(out.contains("onClick={go_2}"));
        assert_eq!(out.matches("const go").count(), 1);
    }

    #[test]
    fn test_imports_sorted_with_react() {
        let mut design = Design::new();
        design.add_node("custom_ExampleCounter", Point::new(0.0, 0.0), None);
        design.add_node("button", Point::new(0.0, 0.0), None);

        let out = Synthesizer::with_defaults().synthesize_design(&design);
        let imports: Vec<&str> = out.lines().take_while(|l| l.starts_with("import")).collect();
        assert_eq!(
            imports,
            vec![
                "import ExampleCounter from '@/custom-components/ExampleCounter';",
                "import React, { useState } from 'react';",
                "import { Button } from '@/components/ui/button';",
            ]
        );
    }

    #[test]
    fn test_top_level_in_stacking_order() {
        let mut design = Design::new();
        let first = design
            .add_node("badge", Point::new(0.0, 0.0), None)
            .expect("badge added");
        design.add_node("separator", Point::new(0.0, 100.0), None);
        design.bring_to_front(&first);

        let out = Synthesizer::with_defaults().synthesize_design(&design);
        let separator = out.find("<Separator").expect("separator emitted");
        let badge = out.find("<Badge").expect("badge emitted");
        assert!(separator < badge);
        assert!(out.contains("      <Badge "));
    }

    #[test]
    fn test_custom_config() {
        let config = SynthesisConfig::from_json(
            r#"{ "componentName": "Landing Page", "uiRoot": "~/ui/", "indentWidth": 4 }"#,
        )
        .expect("valid config");
        assert_eq!(config.action_root, "@/app-logic");

        let mut design = Design::new();
        design.add_node("badge", Point::new(0.0, 0.0), None);
        let out = Synthesizer::new(config).synthesize_design(&design);
        assert!(out.contains("import { Badge } from '~/ui/badge';"));
        assert!(out.contains("export default function Landing_Page() {"));
        assert!(out.contains("\n    return (\n"));
    }

    #[test]
    fn test_bound_input_in_card() {
        let mut design = Design::new();
        let card = design
            .add_node("card", Point::new(40.0, 40.0), None)
            .expect("card added");
        let input = design
            .add_node("input", Point::new(20.0, 20.0), Some(&card))
            .expect("input added");
        design.update_props(&input, props(&[(VALUE_SOURCE_PROP, json!("user name"))]));
        design.update_position(&input, Point::new(60.0, 80.0), ParentHint::Under(&card));

        let out = Synthesizer::with_defaults().synthesize_design(&design);
        assert!(out.contains("const [user_name, setUser_name] = useState(\"\");"), "{out}");
        assert!(out.contains("value={user_name} onChange={(e) => setUser_name(e.target.value)}"));
        assert!(out.contains("left: 60, top: 80, width: 200, height: 40 }}"));
    }
}
