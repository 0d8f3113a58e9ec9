//! Per-node JSX emission.

use serde_json::{Map, Value};
use weaver_core::{
    ActionRef, Binding, BindingKind, BindingTable, CanvasNode, Catalog, WidgetDefinition,
    WidgetKind, TRIGGER_PROP, VALUE_SOURCE_PROP,
};

use crate::imports::{node_action, ActionNames};
use crate::jsx::{self, JsxWriter};
use crate::strategy::Strategy;

/// Emits one node and its subtree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeEmitter<'a> {
    catalog: &'a Catalog,
    bindings: &'a BindingTable,
    actions: &'a ActionNames,
}

impl<'a> NodeEmitter<'a> {
    pub(crate) fn new(
        catalog: &'a Catalog,
        bindings: &'a BindingTable,
        actions: &'a ActionNames,
    ) -> Self {
        Self {
            catalog,
            bindings,
            actions,
        }
    }

    pub(crate) fn emit(&self, out: &mut JsxWriter, node: &CanvasNode, depth: usize, top_level: bool) {
        let definition = self.catalog.lookup(&node.widget_type);
        let strategy = Strategy::for_node(definition, node);
        let Some(definition) = definition else {
            tracing::warn!("Unknown widget type {} for node {}", node.widget_type, node.id);
            out.line(
                depth,
                &jsx::comment(&format!("Unknown component type: {}", node.widget_type)),
            );
            return;
        };

        let binding = self.binding_for(node, definition);
        let attrs = self.attributes(node, definition, &strategy, binding);
        let style = jsx::style(&node.layout, top_level);
        let display = binding
            .filter(|(_, kind)| *kind == BindingKind::Display)
            .map(|(b, _)| format!("{{{}}}", b.variable));

        match strategy {
            Strategy::Element { tag, content } => {
                let content = display.or_else(|| content.and_then(|prop| text_prop(node, prop)));
                self.element(out, node, depth, tag, &with(attrs, style), content);
            }
            Strategy::Custom { component } => {
                self.element(out, node, depth, component, &with(attrs, style), None);
            }
            Strategy::Card => self.card(out, node, depth, &with(attrs, style)),
            Strategy::CaptionedToggle { tag, id_suffix } => {
                let control_id = format!("{}-{id_suffix}", node.id);
                let mut control = vec![jsx::attr("id", &Value::from(control_id.as_str()))];
                control.extend(attrs);
                let caption = text_prop(node, "label").unwrap_or_default();

                out.line(
                    depth,
                    &jsx::open_tag("div", &[r#"className="flex items-center space-x-2""#.to_string(), style]),
                );
                out.line(depth + 1, &jsx::self_closing(tag, &control));
                out.line(
                    depth + 1,
                    &jsx::inline(
                        "label",
                        &[jsx::attr("htmlFor", &Value::from(control_id))],
                        &caption,
                    ),
                );
                out.line(depth, "</div>");
            }
            Strategy::Alert => {
                out.line(depth, &jsx::open_tag("Alert", &with(attrs, style)));
                inline_if_set(out, depth + 1, "AlertTitle", text_prop(node, "title"));
                inline_if_set(out, depth + 1, "AlertDescription", text_prop(node, "description"));
                out.line(depth, "</Alert>");
            }
            Strategy::Avatar => {
                let image: Vec<String> = ["src", "alt"]
                    .iter()
                    .filter_map(|key| node.prop(key).map(|v| jsx::attr(key, v)))
                    .collect();
                out.line(depth, &jsx::open_tag("Avatar", &with(attrs, style)));
                out.line(depth + 1, &jsx::self_closing("AvatarImage", &image));
                inline_if_set(out, depth + 1, "AvatarFallback", text_prop(node, "fallback"));
                out.line(depth, "</Avatar>");
            }
            Strategy::Accordion => {
                out.line(depth, &jsx::open_tag("Accordion", &with(attrs, style)));
                for item in items(node) {
                    out.line(depth + 1, &jsx::open_tag("AccordionItem", &[value_attr(item)]));
                    out.line(
                        depth + 2,
                        &jsx::inline("AccordionTrigger", &[], &field(item, "title")),
                    );
                    out.line(
                        depth + 2,
                        &jsx::inline("AccordionContent", &[], &field(item, "content")),
                    );
                    out.line(depth + 1, "</AccordionItem>");
                }
                out.line(depth, "</Accordion>");
            }
            Strategy::Tabs => {
                let items = items(node);
                out.line(depth, &jsx::open_tag("Tabs", &with(attrs, style)));
                out.line(depth + 1, "<TabsList>");
                for item in &items {
                    out.line(
                        depth + 2,
                        &jsx::inline("TabsTrigger", &[value_attr(item)], &field(item, "title")),
                    );
                }
                out.line(depth + 1, "</TabsList>");
                for item in &items {
                    out.line(
                        depth + 1,
                        &jsx::inline("TabsContent", &[value_attr(item)], &field(item, "content")),
                    );
                }
                out.line(depth, "</Tabs>");
            }
            Strategy::RadioGroup => {
                out.line(depth, &jsx::open_tag("RadioGroup", &with(attrs, style)));
                for item in items(node) {
                    let item_id = Value::from(format!("{}-{}", node.id, plain(item.get("value"))));
                    out.line(depth + 1, r#"<div className="flex items-center space-x-2">"#);
                    out.line(
                        depth + 2,
                        &jsx::self_closing(
                            "RadioGroupItem",
                            &[value_attr(item), jsx::attr("id", &item_id)],
                        ),
                    );
                    out.line(
                        depth + 2,
                        &jsx::inline("Label", &[jsx::attr("htmlFor", &item_id)], &field(item, "label")),
                    );
                    out.line(depth + 1, "</div>");
                }
                out.line(depth, "</RadioGroup>");
            }
            Strategy::Select => {
                let placeholder: Vec<String> = node
                    .prop("placeholder")
                    .map(|v| jsx::attr("placeholder", v))
                    .into_iter()
                    .collect();
                out.line(depth, &jsx::open_tag("Select", &attrs));
                out.line(depth + 1, &jsx::open_tag("SelectTrigger", &[style]));
                out.line(depth + 2, &jsx::self_closing("SelectValue", &placeholder));
                out.line(depth + 1, "</SelectTrigger>");
                out.line(depth + 1, "<SelectContent>");
                for item in items(node) {
                    out.line(
                        depth + 2,
                        &jsx::inline("SelectItem", &[value_attr(item)], &field(item, "label")),
                    );
                }
                out.line(depth + 1, "</SelectContent>");
                out.line(depth, "</Select>");
            }
            Strategy::Table => self.table(out, node, depth, &with(attrs, style)),
            Strategy::Unknown => {}
        }
    }

    fn binding_for(
        &self,
        node: &CanvasNode,
        definition: &WidgetDefinition,
    ) -> Option<(&'a Binding, BindingKind)> {
        let kind = definition.kind.binding()?;
        let source = node.value_source()?;
        match self.bindings.get(source) {
            Some(binding) => Some((binding, kind)),
            None => {
                tracing::debug!("No binding for value source {source:?} of {}", node.id);
                None
            }
        }
    }

    fn attributes(
        &self,
        node: &CanvasNode,
        definition: &WidgetDefinition,
        strategy: &Strategy<'_>,
        binding: Option<(&Binding, BindingKind)>,
    ) -> Vec<String> {
        let consumed = strategy.consumed_props();
        let bound_prop = binding.map(|(_, kind)| kind.bound_prop());
        let is_slider = definition.kind == WidgetKind::Slider;
        let mut attrs = Vec::new();

        for (key, value) in &node.props {
            let key = key.as_str();
            if key == VALUE_SOURCE_PROP
                || key == TRIGGER_PROP
                || consumed.contains(&key)
                || bound_prop == Some(key)
            {
                continue;
            }
            if is_slider && key == "value" {
                attrs.push(jsx::expr_attr("defaultValue", &format!("[{value}]")));
                continue;
            }
            if !jsx::is_attr_name(key) {
                tracing::debug!("Skipping prop {key:?} of {}: not an attribute name", node.id);
                continue;
            }
            attrs.push(jsx::attr(key, value));
        }

        if let Some((binding, kind)) = binding {
            let (var, setter) = (&binding.variable, &binding.setter_name);
            match kind {
                BindingKind::Text => {
                    attrs.push(jsx::expr_attr("value", var));
                    attrs.push(jsx::expr_attr(
                        "onChange",
                        &format!("(e) => {setter}(e.target.value)"),
                    ));
                }
                BindingKind::Toggle => {
                    attrs.push(jsx::expr_attr("checked", var));
                    attrs.push(jsx::expr_attr(
                        "onCheckedChange",
                        &format!("(checked) => {setter}(Boolean(checked))"),
                    ));
                }
                BindingKind::Numeric if is_slider => {
                    attrs.push(jsx::expr_attr("value", &format!("[{var}]")));
                    attrs.push(jsx::expr_attr(
                        "onValueChange",
                        &format!("(values) => {setter}(values[0])"),
                    ));
                }
                BindingKind::Numeric => attrs.push(jsx::expr_attr("value", var)),
                BindingKind::Display => {}
            }
        }

        if let Some(handler) = self.click_handler(node, definition) {
            attrs.push(handler);
        }
        attrs
    }

    fn click_handler(&self, node: &CanvasNode, definition: &WidgetDefinition) -> Option<String> {
        match node_action(node, definition)?.ok()? {
            ActionRef::Imported { module, function } => {
                let name = self.actions.imported(&module, &function)?;
                let setters = self.bindings.setter_names();
                let arg = if setters.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", setters.join(", "))
                };
                Some(jsx::expr_attr(
                    "onClick",
                    &format!("() => {name}({arg})"),
                ))
            }
            ActionRef::Local(name) => {
                Some(jsx::expr_attr("onClick", self.actions.local(&name)?))
            }
        }
    }

    fn element(
        &self,
        out: &mut JsxWriter,
        node: &CanvasNode,
        depth: usize,
        tag: &str,
        attrs: &[String],
        content: Option<String>,
    ) {
        if !node.children().is_empty() {
            out.line(depth, &jsx::open_tag(tag, attrs));
            self.children(out, node, depth + 1);
            out.line(depth, &format!("</{tag}>"));
        } else if let Some(content) = content {
            out.line(depth, &jsx::inline(tag, attrs, &content));
        } else {
            out.line(depth, &jsx::self_closing(tag, attrs));
        }
    }

    fn children(&self, out: &mut JsxWriter, node: &CanvasNode, depth: usize) {
        for child in node.children() {
            self.emit(out, child, depth, false);
        }
    }

    fn card(&self, out: &mut JsxWriter, node: &CanvasNode, depth: usize, attrs: &[String]) {
        let title = text_prop(node, "title").unwrap_or_else(|| "Card Title".to_string());

        out.line(depth, &jsx::open_tag("Card", attrs));
        out.line(depth + 1, "<CardHeader>");
        out.line(depth + 2, &jsx::inline("CardTitle", &[], &title));
        inline_if_set(out, depth + 2, "CardDescription", text_prop(node, "description"));
        out.line(depth + 1, "</CardHeader>");
        if node.children().is_empty() {
            match text_prop(node, "content") {
                Some(content) => out.line(depth + 1, &jsx::inline("CardContent", &[], &content)),
                None => out.line(depth + 1, "<CardContent />"),
            }
        } else {
            out.line(depth + 1, "<CardContent>");
            self.children(out, node, depth + 2);
            out.line(depth + 1, "</CardContent>");
        }
        out.line(depth, "</Card>");
    }

    fn table(&self, out: &mut JsxWriter, node: &CanvasNode, depth: usize, attrs: &[String]) {
        let headers: Vec<String> = node
            .prop("headers")
            .and_then(Value::as_array)
            .map(|cells| cells.iter().map(|c| jsx::text(&plain(Some(c)))).collect())
            .unwrap_or_default();
        let rows: Vec<Vec<String>> = node
            .prop("rows")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| match row {
                        Value::Array(cells) => {
                            cells.iter().map(|c| jsx::text(&plain(Some(c)))).collect()
                        }
                        other => vec![jsx::text(&plain(Some(other)))],
                    })
                    .collect()
            })
            .unwrap_or_default();

        out.line(depth, &jsx::open_tag("Table", attrs));
        inline_if_set(out, depth + 1, "TableCaption", text_prop(node, "caption"));
        if !headers.is_empty() {
            out.line(depth + 1, "<TableHeader>");
            out.line(depth + 2, "<TableRow>");
            for header in &headers {
                out.line(depth + 3, &jsx::inline("TableHead", &[], header));
            }
            out.line(depth + 2, "</TableRow>");
            out.line(depth + 1, "</TableHeader>");
        }
        out.line(depth + 1, "<TableBody>");
        for row in &rows {
            out.line(depth + 2, "<TableRow>");
            for cell in row {
                out.line(depth + 3, &jsx::inline("TableCell", &[], cell));
            }
            out.line(depth + 2, "</TableRow>");
        }
        out.line(depth + 1, "</TableBody>");
        out.line(depth, "</Table>");
    }
}

fn with(mut attrs: Vec<String>, style: String) -> Vec<String> {
    attrs.push(style);
    attrs
}

fn inline_if_set(out: &mut JsxWriter, depth: usize, tag: &str, content: Option<String>) {
    if let Some(content) = content {
        out.line(depth, &jsx::inline(tag, &[], &content));
    }
}

/// Non-empty prop rendered as JSX text.
fn text_prop(node: &CanvasNode, prop: &str) -> Option<String> {
    let text = plain(node.prop(prop));
    (!text.is_empty()).then(|| jsx::text(&text))
}

fn plain(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn items(node: &CanvasNode) -> Vec<&Map<String, Value>> {
    node.prop("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn field(item: &Map<String, Value>, key: &str) -> String {
    jsx::text(&plain(item.get(key)))
}

fn value_attr(item: &Map<String, Value>) -> String {
    jsx::attr("value", &Value::from(plain(item.get("value"))))
}
