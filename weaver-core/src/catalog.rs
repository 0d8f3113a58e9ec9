//! Widget catalog - the static registry of placeable widget types.
//!
//! ## Built-in widgets
//!
//! | Category   | Widgets                                                   |
//! |------------|-----------------------------------------------------------|
//! | actions    | `button`                                                  |
//! | inputs     | `input`, `textarea`, `checkbox`, `switch`, `slider`, `radioGroup`, `select` |
//! | display    | `text`, `label`, `badge`, `image`, `avatar`, `placeholder` |
//! | layout     | `card`, `scrollArea`, `separator`, `accordion`, `tabs`    |
//! | feedback   | `progress`, `skeleton`, `alert`                           |
//! | data       | `table`                                                   |
//! | custom     | `custom_ExampleCounter`                                   |
//!
//! The catalog is read-only once built. [`Catalog::shared`] hands out the
//! process-wide built-in catalog, initialized on first use.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Grid unit for positions and sizes, in layout units.
pub const GRID_SIZE: i32 = 20;

/// Property prop that names a shared value source.
pub const VALUE_SOURCE_PROP: &str = "valueSource";

/// Property prop that names the action fired on click.
pub const TRIGGER_PROP: &str = "onClickAction";

/// Widget property mapping.
pub type Props = BTreeMap<String, Value>;

/// A requested or default size in layout units (not yet grid-snapped).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Value kind of a declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    /// Free text.
    String,
    /// Numeric value.
    Number,
    /// On/off flag.
    Boolean,
    /// One of a fixed set of strings.
    Enum,
    /// Object or array data.
    Structured,
}

/// Schema entry for one widget property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropDef {
    /// Value kind.
    pub kind: PropKind,
    /// Human label for the property editor.
    #[serde(default)]
    pub label: Option<String>,
    /// Schema default value.
    #[serde(default)]
    pub default: Value,
    /// Allowed values for [`PropKind::Enum`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl PropDef {
    fn new(kind: PropKind, label: &str, default: Value) -> Self {
        Self {
            kind,
            label: Some(label.to_string()),
            default,
            options: Vec::new(),
        }
    }

    fn string(label: &str, default: &str) -> Self {
        Self::new(PropKind::String, label, Value::from(default))
    }

    fn number(label: &str, default: i64) -> Self {
        Self::new(PropKind::Number, label, Value::from(default))
    }

    fn boolean(label: &str, default: bool) -> Self {
        Self::new(PropKind::Boolean, label, Value::Bool(default))
    }

    fn choice(label: &str, options: &[&str], default: &str) -> Self {
        Self {
            options: options.iter().map(ToString::to_string).collect(),
            ..Self::new(PropKind::Enum, label, Value::from(default))
        }
    }

    fn structured(label: &str, default: Value) -> Self {
        Self::new(PropKind::Structured, label, default)
    }
}

/// External implementation details of a custom widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomWidget {
    /// Component symbol exported by the module.
    pub component: String,
    /// Module path relative to the custom component root.
    pub module: String,
}

/// The closed set of widget kinds, plus an open custom variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetKind {
    /// Clickable button.
    Button,
    /// Single-line text entry.
    Input,
    /// Multi-line text entry.
    Textarea,
    /// Paragraph of text.
    Text,
    /// Short read-only label.
    Label,
    /// Small status badge.
    Badge,
    /// Card with header and content area.
    Card,
    /// Scrollable content area.
    ScrollArea,
    /// Static image.
    Image,
    /// User avatar with fallback initials.
    Avatar,
    /// Checkbox with optional caption.
    Checkbox,
    /// Toggle switch with optional caption.
    Switch,
    /// Numeric range slider.
    Slider,
    /// Progress bar.
    Progress,
    /// Group of radio options.
    RadioGroup,
    /// Drop-down select.
    Select,
    /// Horizontal or vertical rule.
    Separator,
    /// Loading skeleton.
    Skeleton,
    /// Collapsible sections.
    Accordion,
    /// Callout with title and description.
    Alert,
    /// Tabular data.
    Table,
    /// Tabbed panels.
    Tabs,
    /// Labelled empty box.
    Placeholder,
    /// Widget implemented outside the catalog.
    Custom(CustomWidget),
}

/// How a widget exposes a bound value source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Editable text (`value` + change handler).
    Text,
    /// Boolean checked state.
    Toggle,
    /// Numeric value.
    Numeric,
    /// Read-only text content.
    Display,
}

impl BindingKind {
    /// The literal prop that a binding of this kind replaces.
    #[must_use]
    pub const fn bound_prop(self) -> &'static str {
        match self {
            Self::Text | Self::Numeric => "value",
            Self::Toggle => "checked",
            Self::Display => "children",
        }
    }
}

impl WidgetKind {
    /// The binding semantics of this kind, if it can bind a value source.
    #[must_use]
    pub const fn binding(&self) -> Option<BindingKind> {
        match self {
            Self::Input | Self::Textarea => Some(BindingKind::Text),
            Self::Checkbox | Self::Switch => Some(BindingKind::Toggle),
            Self::Slider | Self::Progress => Some(BindingKind::Numeric),
            Self::Text | Self::Label => Some(BindingKind::Display),
            _ => None,
        }
    }
}

/// Catalog entry describing one widget type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDefinition {
    /// Unique type identifier (the node's widget type).
    pub id: String,
    /// Human name shown in the palette.
    pub name: String,
    /// Palette category tag.
    pub category: String,
    /// Kind used for binding and emission dispatch.
    #[serde(flatten)]
    pub kind: WidgetKind,
    /// Props given to a freshly placed node.
    #[serde(default)]
    pub default_props: Props,
    /// Size given to a freshly placed node (before snapping).
    pub default_size: Size,
    /// Declared property schema.
    #[serde(default)]
    pub prop_types: BTreeMap<String, PropDef>,
    /// Whether nodes of this type may own children.
    #[serde(default)]
    pub is_container: bool,
    /// Whether the widget is implemented externally.
    #[serde(default)]
    pub is_custom: bool,
}

impl WidgetDefinition {
    fn new(id: &str, name: &str, category: &str, kind: WidgetKind, size: (f32, f32)) -> Self {
        let is_custom = matches!(kind, WidgetKind::Custom(_));
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            kind,
            default_props: Props::new(),
            default_size: Size::new(size.0, size.1),
            prop_types: BTreeMap::new(),
            is_container: false,
            is_custom,
        }
    }

    /// Declare a property and seed its default into new nodes.
    fn prop(mut self, name: &str, def: PropDef) -> Self {
        self.default_props.insert(name.to_string(), def.default.clone());
        self.prop_types.insert(name.to_string(), def);
        self
    }

    /// Declare a property without seeding it into new nodes.
    fn optional(mut self, name: &str, def: PropDef) -> Self {
        self.prop_types.insert(name.to_string(), def);
        self
    }

    fn bindable(self) -> Self {
        self.optional(VALUE_SOURCE_PROP, PropDef::string("Value Source", ""))
    }

    fn container(mut self) -> Self {
        self.is_container = true;
        self
    }

    /// Schema default for a declared property.
    #[must_use]
    pub fn schema_default(&self, prop: &str) -> Option<&Value> {
        self.prop_types.get(prop).map(|def| &def.default)
    }

    /// Whether the schema declares a property.
    #[must_use]
    pub fn declares(&self, prop: &str) -> bool {
        self.prop_types.contains_key(prop)
    }

    /// Whether nodes of this type can fire a click action.
    #[must_use]
    pub fn has_trigger(&self) -> bool {
        self.declares(TRIGGER_PROP)
    }

    /// Smallest size a node of this type may be resized to.
    ///
    /// A quarter of the default size per axis, snapped, never below one grid unit.
    #[must_use]
    pub fn min_size(&self, grid: i32) -> (i32, i32) {
        let min_axis = |v: f32| crate::node::snap_to_grid(v / 4.0, grid).max(grid);
        (
            min_axis(self.default_size.width),
            min_axis(self.default_size.height),
        )
    }
}

/// Registry of widget definitions keyed by type identifier.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    definitions: Vec<WidgetDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog of built-in widgets.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for definition in builtin_definitions() {
            catalog.register(definition);
        }
        catalog
    }

    /// The process-wide built-in catalog, initialized once.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<Catalog>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::builtin())))
    }

    /// Built-in widgets plus custom definitions given as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not an array of widget definitions.
    pub fn with_custom_json(json: &str) -> Result<Self, serde_json::Error> {
        let custom: Vec<WidgetDefinition> = serde_json::from_str(json)?;
        let mut catalog = Self::builtin();
        for definition in custom {
            catalog.register(definition);
        }
        Ok(catalog)
    }

    /// Add a definition, replacing any entry with the same id.
    pub fn register(&mut self, mut definition: WidgetDefinition) {
        if matches!(definition.kind, WidgetKind::Custom(_)) {
            definition.is_custom = true;
        }
        if let Some(&slot) = self.index.get(&definition.id) {
            tracing::debug!("Replacing widget definition {}", definition.id);
            self.definitions[slot] = definition;
        } else {
            self.index
                .insert(definition.id.clone(), self.definitions.len());
            self.definitions.push(definition);
        }
    }

    /// Look up a widget definition by type identifier.
    #[must_use]
    pub fn lookup(&self, type_id: &str) -> Option<&WidgetDefinition> {
        self.index.get(type_id).map(|&i| &self.definitions[i])
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &WidgetDefinition> {
        self.definitions.iter()
    }

    /// Number of registered widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[allow(clippy::too_many_lines)]
fn builtin_definitions() -> Vec<WidgetDefinition> {
    use WidgetKind as K;

    let items = |entries: Value| PropDef::structured("Items", entries);

    vec![
        WidgetDefinition::new("button", "Button", "actions", K::Button, (120.0, 40.0))
            .prop("children", PropDef::string("Text", "Button"))
            .prop(
                "variant",
                PropDef::choice(
                    "Variant",
                    &["default", "destructive", "outline", "secondary", "ghost", "link"],
                    "default",
                ),
            )
            .prop(
                "size",
                PropDef::choice("Size", &["default", "sm", "lg", "icon"], "default"),
            )
            .optional(
                TRIGGER_PROP,
                PropDef::string("On Click Action (module/function or local name)", ""),
            ),
        WidgetDefinition::new("input", "Input Field", "inputs", K::Input, (200.0, 40.0))
            .prop("placeholder", PropDef::string("Placeholder", "Enter text..."))
            .optional(
                "type",
                PropDef::choice("Type", &["text", "password", "email", "number"], "text"),
            )
            .optional("value", PropDef::string("Value", ""))
            .bindable(),
        WidgetDefinition::new("textarea", "Text Area", "inputs", K::Textarea, (240.0, 100.0))
            .prop(
                "placeholder",
                PropDef::string("Placeholder", "Type your message here."),
            )
            .optional("value", PropDef::string("Value", ""))
            .bindable(),
        WidgetDefinition::new("text", "Text Block", "display", K::Text, (200.0, 30.0))
            .prop("children", PropDef::string("Content", "Some sample text"))
            .prop(
                "className",
                PropDef::string("Tailwind Classes (e.g. text-lg font-bold)", "text-base"),
            )
            .bindable(),
        WidgetDefinition::new("label", "Label", "display", K::Label, (120.0, 24.0))
            .prop("children", PropDef::string("Text", "Label"))
            .bindable(),
        WidgetDefinition::new("badge", "Badge", "display", K::Badge, (80.0, 24.0))
            .prop("children", PropDef::string("Text", "Badge"))
            .prop(
                "variant",
                PropDef::choice(
                    "Variant",
                    &["default", "secondary", "destructive", "outline"],
                    "default",
                ),
            ),
        WidgetDefinition::new("card", "Card", "layout", K::Card, (300.0, 200.0))
            .container()
            .prop("title", PropDef::string("Title", "Card Title"))
            .prop(
                "description",
                PropDef::string("Description", "Card description here."),
            )
            .prop(
                "content",
                PropDef::string("Default Content (if no children)", "Drag components here."),
            ),
        WidgetDefinition::new("scrollArea", "Scroll Area", "layout", K::ScrollArea, (250.0, 200.0))
            .container()
            .prop(
                "contentPlaceholder",
                PropDef::string("Placeholder (if no children)", "Scrollable Content Area"),
            ),
        WidgetDefinition::new("image", "Image", "display", K::Image, (200.0, 150.0))
            .prop(
                "src",
                PropDef::string("Image URL", "https://placehold.co/200x150.png"),
            )
            .prop("alt", PropDef::string("Alt Text", "Placeholder Image"))
            .prop("data-ai-hint", PropDef::string("AI Hint", "abstract texture")),
        WidgetDefinition::new("avatar", "Avatar", "display", K::Avatar, (40.0, 40.0))
            .prop(
                "src",
                PropDef::string("Image URL", "https://github.com/shadcn.png"),
            )
            .prop("alt", PropDef::string("Alt Text", "Avatar"))
            .prop("fallback", PropDef::string("Fallback Initials", "AV")),
        WidgetDefinition::new("checkbox", "Checkbox", "inputs", K::Checkbox, (150.0, 24.0))
            .prop("label", PropDef::string("Label", "Accept terms"))
            .prop("checked", PropDef::boolean("Checked", false))
            .bindable(),
        WidgetDefinition::new("switch", "Switch", "inputs", K::Switch, (60.0, 30.0))
            .prop("checked", PropDef::boolean("Enabled", false))
            .optional("label", PropDef::string("Label", ""))
            .bindable(),
        WidgetDefinition::new("slider", "Slider", "inputs", K::Slider, (200.0, 20.0))
            .prop("value", PropDef::number("Value", 50))
            .prop("min", PropDef::number("Min", 0))
            .prop("max", PropDef::number("Max", 100))
            .prop("step", PropDef::number("Step", 1))
            .bindable(),
        WidgetDefinition::new("progress", "Progress", "feedback", K::Progress, (200.0, 20.0))
            .prop("value", PropDef::number("Value", 0))
            .bindable(),
        WidgetDefinition::new("radioGroup", "Radio Group", "inputs", K::RadioGroup, (200.0, 100.0))
            .prop("defaultValue", PropDef::string("Default Value", "option-one"))
            .prop(
                "items",
                items(json!([
                    { "value": "option-one", "label": "Option One" },
                    { "value": "option-two", "label": "Option Two" }
                ])),
            ),
        WidgetDefinition::new("select", "Select", "inputs", K::Select, (180.0, 40.0))
            .prop("placeholder", PropDef::string("Placeholder", "Select..."))
            .prop(
                "items",
                items(json!([
                    { "value": "apple", "label": "Apple" },
                    { "value": "banana", "label": "Banana" }
                ])),
            ),
        WidgetDefinition::new("separator", "Separator", "layout", K::Separator, (200.0, 20.0))
            .prop(
                "orientation",
                PropDef::choice("Orientation", &["horizontal", "vertical"], "horizontal"),
            ),
        WidgetDefinition::new("skeleton", "Skeleton", "feedback", K::Skeleton, (200.0, 40.0))
            .prop("className", PropDef::string("Tailwind Classes", "rounded-md")),
        WidgetDefinition::new("accordion", "Accordion", "layout", K::Accordion, (300.0, 150.0))
            .prop(
                "type",
                PropDef::choice("Type", &["single", "multiple"], "single"),
            )
            .prop("collapsible", PropDef::boolean("Collapsible", true))
            .prop(
                "items",
                items(json!([
                    { "value": "item-1", "title": "Is it accessible?", "content": "Yes." }
                ])),
            ),
        WidgetDefinition::new("alert", "Alert", "feedback", K::Alert, (300.0, 80.0))
            .prop(
                "variant",
                PropDef::choice("Variant", &["default", "destructive"], "default"),
            )
            .prop("title", PropDef::string("Title", "Heads up!"))
            .prop(
                "description",
                PropDef::string("Description", "You can add components to your app."),
            ),
        WidgetDefinition::new("table", "Table", "data", K::Table, (400.0, 200.0))
            .prop("caption", PropDef::string("Caption", "A list of items."))
            .prop(
                "headers",
                PropDef::structured("Headers", json!(["Name", "Status"])),
            )
            .prop(
                "rows",
                PropDef::structured("Rows", json!([["Item 1", "Active"], ["Item 2", "Idle"]])),
            ),
        WidgetDefinition::new("tabs", "Tabs", "layout", K::Tabs, (300.0, 200.0))
            .prop("defaultValue", PropDef::string("Default Tab", "tab-1"))
            .prop(
                "items",
                items(json!([
                    { "value": "tab-1", "title": "Account", "content": "Account settings." },
                    { "value": "tab-2", "title": "Password", "content": "Change your password." }
                ])),
            ),
        WidgetDefinition::new("placeholder", "Placeholder", "display", K::Placeholder, (100.0, 100.0))
            .prop("text", PropDef::string("Label", "Placeholder")),
        WidgetDefinition::new(
            "custom_ExampleCounter",
            "Counter (Custom)",
            "custom",
            K::Custom(CustomWidget {
                component: "ExampleCounter".to_string(),
                module: "ExampleCounter".to_string(),
            }),
            (200.0, 180.0),
        )
        .prop("initialCount", PropDef::number("Initial Count", 0))
        .prop("step", PropDef::number("Step Increment", 1))
        .prop("title", PropDef::string("Counter Title", "My Counter")),
    ]
}
