//! Emission strategy per widget kind.
//!
//! Most widgets render as one tag. The composites below need a fixed nested
//! structure, so each gets its own strategy rather than conditionals inside
//! the generic emitter.

use weaver_core::{CanvasNode, WidgetDefinition, WidgetKind};

/// How a node is turned into JSX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy<'a> {
    /// A single tag, with optional text content taken from a prop.
    Element {
        /// Tag name.
        tag: &'a str,
        /// Prop rendered as content when the node has no children.
        content: Option<&'static str>,
    },
    /// Card with header, title, description and content sections.
    Card,
    /// Checkbox or switch paired with a caption label.
    CaptionedToggle {
        /// Control tag.
        tag: &'static str,
        /// Suffix of the generated control id.
        id_suffix: &'static str,
    },
    /// Alert with title and description.
    Alert,
    /// Avatar with image and fallback initials.
    Avatar,
    /// Accordion items.
    Accordion,
    /// Tab list plus one content panel per tab.
    Tabs,
    /// Radio items with labels.
    RadioGroup,
    /// Trigger, value and item list.
    Select,
    /// Caption, header row and body rows.
    Table,
    /// External component.
    Custom {
        /// Component symbol.
        component: &'a str,
    },
    /// Widget type missing from the catalog.
    Unknown,
}

impl<'a> Strategy<'a> {
    /// Pick the strategy for a node. `None` means the widget type is unknown.
    #[must_use]
    pub fn for_node(definition: Option<&'a WidgetDefinition>, node: &CanvasNode) -> Self {
        let Some(definition) = definition else {
            return Self::Unknown;
        };
        let captioned = node.prop_str("label").is_some_and(|l| !l.trim().is_empty());

        match &definition.kind {
            WidgetKind::Button => Self::element("Button", Some("children")),
            WidgetKind::Input => Self::element("Input", None),
            WidgetKind::Textarea => Self::element("Textarea", None),
            WidgetKind::Text => Self::element("p", Some("children")),
            WidgetKind::Label => Self::element("Label", Some("children")),
            WidgetKind::Badge => Self::element("Badge", Some("children")),
            WidgetKind::Card => Self::Card,
            WidgetKind::ScrollArea => Self::element("ScrollArea", Some("contentPlaceholder")),
            WidgetKind::Image => Self::element("img", None),
            WidgetKind::Avatar => Self::Avatar,
            WidgetKind::Checkbox if captioned => Self::CaptionedToggle {
                tag: "Checkbox",
                id_suffix: "chk",
            },
            WidgetKind::Checkbox => Self::element("Checkbox", None),
            WidgetKind::Switch if captioned => Self::CaptionedToggle {
                tag: "Switch",
                id_suffix: "swt",
            },
            WidgetKind::Switch => Self::element("Switch", None),
            WidgetKind::Slider => Self::element("Slider", None),
            WidgetKind::Progress => Self::element("Progress", None),
            WidgetKind::RadioGroup => Self::RadioGroup,
            WidgetKind::Select => Self::Select,
            WidgetKind::Separator => Self::element("Separator", None),
            WidgetKind::Skeleton => Self::element("Skeleton", None),
            WidgetKind::Accordion => Self::Accordion,
            WidgetKind::Alert => Self::Alert,
            WidgetKind::Table => Self::Table,
            WidgetKind::Tabs => Self::Tabs,
            WidgetKind::Placeholder => Self::element("div", Some("text")),
            WidgetKind::Custom(custom) => Self::Custom {
                component: &custom.component,
            },
        }
    }

    const fn element(tag: &'a str, content: Option<&'static str>) -> Self {
        Self::Element { tag, content }
    }

    /// Props the strategy renders structurally instead of as attributes.
    #[must_use]
    pub fn consumed_props(&self) -> &'static [&'static str] {
        match self {
            Self::Element {
                content: Some("children"),
                ..
            } => &["children"],
            Self::Element {
                content: Some("contentPlaceholder"),
                ..
            } => &["contentPlaceholder"],
            Self::Element {
                content: Some("text"),
                ..
            } => &["text"],
            Self::Element { .. } | Self::CaptionedToggle { .. } => &["label"],
            Self::Card => &["title", "description", "content"],
            Self::Alert => &["title", "description"],
            Self::Avatar => &["src", "alt", "fallback"],
            Self::Accordion | Self::Tabs | Self::RadioGroup => &["items"],
            Self::Select => &["items", "placeholder"],
            Self::Table => &["caption", "headers", "rows"],
            Self::Custom { .. } | Self::Unknown => &[],
        }
    }
}

/// UI symbols a widget kind imports, as `(module, symbols)` pairs.
///
/// Modules are relative to the UI component root. Native tags import nothing.
#[must_use]
pub fn ui_imports(kind: &WidgetKind) -> &'static [(&'static str, &'static [&'static str])] {
    match kind {
        WidgetKind::Button => &[("button", &["Button"])],
        WidgetKind::Input => &[("input", &["Input"])],
        WidgetKind::Textarea => &[("textarea", &["Textarea"])],
        WidgetKind::Label => &[("label", &["Label"])],
        WidgetKind::Badge => &[("badge", &["Badge"])],
        WidgetKind::Card => &[(
            "card",
            &["Card", "CardContent", "CardDescription", "CardHeader", "CardTitle"],
        )],
        WidgetKind::ScrollArea => &[("scroll-area", &["ScrollArea"])],
        WidgetKind::Avatar => &[("avatar", &["Avatar", "AvatarFallback", "AvatarImage"])],
        WidgetKind::Checkbox => &[("checkbox", &["Checkbox"])],
        WidgetKind::Switch => &[("switch", &["Switch"])],
        WidgetKind::Slider => &[("slider", &["Slider"])],
        WidgetKind::Progress => &[("progress", &["Progress"])],
        WidgetKind::RadioGroup => &[
            ("label", &["Label"]),
            ("radio-group", &["RadioGroup", "RadioGroupItem"]),
        ],
        WidgetKind::Select => &[(
            "select",
            &["Select", "SelectContent", "SelectItem", "SelectTrigger", "SelectValue"],
        )],
        WidgetKind::Separator => &[("separator", &["Separator"])],
        WidgetKind::Skeleton => &[("skeleton", &["Skeleton"])],
        WidgetKind::Accordion => &[(
            "accordion",
            &["Accordion", "AccordionContent", "AccordionItem", "AccordionTrigger"],
        )],
        WidgetKind::Alert => &[("alert", &["Alert", "AlertDescription", "AlertTitle"])],
        WidgetKind::Table => &[(
            "table",
            &[
                "Table",
                "TableBody",
                "TableCaption",
                "TableCell",
                "TableHead",
                "TableHeader",
                "TableRow",
            ],
        )],
        WidgetKind::Tabs => &[("tabs", &["Tabs", "TabsContent", "TabsList", "TabsTrigger"])],
        WidgetKind::Text | WidgetKind::Image | WidgetKind::Placeholder | WidgetKind::Custom(_) => {
            &[]
        }
    }
}
