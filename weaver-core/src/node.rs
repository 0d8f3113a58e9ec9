//! Canvas nodes - placed widget instances that make up a design.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::catalog::{Props, VALUE_SOURCE_PROP};

/// Unique identifier for a node, stable for the node's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh id of the form `{widgetType}-{uuid}`.
    ///
    /// The UUID is version 7, so it carries the creation timestamp.
    #[must_use]
    pub fn generate(widget_type: &str) -> Self {
        Self(format!("{widget_type}-{}", Uuid::now_v7()))
    }

    /// Wrap an existing id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A requested position in layout units, before snapping.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Size of the design canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in layout units.
    pub width: u32,
    /// Height in layout units.
    pub height: u32,
}

impl CanvasSize {
    /// Create a canvas size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(1200, 800)
    }
}

/// Stored, grid-snapped geometry of a node.
///
/// Positions are relative to the parent for nested nodes and to the canvas
/// for top-level nodes. `z_index` is only consulted for top-level nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// X position.
    pub x: i32,
    /// Y position.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
    /// Stacking index among top-level siblings.
    #[serde(default)]
    pub z_index: u32,
}

/// Snap a coordinate to the nearest multiple of `grid`.
///
/// Total over all inputs: NaN snaps to 0 and out-of-range values saturate at
/// the largest representable grid multiple.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn snap_to_grid(value: f32, grid: i32) -> i32 {
    if grid <= 0 {
        return value.round() as i32;
    }
    let cells = ((value / grid as f32).round() as i32).clamp(i32::MIN / grid, i32::MAX / grid);
    cells * grid
}

/// A placed widget instance.
///
/// Children are shared with [`Arc`] so that edits can rebuild only the path
/// from the root to the changed node.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasNode {
    /// Unique identifier.
    pub id: NodeId,
    /// Widget type identifier (key into the catalog).
    pub widget_type: String,
    /// Property values.
    pub props: Props,
    /// Geometry.
    pub layout: Layout,
    /// Owning parent, `None` for top-level nodes.
    pub parent_id: Option<NodeId>,
    /// Owned children, `Some` only for container widgets.
    pub children: Option<Vec<Arc<CanvasNode>>>,
}

impl CanvasNode {
    /// Check whether this node sits at the top level.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Children as a slice (empty for leaf widgets).
    #[must_use]
    pub fn children(&self) -> &[Arc<CanvasNode>] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Get a property value.
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }

    /// Get a string property value.
    #[must_use]
    pub fn prop_str(&self, name: &str) -> Option<&str> {
        self.props.get(name).and_then(Value::as_str)
    }

    /// The trimmed, non-empty value source this node binds to.
    #[must_use]
    pub fn value_source(&self) -> Option<&str> {
        self.prop_str(VALUE_SOURCE_PROP)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Check whether this node or any descendant has the given id.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.id == *id || self.children().iter().any(|c| c.contains(id))
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(|c| c.subtree_len()).sum::<usize>()
    }
}

/// Collect every node of a forest in pre-order (parents before children).
#[must_use]
pub fn pre_order(forest: &[Arc<CanvasNode>]) -> Vec<&CanvasNode> {
    fn visit<'a>(nodes: &'a [Arc<CanvasNode>], out: &mut Vec<&'a CanvasNode>) {
        for node in nodes {
            out.push(node);
            visit(node.children(), out);
        }
    }

    let mut out = Vec::new();
    visit(forest, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, parent: Option<&str>) -> Arc<CanvasNode> {
        Arc::new(CanvasNode {
            id: NodeId::from(id),
            widget_type: "button".to_string(),
            props: Props::new(),
            layout: Layout::default(),
            parent_id: parent.map(NodeId::from),
            children: None,
        })
    }

    fn card(id: &str, children: Vec<Arc<CanvasNode>>) -> Arc<CanvasNode> {
        Arc::new(CanvasNode {
            id: NodeId::from(id),
            widget_type: "card".to_string(),
            props: Props::new(),
            layout: Layout::default(),
            parent_id: None,
            children: Some(children),
        })
    }

    #[test]
    fn test_generated_ids_carry_type_and_are_unique() {
        let a = NodeId::generate("button");
        let b = NodeId::generate("button");
        assert!(a.as_str().starts_with("button-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(0.0, 20), 0);
        assert_eq!(snap_to_grid(9.9, 20), 0);
        assert_eq!(snap_to_grid(10.0, 20), 20);
        assert_eq!(snap_to_grid(47.0, 20), 40);
        assert_eq!(snap_to_grid(-31.0, 20), -40);
        assert_eq!(snap_to_grid(13.4, 0), 13);
    }

    #[test]
    fn test_snap_to_grid_saturates_extreme_input() {
        assert_eq!(snap_to_grid(5.0e10, 20), 2_147_483_640);
        assert_eq!(snap_to_grid(f32::INFINITY, 20), 2_147_483_640);
        assert_eq!(snap_to_grid(f32::NEG_INFINITY, 20), -2_147_483_640);
        assert_eq!(snap_to_grid(-5.0e10, 20), -2_147_483_640);
        assert_eq!(snap_to_grid(f32::NAN, 20), 0);
        assert_eq!(snap_to_grid(f32::MAX, 7), (i32::MAX / 7) * 7);
        assert_eq!(snap_to_grid(f32::NAN, 0), 0);
    }

    #[test]
    fn test_value_source_is_trimmed() {
        let mut node = (*leaf("a", None)).clone();
        assert_eq!(node.value_source(), None);
        node.props
            .insert(VALUE_SOURCE_PROP.to_string(), Value::from("  score "));
        assert_eq!(node.value_source(), Some("score"));
        node.props
            .insert(VALUE_SOURCE_PROP.to_string(), Value::from("   "));
        assert_eq!(node.value_source(), None);
    }

    #[test]
    fn test_pre_order_and_contains() {
        let forest = vec![
            card("c1", vec![leaf("b1", Some("c1")), leaf("b2", Some("c1"))]),
            leaf("b3", None),
        ];
        let ids: Vec<_> = pre_order(&forest)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c1", "b1", "b2", "b3"]);

        assert!(forest[0].contains(&NodeId::from("b2")));
        assert!(!forest[0].contains(&NodeId::from("b3")));
        assert_eq!(forest[0].subtree_len(), 3);
    }

    #[test]
    fn test_layout_serializes_camel_case() {
        let layout = Layout {
            x: 20,
            y: 40,
            width: 100,
            height: 60,
            z_index: 3,
        };
        let json = serde_json::to_value(layout).expect("serialize");
        assert_eq!(json["zIndex"], 3);
    }

    mod proptest_tests {
        use super::super::*;
        use proptest::prelude::*;

        fn any_coordinate() -> impl Strategy<Value = f32> {
            prop_oneof![
                -1.0e4f32..1.0e4,
                Just(f32::INFINITY),
                Just(f32::NEG_INFINITY),
                Just(f32::NAN),
                Just(f32::MAX),
                Just(f32::MIN),
                any::<f32>(),
            ]
        }

        proptest! {
            #[test]
            fn snapped_values_are_grid_multiples(value in any_coordinate(), grid in 1i32..64) {
                prop_assert_eq!(snap_to_grid(value, grid) % grid, 0);
            }
        }
    }
}
