//! Serialized design snapshot, the only persisted artifact.
//!
//! ```json
//! {
//!   "components": [
//!     { "id": "card-…", "type": "card", "props": {…},
//!       "layout": { "x": 0, "y": 0, "width": 300, "height": 200, "zIndex": 1 },
//!       "parentId": null,
//!       "children": [ … ] }
//!   ],
//!   "canvas": { "width": 1200, "height": 800 },
//!   "initialGlobalStates": { "score": 0 }
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Props};
use crate::error::WeaverResult;
use crate::node::{CanvasNode, CanvasSize, Layout, NodeId};

/// Document form of one node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    /// Node identifier.
    pub id: NodeId,
    /// Widget type identifier.
    #[serde(rename = "type")]
    pub widget_type: String,
    /// Property values.
    #[serde(default)]
    pub props: Props,
    /// Stored geometry.
    pub layout: Layout,
    /// Owning parent.
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    /// Children, present for container widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeDocument>>,
}

impl From<&CanvasNode> for NodeDocument {
    fn from(node: &CanvasNode) -> Self {
        Self {
            id: node.id.clone(),
            widget_type: node.widget_type.clone(),
            props: node.props.clone(),
            layout: node.layout,
            parent_id: node.parent_id.clone(),
            children: node
                .children
                .as_ref()
                .map(|children| children.iter().map(|c| Self::from(&**c)).collect()),
        }
    }
}

impl NodeDocument {
    /// Convert to a runtime node owned by `parent`.
    ///
    /// Inconsistent documents are repaired rather than rejected: the
    /// `parentId` is rewritten to the actual owner, children of non-container
    /// widgets are dropped, and containers always get a children list.
    /// Widget types missing from the catalog keep their children as stored.
    #[must_use]
    pub fn into_node(self, parent: Option<&NodeId>, catalog: &Catalog) -> CanvasNode {
        if self.parent_id.as_ref() != parent {
            tracing::warn!(
                "Repairing parentId of {}: {:?} -> {:?}",
                self.id,
                self.parent_id,
                parent
            );
        }

        let is_container = catalog.lookup(&self.widget_type).map(|d| d.is_container);
        let children = match (is_container, self.children) {
            (Some(false), Some(children)) => {
                tracing::warn!(
                    "Dropping {} children of non-container {} ({})",
                    children.len(),
                    self.id,
                    self.widget_type
                );
                None
            }
            (Some(true), None) => Some(Vec::new()),
            (_, children) => children,
        };

        let children = children.map(|docs| {
            docs.into_iter()
                .map(|doc| Arc::new(doc.into_node(Some(&self.id), catalog)))
                .collect()
        });

        CanvasNode {
            id: self.id,
            widget_type: self.widget_type,
            props: self.props,
            layout: self.layout,
            parent_id: parent.cloned(),
            children,
        }
    }
}

/// Complete design snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSnapshot {
    /// The node forest in document order.
    #[serde(default)]
    pub components: Vec<NodeDocument>,
    /// Canvas size.
    #[serde(default)]
    pub canvas: CanvasSize,
    /// Pre-seeded value sources.
    #[serde(default)]
    pub initial_global_states: Props,
}

impl DesignSnapshot {
    /// Build a snapshot from a forest.
    #[must_use]
    pub fn from_forest(
        forest: &[Arc<CanvasNode>],
        canvas: CanvasSize,
        initial_global_states: &Props,
    ) -> Self {
        Self {
            components: forest.iter().map(|n| NodeDocument::from(&**n)).collect(),
            canvas,
            initial_global_states: initial_global_states.clone(),
        }
    }

    /// Convert the components into a runtime forest, repairing as needed.
    #[must_use]
    pub fn into_forest(self, catalog: &Catalog) -> Vec<Arc<CanvasNode>> {
        self.components
            .into_iter()
            .map(|doc| Arc::new(doc.into_node(None, catalog)))
            .collect()
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a property value cannot be serialized.
    pub fn to_json(&self) -> WeaverResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a property value cannot be serialized.
    pub fn to_json_pretty(&self) -> WeaverResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or misses required fields.
    pub fn from_json(json: &str) -> WeaverResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
