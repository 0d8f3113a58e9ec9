//! The design: a persistent forest of canvas nodes plus selection and canvas size.
//!
//! Every edit locates its target first and only then path-copies the spine
//! from the root down to the target with [`Arc::make_mut`]. Untouched
//! subtrees stay shared with earlier versions, so a clone of the forest taken
//! before an edit is a consistent snapshot, and an edit that changes nothing
//! leaves the forest pointer as it was.
//!
//! Mutations come in two flavours. The `try_*` methods report why an edit
//! was rejected. The plain methods log the rejection and leave the design
//! unchanged, which is what an interactive editing session calls.

use std::sync::Arc;

use crate::arrange;
use crate::binding::BindingTable;
use crate::catalog::{Catalog, Props, GRID_SIZE};
use crate::config::DesignConfig;
use crate::error::{WeaverError, WeaverResult};
use crate::node::{pre_order, snap_to_grid, CanvasNode, CanvasSize, Layout, NodeId, Point};
use crate::snapshot::DesignSnapshot;

/// Top-level node list.
pub type Forest = Vec<Arc<CanvasNode>>;

/// Where the caller believes a node currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentHint<'a> {
    /// Unknown; search the forest.
    #[default]
    Unknown,
    /// At the top level.
    TopLevel,
    /// Directly under the given parent.
    Under(&'a NodeId),
}

impl<'a> From<Option<&'a NodeId>> for ParentHint<'a> {
    fn from(parent: Option<&'a NodeId>) -> Self {
        parent.map_or(Self::TopLevel, Self::Under)
    }
}

/// A design being edited.
#[derive(Debug, Clone)]
pub struct Design {
    forest: Arc<Forest>,
    selected: Option<NodeId>,
    canvas: CanvasSize,
    initial_global_states: Props,
    grid: i32,
    catalog: Arc<Catalog>,
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

impl Design {
    /// Create an empty design with default configuration and the built-in catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DesignConfig::default())
    }

    /// Create an empty design from configuration, using the built-in catalog.
    #[must_use]
    pub fn with_config(config: DesignConfig) -> Self {
        Self::with_catalog(config, Catalog::shared())
    }

    /// Create an empty design with a specific catalog.
    #[must_use]
    pub fn with_catalog(config: DesignConfig, catalog: Arc<Catalog>) -> Self {
        Self {
            forest: Arc::new(Forest::new()),
            selected: None,
            canvas: config.canvas,
            initial_global_states: config.initial_global_states,
            grid: usable_grid(config.grid_size),
            catalog,
        }
    }

    /// Rebuild a design from a snapshot, using the built-in catalog.
    #[must_use]
    pub fn from_snapshot(snapshot: DesignSnapshot) -> Self {
        Self::from_snapshot_with_catalog(snapshot, Catalog::shared())
    }

    /// Rebuild a design from a snapshot, snapping later edits to the grid of
    /// `config`. Canvas and seeded states come from the snapshot.
    #[must_use]
    pub fn from_snapshot_with_config(snapshot: DesignSnapshot, config: &DesignConfig) -> Self {
        let mut design = Self::from_snapshot(snapshot);
        design.grid = usable_grid(config.grid_size);
        design
    }

    /// Rebuild a design from a snapshot with a specific catalog.
    ///
    /// Inconsistent parent links and children lists are repaired.
    #[must_use]
    pub fn from_snapshot_with_catalog(snapshot: DesignSnapshot, catalog: Arc<Catalog>) -> Self {
        let canvas = snapshot.canvas;
        let initial_global_states = snapshot.initial_global_states.clone();
        let forest = snapshot.into_forest(&catalog);
        Self {
            forest: Arc::new(forest),
            selected: None,
            canvas,
            initial_global_states,
            grid: GRID_SIZE,
            catalog,
        }
    }

    /// Export the full design as a snapshot.
    #[must_use]
    pub fn export_snapshot(&self) -> DesignSnapshot {
        DesignSnapshot::from_forest(&self.forest, self.canvas, &self.initial_global_states)
    }

    /// Resolve the value-source bindings of the current forest.
    #[must_use]
    pub fn bindings(&self) -> BindingTable {
        BindingTable::resolve(&self.forest, &self.initial_global_states, &self.catalog)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// The widget catalog this design resolves types against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Grid unit.
    #[must_use]
    pub fn grid_size(&self) -> i32 {
        self.grid
    }

    /// Canvas size.
    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Pre-seeded value sources.
    #[must_use]
    pub fn initial_global_states(&self) -> &Props {
        &self.initial_global_states
    }

    /// Currently selected node.
    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// The shared forest. Clone it to keep a snapshot of this version.
    #[must_use]
    pub fn forest(&self) -> &Arc<Forest> {
        &self.forest
    }

    /// Check whether the forest is still the given version.
    #[must_use]
    pub fn forest_ptr_eq(&self, other: &Arc<Forest>) -> bool {
        Arc::ptr_eq(&self.forest, other)
    }

    /// Top-level nodes in document order.
    #[must_use]
    pub fn top_level(&self) -> &[Arc<CanvasNode>] {
        &self.forest
    }

    /// All nodes in pre-order.
    #[must_use]
    pub fn nodes(&self) -> Vec<&CanvasNode> {
        pre_order(&self.forest)
    }

    /// Total number of nodes at any depth.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.forest.iter().map(|n| n.subtree_len()).sum()
    }

    /// Check if the design has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    /// Get a node at any depth.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&CanvasNode> {
        let path = self.locate(id)?;
        node_at(&self.forest, &path)
    }

    /// Get the parent of a node, `None` for top-level or unknown nodes.
    #[must_use]
    pub fn parent_of(&self, id: &NodeId) -> Option<&CanvasNode> {
        let path = self.locate(id)?;
        let (_, parent_path) = path.split_last()?;
        if parent_path.is_empty() {
            return None;
        }
        node_at(&self.forest, parent_path)
    }

    // ---------------------------------------------------------------------
    // Structural edits
    // ---------------------------------------------------------------------

    /// Place a new widget and select it.
    ///
    /// Returns `None` and leaves the design unchanged if the widget type is
    /// unknown or the parent does not exist or is not a container.
    pub fn add_node(
        &mut self,
        widget_type: &str,
        position: Point,
        parent: Option<&NodeId>,
    ) -> Option<NodeId> {
        self.try_add_node(widget_type, position, parent)
            .map_err(|e| tracing::warn!("Ignoring add of {widget_type}: {e}"))
            .ok()
    }

    /// Place a new widget and select it.
    ///
    /// Position and default size are snapped to the grid and the size is
    /// clamped to the widget's minimum. Top-level nodes are stacked above
    /// every existing top-level node; nested nodes get no z value.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::UnknownWidget`], [`WeaverError::ParentNotFound`]
    /// or [`WeaverError::NotAContainer`].
    pub fn try_add_node(
        &mut self,
        widget_type: &str,
        position: Point,
        parent: Option<&NodeId>,
    ) -> WeaverResult<NodeId> {
        let definition = self
            .catalog
            .lookup(widget_type)
            .ok_or_else(|| WeaverError::UnknownWidget(widget_type.to_string()))?;

        let parent_path = match parent {
            Some(parent_id) => {
                let path = self
                    .locate(parent_id)
                    .ok_or_else(|| WeaverError::ParentNotFound(parent_id.to_string()))?;
                let is_container = node_at(&self.forest, &path)
                    .and_then(|p| self.catalog.lookup(&p.widget_type))
                    .is_some_and(|d| d.is_container);
                if !is_container {
                    return Err(WeaverError::NotAContainer(parent_id.to_string()));
                }
                path
            }
            None => Vec::new(),
        };

        let grid = self.grid;
        let (min_width, min_height) = definition.min_size(grid);
        let layout = Layout {
            x: snap_to_grid(position.x, grid),
            y: snap_to_grid(position.y, grid),
            width: snap_to_grid(definition.default_size.width, grid).max(min_width),
            height: snap_to_grid(definition.default_size.height, grid).max(min_height),
            z_index: if parent.is_none() { self.next_z() } else { 0 },
        };

        let id = NodeId::generate(widget_type);
        let node = CanvasNode {
            id: id.clone(),
            widget_type: widget_type.to_string(),
            props: definition.default_props.clone(),
            layout,
            parent_id: parent.cloned(),
            children: definition.is_container.then(Vec::new),
        };

        let siblings = siblings_mut(&mut self.forest, &parent_path)
            .ok_or_else(|| WeaverError::ParentNotFound(format!("{parent_path:?}")))?;
        siblings.push(Arc::new(node));
        self.selected = Some(id.clone());

        tracing::debug!("Added node {id} at ({}, {})", layout.x, layout.y);
        Ok(id)
    }

    /// Merge properties into a node. No-op for unknown ids.
    pub fn update_props(&mut self, id: &NodeId, partial: Props) {
        log_ignored("update_props", self.try_update_props(id, partial));
    }

    /// Merge properties into a node, leaving other properties untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::NodeNotFound`] if the node does not exist.
    pub fn try_update_props(&mut self, id: &NodeId, partial: Props) -> WeaverResult<()> {
        let path = self.locate(id).ok_or_else(|| not_found(id))?;
        let unchanged = node_at(&self.forest, &path)
            .is_some_and(|n| partial.iter().all(|(k, v)| n.props.get(k) == Some(v)));
        if unchanged {
            return Ok(());
        }

        let node = node_at_mut(&mut self.forest, &path).ok_or_else(|| not_found(id))?;
        node.props.extend(partial);
        tracing::debug!("Updated props of {id}");
        Ok(())
    }

    /// Move a node. No-op for unknown ids and stale parent hints.
    pub fn update_position(&mut self, id: &NodeId, position: Point, hint: ParentHint<'_>) {
        log_ignored(
            "update_position",
            self.try_update_position(id, position, hint),
        );
    }

    /// Move a node to a grid-snapped position.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::NodeNotFound`] or [`WeaverError::StaleParent`].
    pub fn try_update_position(
        &mut self,
        id: &NodeId,
        position: Point,
        hint: ParentHint<'_>,
    ) -> WeaverResult<()> {
        let path = self.locate_with_hint(id, hint)?;
        let x = snap_to_grid(position.x, self.grid);
        let y = snap_to_grid(position.y, self.grid);
        if node_at(&self.forest, &path).is_some_and(|n| n.layout.x == x && n.layout.y == y) {
            return Ok(());
        }

        let node = node_at_mut(&mut self.forest, &path).ok_or_else(|| not_found(id))?;
        node.layout.x = x;
        node.layout.y = y;
        tracing::debug!("Moved {id} to ({x}, {y})");
        Ok(())
    }

    /// Resize a node. No-op for unknown ids and stale parent hints.
    pub fn update_size(&mut self, id: &NodeId, width: f32, height: f32, hint: ParentHint<'_>) {
        log_ignored(
            "update_size",
            self.try_update_size(id, width, height, hint),
        );
    }

    /// Resize a node to a grid-snapped size, never below its widget's minimum.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::NodeNotFound`] or [`WeaverError::StaleParent`].
    pub fn try_update_size(
        &mut self,
        id: &NodeId,
        width: f32,
        height: f32,
        hint: ParentHint<'_>,
    ) -> WeaverResult<()> {
        let path = self.locate_with_hint(id, hint)?;
        let grid = self.grid;
        let (min_width, min_height) = node_at(&self.forest, &path)
            .and_then(|n| self.catalog.lookup(&n.widget_type))
            .map_or((grid, grid), |d| d.min_size(grid));
        let width = snap_to_grid(width, grid).max(min_width).max(grid);
        let height = snap_to_grid(height, grid).max(min_height).max(grid);
        if node_at(&self.forest, &path)
            .is_some_and(|n| n.layout.width == width && n.layout.height == height)
        {
            return Ok(());
        }

        let node = node_at_mut(&mut self.forest, &path).ok_or_else(|| not_found(id))?;
        node.layout.width = width;
        node.layout.height = height;
        tracing::debug!("Resized {id} to {width}x{height}");
        Ok(())
    }

    /// Delete a node and its subtree. No-op for unknown ids.
    pub fn delete_node(&mut self, id: &NodeId) {
        log_ignored("delete_node", self.try_delete_node(id));
    }

    /// Delete a node and its whole subtree, wherever it sits.
    ///
    /// Clears the selection if it pointed into the deleted subtree.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::NodeNotFound`] if the node does not exist.
    pub fn try_delete_node(&mut self, id: &NodeId) -> WeaverResult<()> {
        let path = self.locate(id).ok_or_else(|| not_found(id))?;
        let (&index, parent_path) = path.split_last().ok_or_else(|| not_found(id))?;
        let clears_selection = self.selected.as_ref().is_some_and(|selected| {
            node_at(&self.forest, &path).is_some_and(|n| n.contains(selected))
        });

        let siblings = siblings_mut(&mut self.forest, parent_path).ok_or_else(|| not_found(id))?;
        let removed = siblings.remove(index);
        if clears_selection {
            self.selected = None;
        }

        tracing::debug!("Deleted {id} ({} nodes)", removed.subtree_len());
        Ok(())
    }

    /// Select a node, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<&NodeId>) {
        log_ignored("select", self.try_select(id));
    }

    /// Select a node, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::NodeNotFound`] if the node does not exist.
    pub fn try_select(&mut self, id: Option<&NodeId>) -> WeaverResult<()> {
        if let Some(id) = id {
            if self.locate(id).is_none() {
                return Err(not_found(id));
            }
        }
        self.selected = id.cloned();
        Ok(())
    }

    /// Raise a top-level node above all others. No-op for nested or unknown nodes.
    pub fn bring_to_front(&mut self, id: &NodeId) {
        log_ignored("bring_to_front", self.try_bring_to_front(id));
    }

    /// Raise a top-level node above all others.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::NodeNotFound`] or [`WeaverError::NotTopLevel`].
    pub fn try_bring_to_front(&mut self, id: &NodeId) -> WeaverResult<()> {
        let index = self.top_level_index(id)?;
        let zs = arrange::bring_to_front(&self.z_values(), index);
        self.apply_z(&zs);
        tracing::debug!("Brought {id} to front (z={})", zs[index]);
        Ok(())
    }

    /// Lower a top-level node below all others. No-op for nested or unknown nodes.
    pub fn send_to_back(&mut self, id: &NodeId) {
        log_ignored("send_to_back", self.try_send_to_back(id));
    }

    /// Lower a top-level node below all others, shifting siblings if needed.
    ///
    /// # Errors
    ///
    /// Returns [`WeaverError::NodeNotFound`] or [`WeaverError::NotTopLevel`].
    pub fn try_send_to_back(&mut self, id: &NodeId) -> WeaverResult<()> {
        let index = self.top_level_index(id)?;
        let zs = arrange::send_to_back(&self.z_values(), index);
        self.apply_z(&zs);
        tracing::debug!("Sent {id} to back (z={})", zs[index]);
        Ok(())
    }

    /// Set the canvas size.
    pub fn set_canvas_size(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    /// Remove every node and clear the selection.
    pub fn clear(&mut self) {
        if !self.forest.is_empty() {
            self.forest = Arc::new(Forest::new());
        }
        self.selected = None;
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn locate(&self, id: &NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        find_path(&self.forest, id, &mut path).then_some(path)
    }

    fn locate_with_hint(&self, id: &NodeId, hint: ParentHint<'_>) -> WeaverResult<Vec<usize>> {
        let path = self.locate(id).ok_or_else(|| not_found(id))?;
        let expected = match hint {
            ParentHint::Unknown => return Ok(path),
            ParentHint::TopLevel => None,
            ParentHint::Under(parent) => Some(parent),
        };
        let actual = node_at(&self.forest, &path).and_then(|n| n.parent_id.as_ref());
        if actual != expected {
            return Err(WeaverError::StaleParent {
                id: id.to_string(),
                expected: expected.map_or_else(|| "<top level>".to_string(), ToString::to_string),
            });
        }
        Ok(path)
    }

    fn top_level_index(&self, id: &NodeId) -> WeaverResult<usize> {
        match self.locate(id).as_deref() {
            Some(&[index]) => Ok(index),
            Some(_) => Err(WeaverError::NotTopLevel(id.to_string())),
            None => Err(not_found(id)),
        }
    }

    fn z_values(&self) -> Vec<u32> {
        self.forest.iter().map(|n| n.layout.z_index).collect()
    }

    fn next_z(&self) -> u32 {
        self.forest
            .iter()
            .map(|n| n.layout.z_index)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    fn apply_z(&mut self, zs: &[u32]) {
        let changed: Vec<usize> = self
            .forest
            .iter()
            .zip(zs)
            .enumerate()
            .filter(|(_, (node, &z))| node.layout.z_index != z)
            .map(|(i, _)| i)
            .collect();
        if changed.is_empty() {
            return;
        }
        let forest = Arc::make_mut(&mut self.forest);
        for i in changed {
            if let (Some(node), Some(&z)) = (forest.get_mut(i), zs.get(i)) {
                Arc::make_mut(node).layout.z_index = z;
            }
        }
    }
}

fn not_found(id: &NodeId) -> WeaverError {
    WeaverError::NodeNotFound(id.to_string())
}

fn usable_grid(grid: i32) -> i32 {
    if grid > 0 {
        grid
    } else {
        GRID_SIZE
    }
}

fn log_ignored(operation: &str, result: WeaverResult<()>) {
    if let Err(e) = result {
        tracing::warn!("Ignoring {operation}: {e}");
    }
}

fn find_path(nodes: &[Arc<CanvasNode>], id: &NodeId, path: &mut Vec<usize>) -> bool {
    for (i, node) in nodes.iter().enumerate() {
        path.push(i);
        if node.id == *id || find_path(node.children(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn node_at<'a>(forest: &'a [Arc<CanvasNode>], path: &[usize]) -> Option<&'a CanvasNode> {
    let (&first, rest) = path.split_first()?;
    let mut node: &CanvasNode = forest.get(first)?;
    for &i in rest {
        node = node.children().get(i)?;
    }
    Some(node)
}

/// Path-copy down to the node at `path` and return it for editing.
fn node_at_mut<'a>(forest: &'a mut Arc<Forest>, path: &[usize]) -> Option<&'a mut CanvasNode> {
    let (&first, rest) = path.split_first()?;
    let mut node = Arc::make_mut(Arc::make_mut(forest).get_mut(first)?);
    for &i in rest {
        node = Arc::make_mut(node.children.as_mut()?.get_mut(i)?);
    }
    Some(node)
}

/// Path-copy down to the sibling list owned by the node at `parent_path`.
fn siblings_mut<'a>(forest: &'a mut Arc<Forest>, parent_path: &[usize]) -> Option<&'a mut Forest> {
    if parent_path.is_empty() {
        return Some(Arc::make_mut(forest));
    }
    let parent = node_at_mut(forest, parent_path)?;
    Some(parent.children.get_or_insert_with(Vec::new))
}
