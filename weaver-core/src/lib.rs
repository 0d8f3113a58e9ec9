//! # Weaver Core
//!
//! The model behind a visual UI designer: a catalog of placeable widgets, a
//! persistent tree of placed nodes, stacking order, and value-source
//! bindings shared between widgets.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 weaver-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Catalog         │  Design (tree store)     │
//! │  - Widget types  │  - Add / move / resize   │
//! │  - Prop schemas  │  - Delete / select       │
//! │  - Min sizes     │  - Stacking order        │
//! ├─────────────────────────────────────────────┤
//! │  Bindings        │  Runtime                 │
//! │  - Value sources │  - Shared state slots    │
//! │  - Setter names  │  - Action registry       │
//! ├─────────────────────────────────────────────┤
//! │  Snapshot (JSON) │  DesignStore (sessions)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use weaver_core::{Design, Point};
//!
//! let mut design = Design::new();
//! let card = design.add_node("card", Point::new(40.0, 40.0), None).unwrap();
//! let text = design.add_node("text", Point::new(20.0, 20.0), Some(&card)).unwrap();
//!
//! assert_eq!(design.parent_of(&text).map(|p| &p.id), Some(&card));
//! assert_eq!(design.node_count(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arrange;
pub mod binding;
pub mod catalog;
pub mod config;
pub mod error;
pub mod node;
pub mod runtime;
pub mod snapshot;
pub mod store;
pub mod tree;

pub use arrange::stacking_order;
pub use binding::{Binding, BindingTable};
pub use catalog::{
    BindingKind, Catalog, CustomWidget, PropDef, PropKind, Props, Size, WidgetDefinition,
    WidgetKind, GRID_SIZE, TRIGGER_PROP, VALUE_SOURCE_PROP,
};
pub use config::DesignConfig;
pub use error::{WeaverError, WeaverResult};
pub use node::{pre_order, snap_to_grid, CanvasNode, CanvasSize, Layout, NodeId, Point};
pub use runtime::{ActionRef, ActionRegistry, AvailableSetters, SharedState};
pub use snapshot::{DesignSnapshot, NodeDocument};
pub use store::DesignStore;
pub use tree::{Design, Forest, ParentHint};

/// Channel name under which the palette's drag payload carries a widget type id.
pub const DRAG_PAYLOAD_CHANNEL: &str = "application/react-weaver-component";

/// Weaver core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
