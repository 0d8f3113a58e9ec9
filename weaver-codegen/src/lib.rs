//! # Weaver Codegen
//!
//! Turns a Weaver design into the source text of one self-contained React
//! component: sorted imports, `useState` declarations for every value source,
//! stubs for local actions, and an absolutely positioned markup tree.
//!
//! ## Example
//!
//! ```
//! use weaver_core::{Design, Point};
//! use weaver_codegen::Synthesizer;
//!
//! let mut design = Design::new();
//! design.add_node("button", Point::new(20.0, 20.0), None);
//!
//! let source = Synthesizer::with_defaults().synthesize_design(&design);
//! assert!(source.contains("import { Button } from '@/components/ui/button';"));
//! assert!(source.contains("export default function MyDesignedComponent() {"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod emit;
pub mod imports;
pub mod jsx;
pub mod strategy;
pub mod synthesis;

pub use imports::{collect, ActionNames, Collected, ImportSet, REACT_IMPORT};
pub use strategy::Strategy;
pub use synthesis::{SynthesisConfig, Synthesizer};
