//! # Kairo - Component Description Compilation Engine
//!
//! **Kairo** compiles declarative, conditionally-varying circuit symbol
//! descriptions into render-ready flattened geometry and compact, optionally
//! signed binary artifacts. A component is authored once as a namespaced XML
//! document; the engine expands its conditional and templated declarations,
//! derives vertical orientation variants from the horizontal geometry, and
//! packages the result for distribution.
//!
//! ## Core Workflow
//!
//! 1.  **Load**: parse the declarative source into a canonical
//!     [`ComponentDescription`](description::ComponentDescription).
//! 2.  **Flatten**: expand the conditional, templated declaration tree into
//!     condition-tagged concrete render commands and connections, per placed
//!     instance.
//! 3.  **Render / position**: evaluate conditions against an instance's
//!     bindings, resolve symbolic points, and hand absolute geometry to a
//!     [`DrawingContext`](description::DrawingContext) or compute its
//!     terminal points.
//! 4.  **Compile**: run the full [`pipeline`] (Load, SetIcons, Emit) to
//!     produce a `.cdcom` binary artifact, optionally signed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let source = std::fs::read_to_string("wire.xml")?;
//!     let mut input = source.as_bytes();
//!     let mut output = Vec::new();
//!
//!     let provider = MemoryResourceProvider::new();
//!     let mut registry = DescriptionRegistry::new();
//!     let result = compile(
//!         &mut input,
//!         &mut output,
//!         &provider,
//!         &CompileOptions::default(),
//!         &mut registry,
//!         None,
//!     );
//!
//!     for diagnostic in &result.diagnostics {
//!         eprintln!("{diagnostic}");
//!     }
//!     if result.success {
//!         println!(
//!             "Compiled {} ({} bytes)",
//!             result.component_name.unwrap_or_default(),
//!             output.len()
//!         );
//!         std::fs::write("wire.cdcom", &output)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod condition;
pub mod description;
pub mod error;
pub mod flatten;
pub mod layout;
pub mod pipeline;
pub mod prelude;
pub mod resources;
