//! The compiler pipeline.
//!
//! Compilation runs fixed-order stages over a shared context: Load parses
//! the declarative source, SetIcons attaches icon resources, Emit encodes
//! (and optionally signs) the artifact. A Load that produces no description
//! skips the later stages. Success means zero Error-severity diagnostics
//! across the stages that ran.

pub mod context;
pub mod diagnostics;

mod emit;
mod icons;
mod load;

pub use context::CompileContext;
pub use diagnostics::{Diagnostic, Severity, SourcePosition, SourceRange};
pub use icons::ICON_RESOLUTIONS;
pub use load::COMPONENT_NAMESPACE;

use crate::codec::KeyStore;
use crate::description::DescriptionRegistry;
use crate::resources::ResourceProvider;
use std::io::{Read, Write};

/// Options recognised by the compile entry point.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Embed author/version metadata in the artifact.
    pub write_extended_metadata: bool,
    /// Sign the artifact with the certificate matching this thumbprint.
    pub certificate_thumbprint: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            write_extended_metadata: true,
            certificate_thumbprint: None,
        }
    }
}

/// The outcome of one compilation.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub success: bool,
    pub component_name: Option<String>,
    pub guid: Option<String>,
    pub author: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles one declarative source into one binary artifact.
///
/// The caller owns both streams and the registry; independent compilations
/// share no mutable state and may run in parallel, one registry and stream
/// pair each.
pub fn compile(
    input: &mut dyn Read,
    output: &mut dyn Write,
    resources: &dyn ResourceProvider,
    options: &CompileOptions,
    registry: &mut DescriptionRegistry,
    key_store: Option<&dyn KeyStore>,
) -> CompileResult {
    let sections = load::SectionRegistry::with_default_sections();
    let mut ctx = CompileContext::new(input, output);

    tracing::debug!(stage = "load", "pipeline stage starting");
    load::run(&mut ctx, registry, &sections);

    if ctx.description.is_some() {
        tracing::debug!(stage = "set-icons", "pipeline stage starting");
        icons::run(&mut ctx, resources);

        tracing::debug!(stage = "emit", "pipeline stage starting");
        emit::run(&mut ctx, options, key_store);
    } else {
        tracing::warn!("load produced no description; skipping later stages");
    }

    let success = ctx.success() && ctx.description.is_some();
    let (component_name, guid, author) = match &ctx.description {
        Some(description) => (
            Some(description.name.clone()),
            Some(description.metadata.guid.clone()),
            Some(description.metadata.author.clone()),
        ),
        None => (None, None, None),
    };

    CompileResult {
        success,
        component_name,
        guid,
        author,
        diagnostics: ctx.diagnostics,
    }
}
