use super::diagnostics::{Diagnostic, Severity};
use crate::description::ComponentDescription;
use std::io::{Read, Write};

/// Shared mutable state the pipeline stages work over: one input/output
/// stream pair, the accumulated description, and every diagnostic raised so
/// far. Streams are scoped resources owned by the caller; no stage closes
/// them.
pub struct CompileContext<'a> {
    pub input: &'a mut dyn Read,
    pub output: &'a mut dyn Write,
    pub description: Option<ComponentDescription>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> CompileContext<'a> {
    pub fn new(input: &'a mut dyn Read, output: &'a mut dyn Write) -> Self {
        Self {
            input,
            output,
            description: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Whether all stages so far ran without an Error-severity diagnostic.
    pub fn success(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}
