//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and functions so consumers can
//! bring the core surface in with a single `use`.

// Compilation entry point
pub use crate::pipeline::{CompileOptions, CompileResult, Diagnostic, Severity, compile};

// Condition evaluation
pub use crate::condition::{
    ConditionComparison, ConditionTree, Conditional, EvaluationContext, PropertyValue,
    parse_conditions,
};

// Data model
pub use crate::description::{
    ComponentDescription, ComponentInstance, ComponentPoint, ComponentPosition,
    ConnectionDescription, ConnectionEdge, DescriptionRegistry, DrawingContext, Orientation,
    RecordingContext, RenderCommand, Vector,
};

// Flattening
pub use crate::flatten::{FlattenedComponent, flatten};

// Layout
pub use crate::layout::{
    ConnectionFlags, ConnectionPoint, LayoutOptions, position_connections, should_draw_junction,
};

// Codec
pub use crate::codec::{ArtifactContents, ArtifactWriter, read_artifact};

// Resources
pub use crate::resources::{MemoryResourceProvider, ResourceProvider};

// Error types
pub use crate::error::{CodecError, ConditionError, FlattenError, LayoutError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
