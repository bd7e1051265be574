use super::point::ComponentPoint;
use crate::error::SourceParseError;
use serde::{Deserialize, Serialize};

/// Which ends of a connection terminate at the component's edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionEdge {
    Start,
    End,
    Both,
    #[default]
    None,
}

impl ConnectionEdge {
    pub fn includes_start(self) -> bool {
        matches!(self, ConnectionEdge::Start | ConnectionEdge::Both)
    }

    pub fn includes_end(self) -> bool {
        matches!(self, ConnectionEdge::End | ConnectionEdge::Both)
    }

    pub fn parse(text: &str) -> Result<Self, SourceParseError> {
        Ok(match text {
            "start" => ConnectionEdge::Start,
            "end" => ConnectionEdge::End,
            "both" => ConnectionEdge::Both,
            "none" | "" => ConnectionEdge::None,
            other => return Err(SourceParseError::Edge(other.to_string())),
        })
    }
}

/// One wire run between two points of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDescription<P = ComponentPoint> {
    pub start: P,
    pub end: P,
    pub edge: ConnectionEdge,
    pub name: String,
}

/// Whether a declaration derives its vertical variant from the horizontal
/// geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AutoRotate {
    #[default]
    Off,
    HorizontalToVertical,
}

/// Auto-rotate settings for a group: the mode plus optional reflections of
/// the mirrored geometry along the primary/secondary axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AutoRotateOptions {
    pub mode: AutoRotate,
    pub flip_primary: bool,
    pub flip_secondary: bool,
}

impl AutoRotateOptions {
    pub fn off() -> Self {
        Self::default()
    }

    pub fn horizontal_to_vertical() -> Self {
        Self {
            mode: AutoRotate::HorizontalToVertical,
            flip_primary: false,
            flip_secondary: false,
        }
    }

    pub fn is_enabled(self) -> bool {
        self.mode == AutoRotate::HorizontalToVertical
    }

    /// Parses the `autorotate`/`flip` attribute pair.
    pub fn parse(mode: Option<&str>, flip: Option<&str>) -> Result<Self, SourceParseError> {
        let mode = match mode {
            None | Some("off") => AutoRotate::Off,
            Some("hv") | Some("horizontal-to-vertical") => AutoRotate::HorizontalToVertical,
            Some(other) => return Err(SourceParseError::AutoRotate(other.to_string())),
        };
        let (flip_primary, flip_secondary) = match flip {
            None | Some("none") => (false, false),
            Some("primary") => (true, false),
            Some("secondary") => (false, true),
            Some("both") => (true, true),
            Some(other) => return Err(SourceParseError::AutoRotate(other.to_string())),
        };
        Ok(Self {
            mode,
            flip_primary,
            flip_secondary,
        })
    }
}

/// A conditionally-applicable set of connections declared together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGroup<P = ComponentPoint> {
    pub conditions: crate::condition::ConditionTree,
    pub connections: Vec<ConnectionDescription<P>>,
    pub auto_rotate: AutoRotateOptions,
}
