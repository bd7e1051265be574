use crate::error::SourceParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A 2D vector in component or document space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The same vector with its axes exchanged.
    pub fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A one-dimensional anchor along one axis of a component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComponentPosition {
    /// Offset measured from the instance origin.
    #[default]
    Absolute,
    Start,
    Middle,
    End,
}

impl ComponentPosition {
    fn anchor(self, extent: f64) -> f64 {
        match self {
            ComponentPosition::Absolute | ComponentPosition::Start => 0.0,
            ComponentPosition::Middle => extent / 2.0,
            ComponentPosition::End => extent,
        }
    }

    /// Mirrors the anchor along its axis; `Start` and `End` exchange.
    pub fn flipped(self) -> Self {
        match self {
            ComponentPosition::Start => ComponentPosition::End,
            ComponentPosition::End => ComponentPosition::Start,
            other => other,
        }
    }
}

/// A symbolic anchor + offset in a component's local coordinate space.
///
/// The X and Y axes carry independent anchors, so a point can sit at the
/// middle of the primary axis while hanging off the start of the other.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentPoint {
    pub relative_to_x: ComponentPosition,
    pub relative_to_y: ComponentPosition,
    pub offset: Vector,
}

impl ComponentPoint {
    pub fn new(
        relative_to_x: ComponentPosition,
        relative_to_y: ComponentPosition,
        offset: Vector,
    ) -> Self {
        Self {
            relative_to_x,
            relative_to_y,
            offset,
        }
    }

    /// A point anchored at the same position on both axes.
    pub fn anchored(position: ComponentPosition) -> Self {
        Self::new(position, position, Vector::ZERO)
    }

    /// Resolves the point to an absolute document location for an instance.
    pub fn resolve(&self, instance: &super::ComponentInstance) -> Vector {
        Vector::new(
            instance.location.x + self.relative_to_x.anchor(instance.extent_x()) + self.offset.x,
            instance.location.y + self.relative_to_y.anchor(instance.extent_y()) + self.offset.y,
        )
    }

    /// Parses the point grammar used by the declarative source.
    ///
    /// `_Start`, `_Middle`, `_End` anchor both axes; signed offset terms with
    /// an axis suffix follow (`_Middle-20x+5y`). Without a leading anchor the
    /// offsets are absolute (`30x+10y`).
    pub fn parse(text: &str) -> Result<Self, SourceParseError> {
        let malformed = || SourceParseError::Point(text.to_string());
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(malformed());
        }

        let (anchor, mut rest) = if let Some(r) = trimmed.strip_prefix("_Start") {
            (ComponentPosition::Start, r)
        } else if let Some(r) = trimmed.strip_prefix("_Middle") {
            (ComponentPosition::Middle, r)
        } else if let Some(r) = trimmed.strip_prefix("_End") {
            (ComponentPosition::End, r)
        } else {
            (ComponentPosition::Absolute, trimmed)
        };

        let mut offset = Vector::ZERO;
        while !rest.is_empty() {
            let sign = match rest.as_bytes()[0] {
                b'+' => {
                    rest = &rest[1..];
                    1.0
                }
                b'-' => {
                    rest = &rest[1..];
                    -1.0
                }
                _ if anchor == ComponentPosition::Absolute && offset == Vector::ZERO => 1.0,
                _ => return Err(malformed()),
            };
            let digits = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            if digits == 0 {
                return Err(malformed());
            }
            let value: f64 = rest[..digits].parse().map_err(|_| malformed())?;
            rest = &rest[digits..];
            match rest.as_bytes().first() {
                Some(b'x') => offset.x += sign * value,
                Some(b'y') => offset.y += sign * value,
                _ => return Err(malformed()),
            }
            rest = &rest[1..];
        }

        Ok(Self::new(anchor, anchor, offset))
    }
}

impl fmt::Display for ComponentPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?}{:+}x{:+}y",
            self.relative_to_x, self.relative_to_y, self.offset.x, self.offset.y
        )
    }
}

/// A declarative point whose offsets may be driven by template substitution.
///
/// `template_x`/`template_y` name enumerated properties; flattening expands
/// each into one variant per option, replacing that axis offset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointSeed {
    pub base: ComponentPoint,
    pub template_x: Option<String>,
    pub template_y: Option<String>,
}

impl PointSeed {
    pub fn fixed(base: ComponentPoint) -> Self {
        Self {
            base,
            template_x: None,
            template_y: None,
        }
    }
}

impl From<ComponentPoint> for PointSeed {
    fn from(base: ComponentPoint) -> Self {
        Self::fixed(base)
    }
}
