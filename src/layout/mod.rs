pub mod junction;
pub mod positioning;

pub use junction::*;
pub use positioning::*;

use crate::description::Vector;
use bitflags::bitflags;
use std::fmt;

/// Options governing render-time layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Spacing of the document grid connections snap to.
    pub grid_size: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self { grid_size: 10.0 }
    }
}

bitflags! {
    /// How a connection point participates in junction decisions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConnectionFlags: u8 {
        /// The point terminates a connection at the component's edge.
        const EDGE = 0b001;
        const HORIZONTAL = 0b010;
        const VERTICAL = 0b100;
    }
}

impl ConnectionFlags {
    /// The orientation bits alone.
    pub fn orientation(self) -> ConnectionFlags {
        self & (ConnectionFlags::HORIZONTAL | ConnectionFlags::VERTICAL)
    }
}

/// A concrete terminal point computed for one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPoint {
    pub location: Vector,
    pub name: String,
    pub flags: ConnectionFlags,
}

impl fmt::Display for ConnectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} [{:?}]", self.name, self.location, self.flags)
    }
}
