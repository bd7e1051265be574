use crate::description::{
    AutoRotateOptions, ComponentPoint, ConnectionDescription, PathCommand, RenderCommand, Vector,
};

/// The geometric transform applied during an auto-rotate flattening pass:
/// an optional axis mirror (X/Y swap) composed with per-axis reflections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipTransform {
    pub mirror: bool,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl FlipTransform {
    pub const IDENTITY: FlipTransform = FlipTransform {
        mirror: false,
        flip_x: false,
        flip_y: false,
    };

    /// The vertical-pass transform for a group's auto-rotate settings. The
    /// primary flip reflects the mirrored X axis, the secondary the Y axis.
    pub fn auto_rotate(options: AutoRotateOptions) -> Self {
        Self {
            mirror: true,
            flip_x: options.flip_primary,
            flip_y: options.flip_secondary,
        }
    }

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    /// Transforms a symbolic point. Reflected axes exchange their
    /// `Start`/`End` anchors and negate their offsets.
    pub fn point(self, point: ComponentPoint) -> ComponentPoint {
        let mut point = if self.mirror {
            ComponentPoint::new(
                point.relative_to_y,
                point.relative_to_x,
                point.offset.swapped(),
            )
        } else {
            point
        };
        if self.flip_x {
            point.relative_to_x = point.relative_to_x.flipped();
            point.offset.x = -point.offset.x;
        }
        if self.flip_y {
            point.relative_to_y = point.relative_to_y.flipped();
            point.offset.y = -point.offset.y;
        }
        point
    }

    /// Transforms a plain vector (path control points).
    pub fn vector(self, v: Vector) -> Vector {
        let mut v = if self.mirror { v.swapped() } else { v };
        if self.flip_x {
            v.x = -v.x;
        }
        if self.flip_y {
            v.y = -v.y;
        }
        v
    }

    fn extents(self, width: f64, height: f64) -> (f64, f64) {
        if self.mirror {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Whether the transform reverses winding; odd numbers of reflections do.
    fn reverses_winding(self) -> bool {
        (self.mirror as u8 + self.flip_x as u8 + self.flip_y as u8) % 2 == 1
    }

    /// Applies each path command's own flip rule.
    pub fn path_command(self, command: PathCommand) -> PathCommand {
        match command {
            PathCommand::MoveTo { to } => PathCommand::MoveTo {
                to: self.vector(to),
            },
            PathCommand::LineTo { to } => PathCommand::LineTo {
                to: self.vector(to),
            },
            PathCommand::QuadTo { control, to } => PathCommand::QuadTo {
                control: self.vector(control),
                to: self.vector(to),
            },
            PathCommand::CurveTo {
                control1,
                control2,
                to,
            } => PathCommand::CurveTo {
                control1: self.vector(control1),
                control2: self.vector(control2),
                to: self.vector(to),
            },
            PathCommand::Arc { radii, sweep, to } => PathCommand::Arc {
                // Radii are unsigned lengths: the mirror exchanges them, the
                // reflections leave them alone.
                radii: if self.mirror { radii.swapped() } else { radii },
                sweep: sweep ^ self.reverses_winding(),
                to: self.vector(to),
            },
            PathCommand::Close => PathCommand::Close,
        }
    }

    /// Transforms a flattened render command, exhaustively per variant.
    pub fn command(self, command: &RenderCommand) -> RenderCommand {
        if self.is_identity() {
            return command.clone();
        }
        match command {
            RenderCommand::Line {
                start,
                end,
                thickness,
            } => RenderCommand::Line {
                start: self.point(*start),
                end: self.point(*end),
                thickness: *thickness,
            },
            RenderCommand::Rectangle {
                top_left,
                width,
                height,
                thickness,
                fill,
            } => {
                let (width, height) = self.extents(*width, *height);
                let mut top_left = self.point(*top_left);
                // Reflections move the anchored corner across the box; shift
                // it back so the point still names the top-left corner.
                if self.flip_x {
                    top_left.offset.x -= width;
                }
                if self.flip_y {
                    top_left.offset.y -= height;
                }
                RenderCommand::Rectangle {
                    top_left,
                    width,
                    height,
                    thickness: *thickness,
                    fill: *fill,
                }
            }
            RenderCommand::Ellipse {
                center,
                radius_x,
                radius_y,
                thickness,
                fill,
            } => {
                let (radius_x, radius_y) = self.extents(*radius_x, *radius_y);
                RenderCommand::Ellipse {
                    center: self.point(*center),
                    radius_x,
                    radius_y,
                    thickness: *thickness,
                    fill: *fill,
                }
            }
            RenderCommand::Path {
                start,
                commands,
                thickness,
                fill,
            } => RenderCommand::Path {
                start: self.point(*start),
                commands: commands.iter().map(|c| self.path_command(*c)).collect(),
                thickness: *thickness,
                fill: *fill,
            },
            RenderCommand::Text {
                location,
                alignment,
                size,
                value,
            } => RenderCommand::Text {
                location: self.point(*location),
                alignment: *alignment,
                size: *size,
                value: value.clone(),
            },
        }
    }

    /// Transforms a flattened connection; edge settings travel with their
    /// endpoints untouched.
    pub fn connection(self, connection: &ConnectionDescription) -> ConnectionDescription {
        ConnectionDescription {
            start: self.point(connection.start),
            end: self.point(connection.end),
            edge: connection.edge,
            name: connection.name.clone(),
        }
    }
}
