use super::component::ComponentInstance;
use super::point::{ComponentPoint, Vector};
use crate::condition::EvaluationContext;
use crate::error::{ConditionError, SourceParseError};
use serde::{Deserialize, Serialize};

/// One command of a path's mini-language. Control points are measured
/// relative to the path's start point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo {
        to: Vector,
    },
    LineTo {
        to: Vector,
    },
    QuadTo {
        control: Vector,
        to: Vector,
    },
    CurveTo {
        control1: Vector,
        control2: Vector,
        to: Vector,
    },
    Arc {
        radii: Vector,
        sweep: bool,
        to: Vector,
    },
    Close,
}

/// Parses SVG-style path data: `M x,y L x,y Q cx,cy x,y C c1x,c1y c2x,c2y x,y
/// A rx,ry sweep x,y Z`.
pub fn parse_path_data(data: &str) -> Result<Vec<PathCommand>, SourceParseError> {
    let mut tokens = data.split_whitespace().peekable();
    let mut commands = Vec::new();

    let point = |token: Option<&str>| -> Result<Vector, SourceParseError> {
        let token = token.ok_or_else(|| SourceParseError::Path(data.to_string()))?;
        let (x, y) = token
            .split_once(',')
            .ok_or_else(|| SourceParseError::Path(token.to_string()))?;
        Ok(Vector::new(
            x.parse().map_err(|_| SourceParseError::Path(token.to_string()))?,
            y.parse().map_err(|_| SourceParseError::Path(token.to_string()))?,
        ))
    };

    while let Some(op) = tokens.next() {
        let command = match op {
            "M" => PathCommand::MoveTo {
                to: point(tokens.next())?,
            },
            "L" => PathCommand::LineTo {
                to: point(tokens.next())?,
            },
            "Q" => PathCommand::QuadTo {
                control: point(tokens.next())?,
                to: point(tokens.next())?,
            },
            "C" => PathCommand::CurveTo {
                control1: point(tokens.next())?,
                control2: point(tokens.next())?,
                to: point(tokens.next())?,
            },
            "A" => {
                let radii = point(tokens.next())?;
                let sweep = match tokens.next() {
                    Some("0") => false,
                    Some("1") => true,
                    _ => return Err(SourceParseError::Path(data.to_string())),
                };
                PathCommand::Arc {
                    radii,
                    sweep,
                    to: point(tokens.next())?,
                }
            }
            "Z" => PathCommand::Close,
            other => return Err(SourceParseError::Path(other.to_string())),
        };
        commands.push(command);
    }
    Ok(commands)
}

/// Where a text command anchors its glyph box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextAlignment {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    #[default]
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl TextAlignment {
    pub fn parse(text: &str) -> Result<Self, SourceParseError> {
        Ok(match text {
            "topleft" => TextAlignment::TopLeft,
            "topcenter" => TextAlignment::TopCenter,
            "topright" => TextAlignment::TopRight,
            "centerleft" => TextAlignment::CenterLeft,
            "center" => TextAlignment::Center,
            "centerright" => TextAlignment::CenterRight,
            "bottomleft" => TextAlignment::BottomLeft,
            "bottomcenter" => TextAlignment::BottomCenter,
            "bottomright" => TextAlignment::BottomRight,
            other => return Err(SourceParseError::Alignment(other.to_string())),
        })
    }
}

/// The text a text command draws: a literal, or a property looked up per
/// instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextValue {
    Literal(String),
    Property(String),
}

impl TextValue {
    /// `$Resistance` references a property; anything else is literal text.
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix('$') {
            Some(name) => TextValue::Property(name.to_string()),
            None => TextValue::Literal(text.to_string()),
        }
    }

    fn resolve(&self, ctx: &EvaluationContext) -> Result<String, ConditionError> {
        match self {
            TextValue::Literal(text) => Ok(text.clone()),
            TextValue::Property(name) => ctx
                .property(name)
                .map(|v| v.to_string())
                .ok_or_else(|| ConditionError::UnboundProperty(name.clone())),
        }
    }
}

/// A drawing instruction of the flattened description.
///
/// The set is closed: rendering and mirroring match exhaustively over it, so
/// adding a variant is a compile-enforced, whole-crate change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand<P = ComponentPoint> {
    Line {
        start: P,
        end: P,
        thickness: f64,
    },
    Rectangle {
        top_left: P,
        width: f64,
        height: f64,
        thickness: f64,
        fill: bool,
    },
    Ellipse {
        center: P,
        radius_x: f64,
        radius_y: f64,
        thickness: f64,
        fill: bool,
    },
    Path {
        start: P,
        commands: Vec<PathCommand>,
        thickness: f64,
        fill: bool,
    },
    Text {
        location: P,
        alignment: TextAlignment,
        size: f64,
        value: TextValue,
    },
}

impl RenderCommand<ComponentPoint> {
    /// Draws the command for one instance, with every point resolved to
    /// absolute coordinates.
    pub fn render(
        &self,
        instance: &ComponentInstance,
        ctx: &EvaluationContext,
        out: &mut dyn DrawingContext,
    ) -> Result<(), ConditionError> {
        match self {
            RenderCommand::Line {
                start,
                end,
                thickness,
            } => out.line(start.resolve(instance), end.resolve(instance), *thickness),
            RenderCommand::Rectangle {
                top_left,
                width,
                height,
                thickness,
                fill,
            } => out.rectangle(
                top_left.resolve(instance),
                *width,
                *height,
                *thickness,
                *fill,
            ),
            RenderCommand::Ellipse {
                center,
                radius_x,
                radius_y,
                thickness,
                fill,
            } => out.ellipse(
                center.resolve(instance),
                *radius_x,
                *radius_y,
                *thickness,
                *fill,
            ),
            RenderCommand::Path {
                start,
                commands,
                thickness,
                fill,
            } => out.path(start.resolve(instance), commands, *thickness, *fill),
            RenderCommand::Text {
                location,
                alignment,
                size,
                value,
            } => {
                let text = value.resolve(ctx)?;
                out.text(location.resolve(instance), *alignment, *size, &text);
            }
        }
        Ok(())
    }
}

/// The capability a drawing backend provides. Implementations rasterise or
/// serialise; the engine only ever hands them absolute coordinates.
pub trait DrawingContext {
    fn line(&mut self, start: Vector, end: Vector, thickness: f64);
    fn rectangle(&mut self, top_left: Vector, width: f64, height: f64, thickness: f64, fill: bool);
    fn ellipse(
        &mut self,
        center: Vector,
        radius_x: f64,
        radius_y: f64,
        thickness: f64,
        fill: bool,
    );
    fn path(&mut self, start: Vector, commands: &[PathCommand], thickness: f64, fill: bool);
    fn text(&mut self, location: Vector, alignment: TextAlignment, size: f64, text: &str);
}

/// A recorded drawing operation, for assertions and tooling.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        start: Vector,
        end: Vector,
        thickness: f64,
    },
    Rectangle {
        top_left: Vector,
        width: f64,
        height: f64,
        thickness: f64,
        fill: bool,
    },
    Ellipse {
        center: Vector,
        radius_x: f64,
        radius_y: f64,
        thickness: f64,
        fill: bool,
    },
    Path {
        start: Vector,
        commands: Vec<PathCommand>,
        thickness: f64,
        fill: bool,
    },
    Text {
        location: Vector,
        alignment: TextAlignment,
        size: f64,
        text: String,
    },
}

/// A `DrawingContext` that records operations instead of drawing them.
#[derive(Debug, Default)]
pub struct RecordingContext {
    pub ops: Vec<DrawOp>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawingContext for RecordingContext {
    fn line(&mut self, start: Vector, end: Vector, thickness: f64) {
        self.ops.push(DrawOp::Line {
            start,
            end,
            thickness,
        });
    }

    fn rectangle(&mut self, top_left: Vector, width: f64, height: f64, thickness: f64, fill: bool) {
        self.ops.push(DrawOp::Rectangle {
            top_left,
            width,
            height,
            thickness,
            fill,
        });
    }

    fn ellipse(&mut self, center: Vector, radius_x: f64, radius_y: f64, thickness: f64, fill: bool) {
        self.ops.push(DrawOp::Ellipse {
            center,
            radius_x,
            radius_y,
            thickness,
            fill,
        });
    }

    fn path(&mut self, start: Vector, commands: &[PathCommand], thickness: f64, fill: bool) {
        self.ops.push(DrawOp::Path {
            start,
            commands: commands.to_vec(),
            thickness,
            fill,
        });
    }

    fn text(&mut self, location: Vector, alignment: TextAlignment, size: f64, text: &str) {
        self.ops.push(DrawOp::Text {
            location,
            alignment,
            size,
            text: text.to_string(),
        });
    }
}
