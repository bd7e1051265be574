//! The flattening engine.
//!
//! Flattening expands a conditional, templated declarative tree into a flat
//! list of condition-tagged concrete values. Group conditions AND down the
//! tree; templated offsets expand into one variant per enumerated property
//! option; a node with several independently-conditional children yields the
//! cartesian product of its children's variants. Auto-rotated groups are
//! flattened twice, deriving the vertical geometry from the horizontal
//! declaration by mirroring.
//!
//! No satisfiability pruning happens here: a contradictory AND combination
//! is emitted and simply never evaluates true.

mod transform;

pub use transform::FlipTransform;

use crate::condition::{
    ConditionTree, ConditionTreeLeaf, Conditional, EvaluationContext, PropertyValue,
};
use crate::description::{
    ComponentDescription, ComponentInstance, ComponentPoint, ConnectionDescription,
    ConnectionGroup, DrawingContext, PointSeed, RenderCommand, RenderGroup,
};
use crate::error::{ConditionError, FlattenError};
use itertools::Itertools;

/// The derived-boolean state driving orientation-dependent variants.
pub const HORIZONTAL_STATE: &str = "horizontal";

/// A component description with every conditional and template expanded.
#[derive(Debug, Clone, Default)]
pub struct FlattenedComponent {
    pub commands: Vec<Conditional<RenderCommand>>,
    pub connections: Vec<Conditional<Vec<ConnectionDescription>>>,
}

impl FlattenedComponent {
    /// Draws the commands whose conditions hold for this instance.
    pub fn render(
        &self,
        description: &ComponentDescription,
        instance: &ComponentInstance,
        out: &mut dyn DrawingContext,
    ) -> Result<(), ConditionError> {
        let ctx = instance.evaluation_context(description);
        for command in &self.commands {
            if command.conditions.evaluate(&ctx)? {
                command.value.render(instance, &ctx, out)?;
            }
        }
        Ok(())
    }

    /// The connections that apply under the given bindings, in declaration
    /// order.
    pub fn active_connections(
        &self,
        ctx: &EvaluationContext,
    ) -> Result<Vec<&ConnectionDescription>, ConditionError> {
        let mut active = Vec::new();
        for group in &self.connections {
            if group.conditions.evaluate(ctx)? {
                active.extend(group.value.iter());
            }
        }
        Ok(active)
    }
}

/// Expands a description into its flattened render commands and connection
/// groups.
///
/// The result is instance-independent but recomputed per instance by the
/// callers that render or position connections; it is never cached across
/// differing bindings.
pub fn flatten(description: &ComponentDescription) -> Result<FlattenedComponent, FlattenError> {
    let mut out = FlattenedComponent::default();
    for group in &description.render {
        flatten_render_group(description, group, &ConditionTree::Empty, &mut out)?;
    }
    for group in &description.connections {
        flatten_connection_group(description, group, &mut out)?;
    }
    Ok(out)
}

fn horizontal_state(truthy: bool) -> ConditionTree {
    ConditionTree::Leaf(ConditionTreeLeaf::state(HORIZONTAL_STATE, truthy))
}

fn flatten_render_group(
    description: &ComponentDescription,
    group: &RenderGroup,
    parent: &ConditionTree,
    out: &mut FlattenedComponent,
) -> Result<(), FlattenError> {
    if group.auto_rotate.is_enabled() {
        let horizontal = ConditionTree::and(parent.clone(), horizontal_state(true));
        render_group_pass(description, group, &horizontal, FlipTransform::IDENTITY, out)?;
        let vertical = ConditionTree::and(parent.clone(), horizontal_state(false));
        render_group_pass(
            description,
            group,
            &vertical,
            FlipTransform::auto_rotate(group.auto_rotate),
            out,
        )
    } else {
        render_group_pass(description, group, parent, FlipTransform::IDENTITY, out)
    }
}

fn render_group_pass(
    description: &ComponentDescription,
    group: &RenderGroup,
    parent: &ConditionTree,
    transform: FlipTransform,
    out: &mut FlattenedComponent,
) -> Result<(), FlattenError> {
    let conditions = ConditionTree::and(parent.clone(), group.conditions.clone());
    for command in &group.commands {
        for expanded in expand_command(description, command)? {
            out.commands.push(Conditional::new(
                transform.command(&expanded.value),
                ConditionTree::and(conditions.clone(), expanded.conditions).simplify(),
            ));
        }
    }
    // Nested groups inherit the pass transform; the loader rejects nested
    // auto-rotate declarations.
    for child in &group.children {
        render_group_pass(description, child, &conditions, transform, out)?;
    }
    Ok(())
}

fn flatten_connection_group(
    description: &ComponentDescription,
    group: &ConnectionGroup<PointSeed>,
    out: &mut FlattenedComponent,
) -> Result<(), FlattenError> {
    if group.auto_rotate.is_enabled() {
        connection_group_pass(
            description,
            group,
            &horizontal_state(true),
            FlipTransform::IDENTITY,
            out,
        )?;
        connection_group_pass(
            description,
            group,
            &horizontal_state(false),
            FlipTransform::auto_rotate(group.auto_rotate),
            out,
        )
    } else {
        connection_group_pass(
            description,
            group,
            &ConditionTree::Empty,
            FlipTransform::IDENTITY,
            out,
        )
    }
}

fn connection_group_pass(
    description: &ComponentDescription,
    group: &ConnectionGroup<PointSeed>,
    parent: &ConditionTree,
    transform: FlipTransform,
    out: &mut FlattenedComponent,
) -> Result<(), FlattenError> {
    let conditions = ConditionTree::and(parent.clone(), group.conditions.clone());

    // Every endpoint of the group is one conditional child; the group is one
    // declarative unit, so the product spans them all.
    let mut seeds = Vec::with_capacity(group.connections.len() * 2);
    for connection in &group.connections {
        seeds.push(&connection.start);
        seeds.push(&connection.end);
    }
    if seeds.is_empty() {
        return Ok(());
    }

    for expanded in expand_points(description, &seeds)? {
        let points = expanded.value;
        let list: Vec<ConnectionDescription> = group
            .connections
            .iter()
            .enumerate()
            .map(|(i, connection)| {
                transform.connection(&ConnectionDescription {
                    start: points[i * 2],
                    end: points[i * 2 + 1],
                    edge: connection.edge,
                    name: connection.name.clone(),
                })
            })
            .collect();
        out.connections.push(Conditional::new(
            list,
            ConditionTree::and(conditions.clone(), expanded.conditions).simplify(),
        ));
    }
    Ok(())
}

fn expand_command(
    description: &ComponentDescription,
    command: &RenderCommand<PointSeed>,
) -> Result<Vec<Conditional<RenderCommand>>, FlattenError> {
    Ok(match command {
        RenderCommand::Line {
            start,
            end,
            thickness,
        } => expand_points(description, &[start, end])?
            .into_iter()
            .map(|c| {
                c.map(|points| RenderCommand::Line {
                    start: points[0],
                    end: points[1],
                    thickness: *thickness,
                })
            })
            .collect(),
        RenderCommand::Rectangle {
            top_left,
            width,
            height,
            thickness,
            fill,
        } => expand_points(description, &[top_left])?
            .into_iter()
            .map(|c| {
                c.map(|points| RenderCommand::Rectangle {
                    top_left: points[0],
                    width: *width,
                    height: *height,
                    thickness: *thickness,
                    fill: *fill,
                })
            })
            .collect(),
        RenderCommand::Ellipse {
            center,
            radius_x,
            radius_y,
            thickness,
            fill,
        } => expand_points(description, &[center])?
            .into_iter()
            .map(|c| {
                c.map(|points| RenderCommand::Ellipse {
                    center: points[0],
                    radius_x: *radius_x,
                    radius_y: *radius_y,
                    thickness: *thickness,
                    fill: *fill,
                })
            })
            .collect(),
        RenderCommand::Path {
            start,
            commands,
            thickness,
            fill,
        } => expand_points(description, &[start])?
            .into_iter()
            .map(|c| {
                c.map(|points| RenderCommand::Path {
                    start: points[0],
                    commands: commands.clone(),
                    thickness: *thickness,
                    fill: *fill,
                })
            })
            .collect(),
        RenderCommand::Text {
            location,
            alignment,
            size,
            value,
        } => expand_points(description, &[location])?
            .into_iter()
            .map(|c| {
                c.map(|points| RenderCommand::Text {
                    location: points[0],
                    alignment: *alignment,
                    size: *size,
                    value: value.clone(),
                })
            })
            .collect(),
    })
}

/// Expands each seed independently and takes the cartesian product, ANDing
/// conditions per combination.
fn expand_points(
    description: &ComponentDescription,
    seeds: &[&PointSeed],
) -> Result<Vec<Conditional<Vec<ComponentPoint>>>, FlattenError> {
    let variants: Vec<Vec<Conditional<ComponentPoint>>> = seeds
        .iter()
        .map(|seed| expand_point(description, seed))
        .collect::<Result<_, _>>()?;

    Ok(variants
        .into_iter()
        .multi_cartesian_product()
        .map(|combination| {
            let conditions = combination.iter().fold(ConditionTree::Empty, |acc, c| {
                ConditionTree::and(acc, c.conditions.clone())
            });
            Conditional::new(
                combination.into_iter().map(|c| c.value).collect(),
                conditions,
            )
        })
        .collect())
}

fn expand_point(
    description: &ComponentDescription,
    seed: &PointSeed,
) -> Result<Vec<Conditional<ComponentPoint>>, FlattenError> {
    let xs = expand_axis(description, seed.base.offset.x, seed.template_x.as_deref())?;
    let ys = expand_axis(description, seed.base.offset.y, seed.template_y.as_deref())?;

    let mut points = Vec::with_capacity(xs.len() * ys.len());
    for x in &xs {
        for y in &ys {
            let mut point = seed.base;
            point.offset.x = x.value;
            point.offset.y = y.value;
            points.push(Conditional::new(
                point,
                ConditionTree::and(x.conditions.clone(), y.conditions.clone()),
            ));
        }
    }
    Ok(points)
}

/// One axis offset: either the fixed value, or one variant per option of the
/// named enumerated property.
fn expand_axis(
    description: &ComponentDescription,
    fixed: f64,
    template: Option<&str>,
) -> Result<Vec<Conditional<f64>>, FlattenError> {
    let Some(name) = template else {
        return Ok(vec![Conditional::unconditional(fixed)]);
    };

    let property =
        description
            .property(name)
            .ok_or_else(|| FlattenError::UnknownTemplateProperty {
                property: name.to_string(),
            })?;
    let options = property
        .options
        .as_ref()
        .ok_or_else(|| FlattenError::TemplateNotEnumerated {
            property: name.to_string(),
        })?;

    options
        .iter()
        .map(|option| match option {
            PropertyValue::Number(value) => Ok(Conditional::new(
                *value,
                ConditionTree::Leaf(ConditionTreeLeaf::property_equals(name, option.clone())),
            )),
            other => Err(FlattenError::TemplateOptionNotNumeric {
                property: name.to_string(),
                value: other.clone(),
            }),
        })
        .collect()
}
