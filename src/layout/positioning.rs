use super::{ConnectionFlags, ConnectionPoint, LayoutOptions};
use crate::description::{ComponentDescription, ComponentInstance};
use crate::error::LayoutError;
use crate::flatten;

const STEP_EPSILON: f64 = 1e-9;

/// Computes the ordered terminal points of one instance.
///
/// For every connection group whose condition holds under the instance's
/// bindings, the start and end points are resolved to absolute coordinates.
/// An edge point is emitted at the start when the edge setting includes it,
/// interior points follow at each grid step strictly inside the span, and an
/// edge point at the end closes the run. Output order is declaration order;
/// the function is deterministic for identical inputs.
pub fn position_connections(
    instance: &ComponentInstance,
    description: &ComponentDescription,
    options: &LayoutOptions,
) -> Result<Vec<ConnectionPoint>, LayoutError> {
    let flattened = flatten::flatten(description)?;
    let ctx = instance.evaluation_context(description);

    let mut points = Vec::new();
    for connection in flattened.active_connections(&ctx)? {
        let start = connection.start.resolve(instance);
        let end = connection.end.resolve(instance);

        let delta = end - start;
        let horizontal = delta.x.abs() >= delta.y.abs();
        let orientation = if horizontal {
            ConnectionFlags::HORIZONTAL
        } else {
            ConnectionFlags::VERTICAL
        };
        let span = delta.x.abs().max(delta.y.abs());
        let (dir_x, dir_y) = if span == 0.0 {
            (0.0, 0.0)
        } else if horizontal {
            (delta.x.signum(), 0.0)
        } else {
            (0.0, delta.y.signum())
        };

        if connection.edge.includes_start() {
            points.push(ConnectionPoint {
                location: start,
                name: connection.name.clone(),
                flags: ConnectionFlags::EDGE | orientation,
            });
        }

        // Interior grid steps, strictly exclusive of both endpoints. The
        // start is covered by its edge point; an exact-multiple span leaves
        // its far end to the End edge point alone.
        let mut offset = options.grid_size;
        while offset < span - STEP_EPSILON {
            let location = crate::description::Vector::new(
                start.x + dir_x * offset,
                start.y + dir_y * offset,
            );
            let already_edge = points
                .iter()
                .any(|p| p.flags.contains(ConnectionFlags::EDGE) && p.location == location);
            if !already_edge {
                points.push(ConnectionPoint {
                    location,
                    name: connection.name.clone(),
                    flags: orientation,
                });
            }
            offset += options.grid_size;
        }

        if connection.edge.includes_end() {
            points.push(ConnectionPoint {
                location: end,
                name: connection.name.clone(),
                flags: ConnectionFlags::EDGE | orientation,
            });
        }
    }
    Ok(points)
}
