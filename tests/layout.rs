//! Tests for connection positioning and junction visualization.
mod common;
use common::*;
use kairo::condition::ConditionTree;
use kairo::description::*;
use kairo::layout::{
    ConnectionFlags, LayoutOptions, position_connections, should_draw_junction,
};

#[test]
fn test_positioning_worked_example() {
    // 100-unit horizontal component, `_Start` -> `_Start+45x`, edge=Start,
    // grid 10: exactly five points.
    let description = worked_example_description();
    let instance = horizontal_instance(100.0);
    let options = LayoutOptions { grid_size: 10.0 };

    let points = position_connections(&instance, &description, &options).unwrap();

    assert_eq!(points.len(), 5);
    assert_eq!(points[0].location, Vector::new(0.0, 0.0));
    assert_eq!(
        points[0].flags,
        ConnectionFlags::EDGE | ConnectionFlags::HORIZONTAL
    );
    for (i, x) in [10.0, 20.0, 30.0, 40.0].into_iter().enumerate() {
        assert_eq!(points[i + 1].location, Vector::new(x, 0.0));
        assert_eq!(points[i + 1].flags, ConnectionFlags::HORIZONTAL);
    }
}

#[test]
fn test_positioning_is_deterministic() {
    let description = resistor_description();
    let instance = horizontal_instance(80.0);
    let options = LayoutOptions::default();

    let first = position_connections(&instance, &description, &options).unwrap();
    let second = position_connections(&instance, &description, &options).unwrap();
    assert_eq!(first, second);
}

fn span_description(end_offset: f64, edge: ConnectionEdge) -> ComponentDescription {
    let mut description = ComponentDescription::new(0, "Span");
    description.connections.push(ConnectionGroup {
        conditions: ConditionTree::Empty,
        connections: vec![ConnectionDescription {
            start: PointSeed::fixed(ComponentPoint::anchored(ComponentPosition::Start)),
            end: PointSeed::fixed(ComponentPoint::new(
                ComponentPosition::Start,
                ComponentPosition::Start,
                Vector::new(end_offset, 0.0),
            )),
            edge,
            name: "s".to_string(),
        }],
        auto_rotate: AutoRotateOptions::off(),
    });
    description
}

#[test]
fn test_exact_multiple_span_excludes_far_end() {
    // A 40-unit span at grid 10 stops the interior walk at 30; the far end
    // only appears as an edge point when the edge setting includes it.
    let instance = horizontal_instance(100.0);
    let options = LayoutOptions { grid_size: 10.0 };

    let start_only =
        position_connections(&instance, &span_description(40.0, ConnectionEdge::Start), &options)
            .unwrap();
    let offsets: Vec<f64> = start_only.iter().map(|p| p.location.x).collect();
    assert_eq!(offsets, vec![0.0, 10.0, 20.0, 30.0]);

    let both =
        position_connections(&instance, &span_description(40.0, ConnectionEdge::Both), &options)
            .unwrap();
    let offsets: Vec<f64> = both.iter().map(|p| p.location.x).collect();
    assert_eq!(offsets, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    assert!(both.last().unwrap().flags.contains(ConnectionFlags::EDGE));
}

#[test]
fn test_vertical_instance_positions_along_y() {
    let description = resistor_description();
    let instance = vertical_instance(40.0);
    let options = LayoutOptions { grid_size: 10.0 };

    let points = position_connections(&instance, &description, &options).unwrap();
    assert!(!points.is_empty());
    assert!(points.iter().all(|p| p.location.x == 0.0));
    assert!(
        points
            .iter()
            .all(|p| p.flags.orientation() == ConnectionFlags::VERTICAL)
    );
    assert_eq!(points.first().unwrap().location, Vector::new(0.0, 0.0));
    assert_eq!(points.last().unwrap().location, Vector::new(0.0, 40.0));
}

const EV: ConnectionFlags = ConnectionFlags::EDGE.union(ConnectionFlags::VERTICAL);
const EH: ConnectionFlags = ConnectionFlags::EDGE.union(ConnectionFlags::HORIZONTAL);

#[test]
fn test_junction_rule_truth_table() {
    // A terminal into a crossing line of the other orientation.
    assert!(should_draw_junction(&[EV, ConnectionFlags::HORIZONTAL]));
    // A single connection never marks a junction.
    assert!(!should_draw_junction(&[EV]));
    // Two terminals joining end-to-end do not.
    assert!(!should_draw_junction(&[EV, EH]));
    // Three terminals of mixed orientation do.
    assert!(should_draw_junction(&[EV, EH, EH]));
}

#[test]
fn test_junction_rule_edge_cases() {
    // Two running lines crossing: no terminals, no junction.
    assert!(!should_draw_junction(&[
        ConnectionFlags::HORIZONTAL,
        ConnectionFlags::VERTICAL
    ]));
    // Three terminals all sharing an orientation: a bus end, not a junction.
    assert!(!should_draw_junction(&[EH, EH, EH]));
    // A terminal resting on a running line of the same orientation.
    assert!(!should_draw_junction(&[EH, ConnectionFlags::HORIZONTAL]));
}
