use crate::types::{DrawingStroke, GroundSymbol, NodeId, Point, PowerSymbol};

/// The id-bearing point a click snapped onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapHit {
    pub node_id: NodeId,
    pub position: Point,
    pub distance: f64,
}

/// Every id-bearing point in the drawing.
fn anchors<'a>(
    strokes: &'a [DrawingStroke],
    power: &'a [PowerSymbol],
    ground: &'a [GroundSymbol],
) -> impl Iterator<Item = (NodeId, Point)> + 'a {
    let stroke_points = strokes.iter().flat_map(|s| {
        s.points
            .iter()
            .filter_map(|p| p.node_id.map(|id| (id, p.position())))
    });
    let power_points = power.iter().map(|p| (p.node_id, Point::new(p.x, p.y)));
    let ground_points = ground.iter().map(|g| (g.node_id, Point::new(g.x, g.y)));
    stroke_points.chain(power_points).chain(ground_points)
}

/// Nearest id-bearing point within `max_distance` of `at` (inclusive).
/// Equal distances resolve to the lower node id.
pub fn find_snap_target(
    strokes: &[DrawingStroke],
    power: &[PowerSymbol],
    ground: &[GroundSymbol],
    at: Point,
    max_distance: f64,
) -> Option<SnapHit> {
    let mut best: Option<SnapHit> = None;
    for (node_id, position) in anchors(strokes, power, ground) {
        let distance = at.distance(position);
        if distance > max_distance {
            continue;
        }
        let better = match &best {
            None => true,
            Some(b) => distance < b.distance || (distance == b.distance && node_id < b.node_id),
        };
        if better {
            best = Some(SnapHit {
                node_id,
                position,
                distance,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Layer, StrokeKind, StrokePoint};
    use approx::assert_relative_eq;

    fn via(id: &str, x: f64, y: f64, node: u32) -> DrawingStroke {
        DrawingStroke {
            id: id.to_string(),
            kind: StrokeKind::Via,
            points: vec![StrokePoint::new(Point::new(x, y), Some(NodeId(node)))],
            color: "#0f0".to_string(),
            size: 6.0,
            layer: Layer::Top,
            note: None,
        }
    }

    #[test]
    fn test_nearest_within_threshold() {
        let strokes = vec![via("a", 0.0, 0.0, 1), via("b", 10.0, 0.0, 2)];
        let hit = find_snap_target(&strokes, &[], &[], Point::new(7.0, 0.0), 5.0).unwrap();
        assert_eq!(hit.node_id, NodeId(2));
        assert_relative_eq!(hit.distance, 3.0);
        assert_eq!(hit.position, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_out_of_range() {
        let strokes = vec![via("a", 0.0, 0.0, 1)];
        assert!(find_snap_target(&strokes, &[], &[], Point::new(20.0, 0.0), 5.0).is_none());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let strokes = vec![via("a", 0.0, 0.0, 1)];
        assert!(find_snap_target(&strokes, &[], &[], Point::new(3.0, 4.0), 5.0).is_some());
    }

    #[test]
    fn test_tie_prefers_lower_id() {
        let strokes = vec![via("a", -2.0, 0.0, 9), via("b", 2.0, 0.0, 4)];
        let hit = find_snap_target(&strokes, &[], &[], Point::new(0.0, 0.0), 5.0).unwrap();
        assert_eq!(hit.node_id, NodeId(4));
    }

    #[test]
    fn test_bare_trace_vertices_are_not_targets() {
        let trace = DrawingStroke {
            id: "t".to_string(),
            kind: StrokeKind::Trace,
            points: vec![
                StrokePoint::new(Point::new(0.0, 0.0), None),
                StrokePoint::new(Point::new(50.0, 0.0), Some(NodeId(3))),
            ],
            color: "#f00".to_string(),
            size: 2.0,
            layer: Layer::Top,
            note: None,
        };
        assert!(find_snap_target(&[trace.clone()], &[], &[], Point::new(1.0, 0.0), 5.0).is_none());
        let hit = find_snap_target(&[trace], &[], &[], Point::new(49.0, 0.0), 5.0).unwrap();
        assert_eq!(hit.node_id, NodeId(3));
    }

    #[test]
    fn test_symbols_are_targets() {
        let ground = vec![GroundSymbol {
            id: "g1".to_string(),
            x: 100.0,
            y: 100.0,
            node_id: NodeId(12),
            layer: Layer::Bottom,
            bus_id: None,
        }];
        let hit = find_snap_target(&[], &[], &ground, Point::new(101.0, 100.0), 5.0).unwrap();
        assert_eq!(hit.node_id, NodeId(12));
    }
}
