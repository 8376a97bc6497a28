//! Edge routing.
//!
//! Engines route relations between leaves before clusters move those leaves,
//! so raw paths are re-anchored onto the final positions first. Every path is
//! then reduced to the configured point budget and tagged.

use log::{debug, trace};

use catalyst_core::{geometry::Point, model::Relation};

use super::{
    context::LayoutContext,
    engines::LeafGraph,
    result::{EdgePoint, LayoutEdge, PointRole},
};

/// Moves every point of `path` by the interpolation between the source's and
/// the target's displacement, weighted by the point's path-length fraction.
pub fn reanchor(path: &[Point], source_shift: Point, target_shift: Point) -> Vec<Point> {
    if path.len() < 2 {
        return path.iter().map(|point| point.add_point(source_shift)).collect();
    }

    let mut travelled = Vec::with_capacity(path.len());
    let mut total = 0.0_f32;
    travelled.push(0.0);
    for pair in path.windows(2) {
        total += pair[0].distance(pair[1]);
        travelled.push(total);
    }

    let last = (path.len() - 1) as f32;
    path.iter()
        .zip(travelled)
        .enumerate()
        .map(|(index, (point, distance))| {
            let t = if total > 0.0 {
                distance / total
            } else {
                index as f32 / last
            };
            point.add_point(source_shift.lerp(target_shift, t))
        })
        .collect()
}

/// Keeps at most `max_points` points of `points`.
///
/// The first and last points always survive; interior points are sampled at
/// evenly spread indices in their original order.
///
/// ```text
/// len = 10, max = 4:  0 . . 3 . 5 . . . 9
/// ```
pub fn subsample(points: &[Point], max_points: usize) -> Vec<Point> {
    let max_points = max_points.max(2);
    if points.len() <= max_points {
        return points.to_vec();
    }

    let len = points.len();
    let mut picked = vec![0];
    for i in 1..max_points - 1 {
        let index = ((i * (len - 2)) as f32 / (max_points - 1) as f32).round() as usize;
        let index = index.clamp(1, len - 2);
        if picked.last() != Some(&index) {
            picked.push(index);
        }
    }
    picked.push(len - 1);

    picked.into_iter().map(|index| points[index]).collect()
}

/// Builds the edge for `relation`.
///
/// Paths with fewer than two points are replaced by a straight line between
/// the endpoint centers.
pub fn route(
    relation: &Relation,
    raw_points: &[Point],
    source_center: Point,
    target_center: Point,
    max_points: usize,
) -> LayoutEdge {
    let points = if raw_points.len() < 2 {
        vec![source_center, target_center]
    } else {
        subsample(raw_points, max_points)
    };

    let last = points.len() - 1;
    let points = points
        .into_iter()
        .enumerate()
        .map(|(index, point)| {
            let role = match index {
                0 => PointRole::Source,
                i if i == last => PointRole::Target,
                _ => PointRole::Waypoint,
            };
            EdgePoint::new(point, role)
        })
        .collect();

    LayoutEdge::new(relation, points)
}

/// Routes every relation whose endpoints both exist, in relation order.
pub fn route_relations(
    ctx: &LayoutContext<'_>,
    graph: &LeafGraph,
    relations: &[Relation],
) -> Vec<LayoutEdge> {
    let mut raw_paths: Vec<Option<usize>> = vec![None; relations.len()];
    for (edge, leaf_edge) in graph.edges().iter().enumerate() {
        raw_paths[leaf_edge.relation()] = Some(edge);
    }

    let max_points = ctx.config.routing().max_edge_points();
    let mut edges = Vec::with_capacity(relations.len());
    for (index, relation) in relations.iter().enumerate() {
        let Some((source, target)) = ctx.endpoints(relation) else {
            debug!(
                source = relation.source(),
                target = relation.target();
                "Dropping relation with unknown endpoint"
            );
            continue;
        };

        let raw = raw_paths[index]
            .map(|edge| reanchor(ctx.solver.path(edge), ctx.shift(source), ctx.shift(target)))
            .unwrap_or_default();
        edges.push(route(
            relation,
            &raw,
            ctx.center(source),
            ctx.center(target),
            max_points,
        ));
    }

    trace!(edges:?; "Edges routed");
    edges
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    fn line(len: usize) -> Vec<Point> {
        (0..len).map(|i| Point::new(i as f32, 0.0)).collect()
    }

    #[test]
    fn test_subsample_short_paths_unchanged() {
        assert_eq!(subsample(&line(3), 4), line(3));
        assert_eq!(subsample(&line(4), 4), line(4));
    }

    #[test]
    fn test_subsample_keeps_endpoints_in_order() {
        let sampled = subsample(&line(10), 4);
        let xs: Vec<f32> = sampled.iter().map(|point| point.x()).collect();

        assert_eq!(xs, [0.0, 3.0, 5.0, 9.0]);
    }

    #[test]
    fn test_subsample_two_point_budget() {
        assert_eq!(subsample(&line(6), 2), vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]);
        // Budgets below two still keep both endpoints.
        assert_eq!(subsample(&line(6), 0).len(), 2);
    }

    #[test]
    fn test_subsample_five_points() {
        let xs: Vec<f32> = subsample(&line(5), 4).iter().map(|point| point.x()).collect();
        assert_eq!(xs, [0.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_reanchor_moves_endpoints_with_their_elements() {
        let path = vec![Point::new(0.0, 0.0), Point::new(0.0, 50.0), Point::new(0.0, 100.0)];
        let moved = reanchor(&path, Point::new(10.0, 0.0), Point::new(30.0, 20.0));

        assert_eq!(moved[0], Point::new(10.0, 0.0));
        assert!(approx_eq!(f32, moved[1].x(), 20.0));
        assert!(approx_eq!(f32, moved[1].y(), 60.0));
        assert_eq!(moved[2], Point::new(30.0, 120.0));
    }

    #[test]
    fn test_reanchor_degenerate_path() {
        let path = vec![Point::new(5.0, 5.0); 3];
        let moved = reanchor(&path, Point::new(0.0, 0.0), Point::new(10.0, 0.0));

        assert_eq!(moved[0].x(), 5.0);
        assert_eq!(moved[1].x(), 10.0);
        assert_eq!(moved[2].x(), 15.0);
    }

    #[test]
    fn test_route_tags_points() {
        let relation = Relation::new("a", "b").with_label("Uses");
        let edge = route(&relation, &line(6), Point::default(), Point::default(), 4);
        let roles: Vec<PointRole> = edge.points().iter().map(|point| point.role()).collect();

        assert_eq!(
            roles,
            [
                PointRole::Source,
                PointRole::Waypoint,
                PointRole::Waypoint,
                PointRole::Target
            ]
        );
        assert_eq!(edge.label(), "Uses");
    }

    #[test]
    fn test_route_synthesizes_straight_line() {
        let relation = Relation::new("a", "b");
        let source = Point::new(1.0, 2.0);
        let target = Point::new(3.0, 4.0);
        let edge = route(&relation, &[Point::new(9.0, 9.0)], source, target, 4);

        assert_eq!(edge.points().len(), 2);
        assert_eq!(edge.points()[0].position(), source);
        assert_eq!(edge.points()[1].position(), target);
        assert_eq!(edge.points()[1].role(), PointRole::Target);
    }
}
