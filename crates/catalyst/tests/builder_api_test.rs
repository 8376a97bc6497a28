//! Integration tests for the DiagramLayout API
//!
//! These tests drive the public API end to end: hierarchy validation,
//! leaf layout, cluster sizing and placement, and edge routing.

use catalyst::{
    DiagramLayout, HierarchyError, LayoutError, LayoutResult, PointRole,
    config::{Direction, EngineKind, LayoutConfig, LayoutOptions},
    geometry::{Bounds, Point, Size},
    layout,
    model::{ElementKind, Entity, Relation},
};

fn system(id: &str) -> Entity {
    Entity::new(id, ElementKind::System, id.to_uppercase())
}

fn container(id: &str) -> Entity {
    Entity::new(id, ElementKind::Container, id.to_uppercase())
}

fn component(id: &str) -> Entity {
    Entity::new(id, ElementKind::Component, id.to_uppercase())
}

fn node_bounds(result: &LayoutResult, id: &str) -> Bounds {
    if let Some(node) = result.node(id) {
        return Bounds::new_from_center(node.center(), node.size());
    }
    let cluster = result.cluster(id).expect("element is laid out");
    Bounds::new_from_center(cluster.center(), cluster.size())
}

#[test]
fn test_builder_api_exists() {
    let builder = DiagramLayout::default();
    assert_eq!(builder.config(), &LayoutConfig::default());
}

#[test]
fn test_nested_system_container_component() {
    let entities = vec![system("s").with_child(container("c").with_child(component("x")))];

    let result = layout(&entities, &[], LayoutOptions::default()).expect("valid hierarchy");

    assert_eq!(result.nodes().len(), 1);
    assert_eq!(result.clusters().len(), 2);
    assert!(result.edges().is_empty());

    let s = node_bounds(&result, "s");
    let c = node_bounds(&result, "c");
    let x = node_bounds(&result, "x");
    assert!(s.contains(&c, 0.0));
    assert!(c.contains(&x, 0.0));

    assert!(result.total_width() >= 800.0);
    assert!(result.total_height() >= 600.0);
}

#[test]
fn test_two_systems_with_related_components() {
    let entities = vec![
        system("s1").with_child(component("a")),
        system("s2").with_child(component("b")),
    ];
    let relations = vec![Relation::new("a", "b").with_label("Calls")];

    let result = layout(&entities, &relations, LayoutOptions::default()).expect("valid hierarchy");

    assert_eq!(result.nodes().len(), 2);
    assert_eq!(result.clusters().len(), 2);
    assert_eq!(result.edges().len(), 1);

    let edge = &result.edges()[0];
    assert_eq!(edge.points().len(), 2);
    assert_eq!(edge.source(), "a");
    assert_eq!(edge.target(), "b");
    assert_eq!(edge.label(), "Calls");

    assert!(!node_bounds(&result, "s1").intersects(&node_bounds(&result, "s2")));
}

#[test]
fn test_empty_input() {
    let result = layout(&[], &[], LayoutOptions::default()).expect("empty input is valid");

    assert!(result.nodes().is_empty());
    assert!(result.clusters().is_empty());
    assert!(result.edges().is_empty());
    assert_eq!(result.total_width(), 800.0);
    assert_eq!(result.total_height(), 600.0);
}

#[test]
fn test_flat_parent_links_match_nesting() {
    let nested = vec![system("s").with_children([container("c1"), container("c2").with_child(component("x"))])];
    let flat = vec![
        system("s"),
        container("c1").with_parent("s"),
        container("c2").with_parent("s"),
        component("x").with_parent("c2"),
    ];
    let builder = DiagramLayout::default();

    let from_nested = builder.compute(&nested, &[]).expect("valid nested hierarchy");
    let from_flat = builder.compute(&flat, &[]).expect("valid flat hierarchy");

    assert_eq!(from_nested, from_flat);
}

#[test]
fn test_parent_cycle_is_rejected() {
    let entities = vec![
        container("a").with_parent("b"),
        container("b").with_parent("a"),
    ];

    let result = DiagramLayout::default().compute(&entities, &[]);
    assert!(matches!(
        result,
        Err(LayoutError::InvalidHierarchy(HierarchyError::Cycle(_)))
    ));
}

#[test]
fn test_unknown_parent_is_rejected() {
    let entities = vec![system("s"), component("x").with_parent("nowhere")];

    let result = DiagramLayout::default().compute(&entities, &[]);
    assert!(matches!(
        result,
        Err(LayoutError::InvalidHierarchy(HierarchyError::UnknownParent { .. }))
    ));
}

#[test]
fn test_duplicate_id_is_rejected() {
    let entities = vec![system("s").with_child(component("s"))];

    let err = DiagramLayout::default()
        .compute(&entities, &[])
        .expect_err("duplicate ids must fail");
    assert_eq!(err.to_string(), "Invalid hierarchy: duplicate entity id `s`");
}

#[test]
fn test_relation_cycle_among_leaves_still_lays_out() {
    let entities = vec![
        system("s").with_children([component("a"), component("b"), component("c")]),
        system("ext"),
    ];
    let relations = vec![
        Relation::new("a", "b"),
        Relation::new("b", "c"),
        Relation::new("c", "a"),
        Relation::new("ext", "a"),
    ];

    for engine in [EngineKind::Layered, EngineKind::Sugiyama] {
        let config = LayoutConfig::default().with_engine(engine);
        let result = DiagramLayout::new(config)
            .compute(&entities, &relations)
            .expect("valid hierarchy");

        assert_eq!(result.edges().len(), 4, "{engine:?}");
        for edge in result.edges() {
            assert!(edge.points().len() >= 2);
            assert!(edge.points().len() <= 4);
        }
    }
}

#[test]
fn test_dangling_relations_are_dropped() {
    let entities = vec![system("s").with_child(component("a")), system("t")];
    let relations = vec![
        Relation::new("a", "ghost"),
        Relation::new("t", "a"),
        Relation::new("ghost", "t"),
    ];

    let result = layout(&entities, &relations, LayoutOptions::default()).expect("valid hierarchy");

    assert_eq!(result.edges().len(), 1);
    assert_eq!(result.edges()[0].source(), "t");
}

#[test]
fn test_root_clusters_wrap_into_rows() {
    let entities: Vec<Entity> = (0..6)
        .map(|i| system(&format!("s{i}")).with_child(component(&format!("x{i}"))))
        .collect();

    let result = layout(&entities, &[], LayoutOptions::default()).expect("valid hierarchy");

    let first = result.cluster("s0").expect("s0 laid out");
    let last = result.cluster("s5").expect("s5 laid out");
    assert!(last.y() > first.y());
    for cluster in result.clusters() {
        assert!(cluster.x() + cluster.width() / 2.0 <= 20.0 + 1600.0 + 1e-3);
    }
}

#[test]
fn test_direction_changes_root_leaf_arrangement() {
    let entities = vec![system("a"), system("b")];
    let relations = vec![Relation::new("a", "b")];

    let vertical = layout(&entities, &relations, LayoutOptions::default()).expect("valid");
    let horizontal = layout(
        &entities,
        &relations,
        LayoutOptions::default().with_direction(Direction::LeftToRight),
    )
    .expect("valid");

    let (a, b) = (
        vertical.node("a").expect("a laid out"),
        vertical.node("b").expect("b laid out"),
    );
    assert!(b.y() > a.y());
    assert_eq!(a.x(), b.x());

    let (a, b) = (
        horizontal.node("a").expect("a laid out"),
        horizontal.node("b").expect("b laid out"),
    );
    assert!(b.x() > a.x());
    assert_eq!(a.y(), b.y());
}

#[test]
fn test_config_from_toml() {
    let builder = DiagramLayout::from_toml_str(
        r#"
        engine = "layered"

        [options]
        layoutDirection = "BT"
        ranksep = 30
        marginx = 0
        marginy = 0

        [canvas]
        min_width = 100.0
        min_height = 100.0
        "#,
    )
    .expect("valid configuration");

    let options = builder.config().options();
    assert_eq!(options.direction(), Direction::BottomToTop);
    assert_eq!(options.rank_separation(), 30.0);

    let result = builder
        .compute(&[component("a"), component("b")], &[Relation::new("a", "b")])
        .expect("valid hierarchy");
    let a = result.node("a").expect("a laid out");
    let b = result.node("b").expect("b laid out");
    assert!(a.y() > b.y());
    assert_eq!(b.y(), 60.0);
    assert_eq!(a.y() - b.y(), 150.0);
    assert_eq!(result.total_height(), 270.0);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let result = DiagramLayout::from_toml_str("[options]\nranksep = \"wide\"");
    assert!(matches!(result, Err(LayoutError::Config(_))));
}

#[test]
fn test_long_edges_are_subsampled() {
    // The direct a -> e edge spans four ranks.
    let ids = ["a", "b", "c", "d", "e"];
    let entities: Vec<Entity> = ids.iter().map(|id| component(id)).collect();
    let mut relations: Vec<Relation> = ids.windows(2).map(|pair| Relation::new(pair[0], pair[1])).collect();
    relations.push(Relation::new("a", "e"));

    let result = layout(&entities, &relations, LayoutOptions::default()).expect("valid hierarchy");
    let long = result.edges().last().expect("edge routed");
    let roles: Vec<PointRole> = long.points().iter().map(|point| point.role()).collect();

    assert_eq!(
        roles,
        [
            PointRole::Source,
            PointRole::Waypoint,
            PointRole::Waypoint,
            PointRole::Target
        ]
    );
    let a = result.node("a").expect("a laid out");
    let e = result.node("e").expect("e laid out");
    assert_eq!(long.points()[0].position(), a.center());
    assert_eq!(long.points()[3].position(), e.center());
}

#[test]
fn test_result_geometry_helpers() {
    let result = layout(&[component("solo")], &[], LayoutOptions::default()).expect("valid");
    let solo = result.node("solo").expect("solo laid out");

    assert_eq!(solo.size(), Size::new(240.0, 120.0));
    assert_eq!(solo.center(), Point::new(140.0, 80.0));
}

mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    /// A random forest given as flat entities with `parent` links to earlier
    /// entities, and random relations that may name unknown ids.
    fn diagram_strategy() -> impl Strategy<Value = (Vec<Entity>, Vec<Relation>)> {
        (1usize..14)
            .prop_flat_map(|count| {
                (
                    proptest::collection::vec(proptest::option::of(0usize..count), count),
                    proptest::collection::vec((0usize..count + 2, 0usize..count + 2), 0..12),
                )
            })
            .prop_map(|(parents, pairs)| {
                let mut depths: Vec<usize> = Vec::with_capacity(parents.len());
                let mut entities = Vec::with_capacity(parents.len());
                for (i, parent) in parents.iter().enumerate() {
                    let parent = parent.filter(|&p| p < i);
                    let depth = parent.map_or(0, |p| depths[p] + 1);
                    depths.push(depth);

                    let kind = match depth {
                        0 => ElementKind::System,
                        1 => ElementKind::Container,
                        _ => ElementKind::Component,
                    };
                    let mut entity = Entity::new(format!("e{i}"), kind, format!("E{i}"));
                    if let Some(p) = parent {
                        entity = entity.with_parent(format!("e{p}"));
                    }
                    if i % 3 == 0 {
                        entity = entity.with_technology("Rust");
                    }
                    entities.push(entity);
                }
                let relations = pairs
                    .into_iter()
                    .map(|(s, t)| Relation::new(format!("e{s}"), format!("e{t}")))
                    .collect();
                (entities, relations)
            })
    }

    fn run(entities: &[Entity], relations: &[Relation]) -> LayoutResult {
        DiagramLayout::default()
            .compute(entities, relations)
            .expect("generated hierarchies are valid")
    }

    fn check_sizes_positive(result: &LayoutResult) -> Result<(), TestCaseError> {
        for node in result.nodes() {
            prop_assert!(node.width() > 0.0 && node.height() > 0.0);
        }
        for cluster in result.clusters() {
            prop_assert!(cluster.width() > 0.0 && cluster.height() > 0.0);
        }
        Ok(())
    }

    fn check_children_contained(result: &LayoutResult) -> Result<(), TestCaseError> {
        for cluster in result.clusters() {
            let outer = node_bounds(result, cluster.id());
            for child in cluster.child_ids() {
                let inner = node_bounds(result, child);
                prop_assert!(
                    outer.contains(&inner, 10.0),
                    "{child} escapes {}",
                    cluster.id()
                );
            }
        }
        Ok(())
    }

    fn check_edges(
        result: &LayoutResult,
        entities: &[Entity],
        relations: &[Relation],
    ) -> Result<(), TestCaseError> {
        let known = |id: &str| entities.iter().any(|entity| entity.id() == id);
        let expected: Vec<&Relation> = relations
            .iter()
            .filter(|relation| known(relation.source()) && known(relation.target()))
            .collect();

        prop_assert_eq!(result.edges().len(), expected.len());
        for (edge, relation) in result.edges().iter().zip(expected) {
            prop_assert_eq!(edge.source(), relation.source());
            prop_assert_eq!(edge.target(), relation.target());

            let points = edge.points();
            prop_assert!(points.len() >= 2 && points.len() <= 4);
            prop_assert_eq!(points[0].role(), PointRole::Source);
            prop_assert_eq!(points[points.len() - 1].role(), PointRole::Target);
            for point in &points[1..points.len() - 1] {
                prop_assert_eq!(point.role(), PointRole::Waypoint);
            }
        }
        Ok(())
    }

    fn check_roots_disjoint(
        result: &LayoutResult,
        entities: &[Entity],
    ) -> Result<(), TestCaseError> {
        let roots: Vec<Bounds> = entities
            .iter()
            .filter(|entity| entity.parent().is_none())
            .map(|entity| node_bounds(result, entity.id()))
            .collect();
        for (i, a) in roots.iter().enumerate() {
            for b in &roots[i + 1..] {
                prop_assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn layout_properties((entities, relations) in diagram_strategy()) {
            let result = run(&entities, &relations);

            check_sizes_positive(&result)?;
            check_children_contained(&result)?;
            check_edges(&result, &entities, &relations)?;
            check_roots_disjoint(&result, &entities)?;
        }

        #[test]
        fn layout_is_idempotent((entities, relations) in diagram_strategy()) {
            prop_assert_eq!(run(&entities, &relations), run(&entities, &relations));
        }
    }
}
