//! Bottom-up size inference for clusters.
//!
//! Each cluster stacks its children vertically in a local frame whose origin
//! is the top-center of the stack, then wraps the stack in its padding. The
//! resulting box is both the cluster's size and the reference the placer uses
//! to translate the local frame into absolute coordinates.

use log::debug;

use catalyst_core::{
    geometry::{Bounds, Insets, Point},
    model::Entity,
};

use super::context::LayoutContext;
use crate::config::ElementMetrics;

/// Padding of a cluster: the kind's padding plus title clearance on top when
/// the entity shows a technology line.
pub fn cluster_insets(metrics: &ElementMetrics, entity: &Entity) -> Insets {
    let padding = metrics.padding();
    if entity.technology().is_some() {
        padding.with_top(padding.top() + metrics.title_clearance())
    } else {
        padding
    }
}

/// Box of a cluster around the given child boxes.
///
/// Non-finite child boxes are ignored. Without any finite child the box has
/// the kind's default size. The kind's minimum size is enforced by widening
/// symmetrically and growing downward.
pub fn compute_bounds(metrics: &ElementMetrics, insets: Insets, children: &[Bounds]) -> Bounds {
    let content = children
        .iter()
        .filter(|child| child.is_finite())
        .copied()
        .reduce(|union, child| union.merge(&child));

    let Some(content) = content else {
        return Bounds::new_from_top_left(Point::default(), metrics.default_size());
    };

    let padded = content.add_padding(insets);
    let min_size = metrics.min_size();
    let extra_width = (min_size.width() - padded.width()).max(0.0);
    let extra_height = (min_size.height() - padded.height()).max(0.0);
    padded.add_padding(Insets::new(0.0, extra_width / 2.0, extra_height, extra_width / 2.0))
}

/// Resolves every entity's size in post-order, recording each child's
/// center in its parent's stacking frame.
pub fn calculate(ctx: &mut LayoutContext<'_>) {
    let spacing = ctx.config.placement().child_spacing();

    for idx in ctx.hierarchy.post_order() {
        let metrics = *ctx.metrics(idx);
        let entity = ctx.hierarchy.entity(idx);

        if ctx.hierarchy.is_leaf(idx) {
            ctx.sizes[idx] = metrics.default_size();
            continue;
        }

        let mut cursor = 0.0_f32;
        let mut child_boxes = Vec::with_capacity(ctx.hierarchy.children(idx).len());
        for &child in ctx.hierarchy.children(idx) {
            let fallback = ctx.metrics(child).default_size();
            let size = ctx.sizes[child].or_fallback(fallback);
            if size != ctx.sizes[child] {
                debug!(entity = ctx.hierarchy.entity(child).id(); "Degenerate size replaced by kind default");
                ctx.sizes[child] = size;
            }

            let center = Point::new(0.0, cursor + size.height() / 2.0);
            ctx.local_centers[child] = center;
            child_boxes.push(center.to_bounds(size));
            cursor += size.height() + spacing;
        }

        let bounds = compute_bounds(&metrics, cluster_insets(&metrics, entity), &child_boxes);
        ctx.local_bounds[idx] = bounds;
        ctx.sizes[idx] = bounds.to_size();
        debug!(
            entity = entity.id(),
            width = bounds.width(),
            height = bounds.height();
            "Cluster bounds computed"
        );
    }
}

#[cfg(test)]
mod tests {
    use catalyst_core::{
        geometry::Size,
        model::{ElementKind, Entity},
    };
    use float_cmp::approx_eq;

    use super::*;

    fn metrics(kind: ElementKind) -> ElementMetrics {
        ElementMetrics::for_kind(kind)
    }

    #[test]
    fn test_no_children_yields_default_size() {
        let container = metrics(ElementKind::Container);
        let bounds = compute_bounds(&container, container.padding(), &[]);

        assert_eq!(bounds.to_size(), Size::new(320.0, 220.0));
    }

    #[test]
    fn test_padding_wraps_single_child() {
        let system = metrics(ElementKind::System);
        let child = Point::new(0.0, 110.0).to_bounds(Size::new(320.0, 220.0));
        let bounds = compute_bounds(&system, system.padding(), &[child]);

        assert_eq!(bounds.width(), 380.0);
        assert_eq!(bounds.height(), 320.0);
        assert_eq!(bounds.min_y(), -70.0);
        assert!(bounds.contains(&child, 0.0));
    }

    #[test]
    fn test_minimum_size_is_enforced() {
        let container = metrics(ElementKind::Container);
        let child = Point::new(0.0, 20.0).to_bounds(Size::new(40.0, 40.0));
        let bounds = compute_bounds(&container, container.padding(), &[child]);

        assert_eq!(bounds.to_size(), Size::new(240.0, 150.0));
        assert!(approx_eq!(f32, bounds.center().x(), 0.0));
        assert_eq!(bounds.min_y(), -60.0);
    }

    #[test]
    fn test_non_finite_children_are_skipped() {
        let component = metrics(ElementKind::Component);
        let broken = Point::new(f32::NAN, 0.0).to_bounds(Size::new(10.0, 10.0));
        let bounds = compute_bounds(&component, component.padding(), &[broken]);
        assert_eq!(bounds.to_size(), component.default_size());

        let good = Point::new(0.0, 100.0).to_bounds(Size::new(300.0, 200.0));
        let bounds = compute_bounds(&component, component.padding(), &[broken, good]);
        assert!(bounds.is_finite());
        assert_eq!(bounds.width(), 340.0);
    }

    #[test]
    fn test_technology_adds_title_clearance() {
        let container = metrics(ElementKind::Container);
        let plain = Entity::new("api", ElementKind::Container, "API");
        let with_technology = plain.clone().with_technology("Rust");

        assert_eq!(cluster_insets(&container, &plain).top(), 60.0);
        assert_eq!(cluster_insets(&container, &with_technology).top(), 75.0);
        assert_eq!(cluster_insets(&container, &with_technology).bottom(), 25.0);
    }
}
