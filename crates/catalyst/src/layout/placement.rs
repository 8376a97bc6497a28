//! Top-down placement of the containment tree.
//!
//! Root clusters are laid out on a wrapping grid. Every other entity keeps
//! the offset it received in its parent's stacking frame. Root-level leaves
//! keep the arrangement the leaf engine gave them and move as one block
//! below the grid.

use log::debug;

use catalyst_core::geometry::{Bounds, Point, Size};

use super::context::LayoutContext;

/// Row-wrapping cursor for root clusters.
#[derive(Debug)]
struct RootGrid {
    origin_x: f32,
    max_row_width: f32,
    spacing: f32,
    cursor: Point,
    row_height: f32,
}

impl RootGrid {
    fn new(origin: Point, max_row_width: f32, spacing: f32) -> Self {
        Self {
            origin_x: origin.x(),
            max_row_width,
            spacing,
            cursor: origin,
            row_height: 0.0,
        }
    }

    /// Returns the center of the next cluster, wrapping onto a new row when
    /// it would overflow the current one. A row always takes at least one
    /// cluster.
    fn place(&mut self, size: Size) -> Point {
        let row_started = self.cursor.x() > self.origin_x;
        if row_started && self.cursor.x() + size.width() > self.origin_x + self.max_row_width {
            self.cursor = Point::new(
                self.origin_x,
                self.cursor.y() + self.row_height + self.spacing,
            );
            self.row_height = 0.0;
        }

        let center = Point::new(
            self.cursor.x() + size.width() / 2.0,
            self.cursor.y() + size.height() / 2.0,
        );
        self.cursor = Point::new(self.cursor.x() + size.width() + self.spacing, self.cursor.y());
        self.row_height = self.row_height.max(size.height());
        center
    }

    /// Bottom of the last row
    fn bottom(&self) -> f32 {
        self.cursor.y() + self.row_height
    }
}

/// Assigns every entity its absolute center.
pub fn place(ctx: &mut LayoutContext<'_>) {
    let config = ctx.config;
    let options = config.options();
    let placement = config.placement();
    let margin = Point::new(options.margin_x(), options.margin_y());

    let mut grid = RootGrid::new(margin, placement.max_row_width(), placement.cluster_spacing());
    let mut root_leaves = Vec::new();
    let mut cluster_count = 0;
    for &root in ctx.hierarchy.roots() {
        if ctx.hierarchy.is_leaf(root) {
            root_leaves.push(root);
        } else {
            ctx.centers[root] = grid.place(ctx.sizes[root]);
            cluster_count += 1;
        }
    }

    for idx in ctx.hierarchy.pre_order() {
        let Some(parent) = ctx.hierarchy.parent(idx) else {
            continue;
        };
        let frame_offset = ctx.centers[parent].sub_point(ctx.local_bounds[parent].center());
        ctx.centers[idx] = ctx.local_centers[idx].add_point(frame_offset);
    }

    if root_leaves.is_empty() {
        return;
    }

    let top = if cluster_count > 0 {
        grid.bottom() + placement.cluster_spacing()
    } else {
        margin.y()
    };

    let solved: Vec<(usize, Point)> = root_leaves
        .iter()
        .map(|&idx| (idx, ctx.solver_center(idx).unwrap_or(margin)))
        .collect();
    let block = solved
        .iter()
        .map(|&(idx, center)| center.to_bounds(ctx.sizes[idx]))
        .reduce(|union, bounds| union.merge(&bounds))
        .unwrap_or_else(|| Bounds::new_from_top_left(margin, Size::default()));
    let offset = Point::new(margin.x(), top).sub_point(block.min_point());

    for (idx, center) in solved {
        ctx.centers[idx] = center.add_point(offset);
    }
    debug!(
        clusters = cluster_count,
        leaves = root_leaves.len();
        "Root elements placed"
    );
}
