use log::debug;

use catalyst_core::{
    geometry::{Bounds, Point, Size},
    model::Relation,
};

use super::engines::{LeafEdge, LeafGraph, LeafLayout};
use crate::{
    config::{ElementMetrics, LayoutConfig},
    structure::Hierarchy,
};

/// Working state of one layout call.
///
/// Every vector is indexed by arena index of the [`Hierarchy`]. The context
/// is created per call and dropped once the result is assembled.
#[derive(Debug)]
pub struct LayoutContext<'a> {
    pub(super) hierarchy: Hierarchy<'a>,
    pub(super) config: &'a LayoutConfig,
    /// Arena index to leaf index in the leaf graph
    pub(super) leaf_slots: Vec<Option<usize>>,
    pub(super) solver: LeafLayout,
    /// Resolved size of every entity
    pub(super) sizes: Vec<Size>,
    /// Center of every non-root entity in its parent's stacking frame
    pub(super) local_centers: Vec<Point>,
    /// Box of every cluster in its own stacking frame
    pub(super) local_bounds: Vec<Bounds>,
    /// Final absolute centers
    pub(super) centers: Vec<Point>,
}

impl<'a> LayoutContext<'a> {
    pub fn new(hierarchy: Hierarchy<'a>, config: &'a LayoutConfig) -> Self {
        let len = hierarchy.len();
        let mut leaf_slots = vec![None; len];
        for (leaf, idx) in hierarchy.leaves().into_iter().enumerate() {
            leaf_slots[idx] = Some(leaf);
        }

        Self {
            hierarchy,
            config,
            leaf_slots,
            solver: LeafLayout::default(),
            sizes: vec![Size::default(); len],
            local_centers: vec![Point::default(); len],
            local_bounds: vec![Bounds::default(); len],
            centers: vec![Point::default(); len],
        }
    }

    pub fn metrics(&self, idx: usize) -> &ElementMetrics {
        self.config
            .elements()
            .metrics(self.hierarchy.entity(idx).kind())
    }

    /// Arena indices of the two endpoints, if both exist
    pub fn endpoints(&self, relation: &Relation) -> Option<(usize, usize)> {
        Some((
            self.hierarchy.index_of(relation.source())?,
            self.hierarchy.index_of(relation.target())?,
        ))
    }

    /// Builds the graph of leaves, sized by their kind defaults, and of the
    /// relations between two leaves.
    pub fn leaf_graph(&self, relations: &[Relation]) -> LeafGraph {
        let sizes = self
            .hierarchy
            .leaves()
            .into_iter()
            .map(|idx| self.metrics(idx).default_size())
            .collect();

        let edges = relations.iter().enumerate().filter_map(|(index, relation)| {
            let (source, target) = self.endpoints(relation)?;
            let edge = LeafEdge::new(index, self.leaf_slots[source]?, self.leaf_slots[target]?);
            Some(edge)
        });

        let graph = LeafGraph::new(sizes, edges);
        debug!(
            leaves = graph.node_count(),
            edges = graph.edges().len();
            "Leaf graph built"
        );
        graph
    }

    pub fn set_solver_layout(&mut self, solver: LeafLayout) {
        self.solver = solver;
    }

    /// Position the leaf engine gave to the entity, for leaves only
    pub fn solver_center(&self, idx: usize) -> Option<Point> {
        self.leaf_slots[idx].and_then(|leaf| self.solver.center(leaf))
    }

    /// Displacement of an entity between its solver position and its final
    /// position; zero for clusters.
    pub fn shift(&self, idx: usize) -> Point {
        self.solver_center(idx)
            .map(|solved| self.centers[idx].sub_point(solved))
            .unwrap_or_default()
    }

    pub fn size(&self, idx: usize) -> Size {
        self.sizes[idx]
    }

    pub fn center(&self, idx: usize) -> Point {
        self.centers[idx]
    }

    pub fn bounds(&self, idx: usize) -> Bounds {
        self.centers[idx].to_bounds(self.sizes[idx])
    }
}
