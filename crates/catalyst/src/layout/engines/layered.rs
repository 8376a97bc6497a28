use log::debug;

use super::{
    LeafEngine, LeafGraph, LeafLayout,
    ranks::{self, LongEdges, RankedGraph},
};
use crate::config::LayoutOptions;

/// The built-in layered engine.
///
/// Breaks cycles, ranks leaves by longest path, bends long edges through
/// virtual points and orders each rank with barycenter sweeps.
#[derive(Debug, Default)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }
}

impl LeafEngine for Engine {
    fn calculate(&self, graph: &LeafGraph, options: &LayoutOptions) -> LeafLayout {
        if graph.is_empty() {
            return LeafLayout::default();
        }

        let edges = ranks::break_cycles(graph);
        let leaf_ranks = ranks::longest_path_ranks(graph.node_count(), &edges);
        let mut ranked = RankedGraph::new(graph, &edges, &leaf_ranks, LongEdges::Virtual);
        ranked.minimize_crossings();

        debug!(
            leaves = graph.node_count(),
            edges = graph.edges().len(),
            ranks = ranked.layers().len();
            "Layered leaf layout"
        );
        ranked.assign_coordinates(options)
    }
}
