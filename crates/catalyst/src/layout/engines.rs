//! Leaf layout engine factory module
//!
//! Engines position the leaves of the containment tree as a directed graph,
//! ignoring clusters entirely. The cluster stages consume the result:
//! solver centers for root-level leaves, and raw edge paths for routing.
//!
//! The module uses a builder pattern for creating and caching engines.

mod layered;
mod ranks;
mod sugiyama;

use std::collections::HashMap;

use log::debug;

use catalyst_core::geometry::{Point, Size};

use crate::config::{EngineKind, LayoutOptions};

/// A relation whose endpoints are two distinct leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafEdge {
    relation: usize,
    source: usize,
    target: usize,
}

impl LeafEdge {
    /// Creates an edge for the relation at index `relation`, between leaf
    /// indices `source` and `target`.
    pub fn new(relation: usize, source: usize, target: usize) -> Self {
        Self {
            relation,
            source,
            target,
        }
    }

    /// Index of the originating relation in the caller's relation list
    pub fn relation(&self) -> usize {
        self.relation
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }
}

/// The graph of leaves handed to a [`LeafEngine`].
///
/// Leaves are addressed by their index in `sizes`. Self-loops and edges
/// referring to unknown leaves are never stored.
#[derive(Debug, Clone, Default)]
pub struct LeafGraph {
    sizes: Vec<Size>,
    edges: Vec<LeafEdge>,
}

impl LeafGraph {
    pub fn new(sizes: Vec<Size>, edges: impl IntoIterator<Item = LeafEdge>) -> Self {
        let node_count = sizes.len();
        let edges = edges
            .into_iter()
            .filter(|edge| {
                let keep = edge.source != edge.target
                    && edge.source < node_count
                    && edge.target < node_count;
                if !keep {
                    debug!(relation = edge.relation; "Leaf edge excluded from layout");
                }
                keep
            })
            .collect();
        Self { sizes, edges }
    }

    pub fn node_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn sizes(&self) -> &[Size] {
        &self.sizes
    }

    pub fn edges(&self) -> &[LeafEdge] {
        &self.edges
    }
}

/// Output of a [`LeafEngine`].
///
/// `centers` is indexed like the graph's leaves; `paths` like its edges.
/// Every path runs from the relation's source to its target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafLayout {
    centers: Vec<Point>,
    paths: Vec<Vec<Point>>,
}

impl LeafLayout {
    pub fn new(centers: Vec<Point>, paths: Vec<Vec<Point>>) -> Self {
        Self { centers, paths }
    }

    pub fn centers(&self) -> &[Point] {
        &self.centers
    }

    pub fn center(&self, leaf: usize) -> Option<Point> {
        self.centers.get(leaf).copied()
    }

    /// Raw path of the edge at index `edge` in the graph's edge list
    pub fn path(&self, edge: usize) -> &[Point] {
        self.paths.get(edge).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Trait defining the interface for leaf layout engines.
///
/// Engines never fail; an empty graph yields an empty layout.
pub trait LeafEngine {
    /// Calculate center positions for every leaf and a raw path for every edge.
    ///
    /// Leaf sizes are carried over unchanged; the layout's top-left corner
    /// lands on the configured margins.
    fn calculate(&self, graph: &LeafGraph, options: &LayoutOptions) -> LeafLayout;
}

/// Builder for creating and caching leaf layout engines.
#[derive(Default)]
pub struct EngineBuilder {
    engines: HashMap<EngineKind, Box<dyn LeafEngine>>,
}

impl EngineBuilder {
    /// Create a new engine builder with an empty engine cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the engine of the specified kind
    pub fn leaf_engine(&mut self, kind: EngineKind) -> &dyn LeafEngine {
        let engine = self.engines.entry(kind).or_insert_with(|| {
            let engine: Box<dyn LeafEngine> = match kind {
                EngineKind::Layered => Box::new(layered::Engine::new()),
                EngineKind::Sugiyama => Box::new(sugiyama::Engine::new()),
            };
            engine
        });
        &**engine
    }
}
