//! Layered drawing primitives shared by the leaf engines.
//!
//! The pipeline is the classic one for layered graph drawing:
//!
//! 1. [`break_cycles`] orients every edge so the graph becomes acyclic.
//! 2. [`longest_path_ranks`] assigns each leaf to a rank.
//! 3. [`RankedGraph`] inserts virtual slots for long edges, reduces edge
//!    crossings and assigns coordinates.

use std::{cmp::Ordering, collections::HashSet};

use log::{debug, trace, warn};
use petgraph::{
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    visit::{DfsEvent, depth_first_search},
};

use catalyst_core::geometry::{Point, Size};

use super::{LeafGraph, LeafLayout};
use crate::config::LayoutOptions;

/// Number of alternating barycenter sweeps.
const ORDERING_PASSES: usize = 8;

/// The edges of a [`LeafGraph`] oriented for ranking.
///
/// `pairs[i]` is `(upper, lower)` for the graph's edge `i`; `reversed[i]`
/// records whether that is the opposite of the relation's direction.
#[derive(Debug, Clone, Default)]
pub struct AcyclicEdges {
    pairs: Vec<(usize, usize)>,
    reversed: Vec<bool>,
}

impl AcyclicEdges {
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn is_reversed(&self, edge: usize) -> bool {
        self.reversed.get(edge).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn leaf_digraph(node_count: usize, pairs: impl IntoIterator<Item = (usize, usize)>) -> DiGraph<(), ()> {
    let mut graph = DiGraph::new();
    for _ in 0..node_count {
        graph.add_node(());
    }
    for (source, target) in pairs {
        graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
    }
    graph
}

/// Reverses every back edge found by a depth-first search started from the
/// leaves in declaration order.
pub fn break_cycles(graph: &LeafGraph) -> AcyclicEdges {
    let digraph = leaf_digraph(
        graph.node_count(),
        graph.edges().iter().map(|edge| (edge.source(), edge.target())),
    );

    let mut back_edges = HashSet::new();
    depth_first_search(&digraph, digraph.node_indices(), |event| {
        if let DfsEvent::BackEdge(from, to) = event {
            back_edges.insert((from.index(), to.index()));
        }
    });

    let mut edges = AcyclicEdges::default();
    for edge in graph.edges() {
        let flip = back_edges.contains(&(edge.source(), edge.target()));
        edges.pairs.push(if flip {
            (edge.target(), edge.source())
        } else {
            (edge.source(), edge.target())
        });
        edges.reversed.push(flip);
    }

    if !back_edges.is_empty() {
        debug!(reversed = back_edges.len(); "Reversed back edges for ranking");
    }
    edges
}

/// Longest-path layering: every leaf sits one rank below its deepest
/// predecessor.
///
/// Leaves without edges share one extra rank after the last connected
/// rank, or rank 0 when there are no edges at all.
pub fn longest_path_ranks(node_count: usize, edges: &AcyclicEdges) -> Vec<usize> {
    let digraph = leaf_digraph(node_count, edges.pairs().iter().copied());
    let order = match toposort(&digraph, None) {
        Ok(order) => order,
        Err(cycle) => {
            warn!(leaf = cycle.node_id().index(); "Cycle left after cycle breaking, ranking in declaration order");
            digraph.node_indices().collect()
        }
    };

    let mut ranks = vec![0; node_count];
    for node in order {
        let next = ranks[node.index()] + 1;
        for successor in digraph.neighbors(node) {
            ranks[successor.index()] = ranks[successor.index()].max(next);
        }
    }

    if !edges.is_empty() {
        let mut connected = vec![false; node_count];
        for &(upper, lower) in edges.pairs() {
            connected[upper] = true;
            connected[lower] = true;
        }
        let isolated_rank = ranks
            .iter()
            .zip(&connected)
            .filter(|(_, linked)| **linked)
            .map(|(rank, _)| *rank + 1)
            .max()
            .unwrap_or(0);
        for (rank, linked) in ranks.iter_mut().zip(&connected) {
            if !linked {
                *rank = isolated_rank;
            }
        }
    }

    ranks
}

/// How edges spanning more than one rank are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongEdges {
    /// One virtual slot per intermediate rank; the path bends through them.
    Virtual,
    /// No virtual slots; the path is a straight segment.
    Straight,
}

/// Leaves and virtual edge points arranged in ranks.
///
/// Slots `0..leaf_count` are the leaves; any further slot is a virtual
/// point of a long edge and has no extent.
#[derive(Debug, Clone)]
pub struct RankedGraph {
    leaf_count: usize,
    slot_sizes: Vec<Size>,
    layers: Vec<Vec<usize>>,
    /// Per edge, its slots from the upper to the lower endpoint
    chains: Vec<Vec<usize>>,
    reversed: Vec<bool>,
    upper: Vec<Vec<usize>>,
    lower: Vec<Vec<usize>>,
}

impl RankedGraph {
    pub fn new(
        graph: &LeafGraph,
        edges: &AcyclicEdges,
        ranks: &[usize],
        long_edges: LongEdges,
    ) -> Self {
        let leaf_count = graph.node_count();
        let mut slot_sizes = graph.sizes().to_vec();
        let mut slot_ranks = ranks.to_vec();
        let mut chains = Vec::with_capacity(edges.pairs().len());

        for &(upper, lower) in edges.pairs() {
            let mut chain = vec![upper];
            if long_edges == LongEdges::Virtual {
                for rank in ranks[upper] + 1..ranks[lower] {
                    chain.push(slot_sizes.len());
                    slot_sizes.push(Size::default());
                    slot_ranks.push(rank);
                }
            }
            chain.push(lower);
            chains.push(chain);
        }

        let layer_count = slot_ranks.iter().max().map_or(0, |max| max + 1);
        let mut layers = vec![Vec::new(); layer_count];
        for (slot, &rank) in slot_ranks.iter().enumerate() {
            layers[rank].push(slot);
        }

        let mut upper_neighbours = vec![Vec::new(); slot_sizes.len()];
        let mut lower_neighbours = vec![Vec::new(); slot_sizes.len()];
        for chain in &chains {
            for pair in chain.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                if slot_ranks[from] + 1 == slot_ranks[to] {
                    lower_neighbours[from].push(to);
                    upper_neighbours[to].push(from);
                }
            }
        }

        let reversed = (0..chains.len()).map(|edge| edges.is_reversed(edge)).collect();

        Self {
            leaf_count,
            slot_sizes,
            layers,
            chains,
            reversed,
            upper: upper_neighbours,
            lower: lower_neighbours,
        }
    }

    pub fn layers(&self) -> &[Vec<usize>] {
        &self.layers
    }

    /// Stable-sorts every rank with `compare`.
    pub fn sort_layers_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(usize, usize) -> Ordering,
    {
        for layer in &mut self.layers {
            layer.sort_by(|&a, &b| compare(a, b));
        }
    }

    /// Index of every slot within its rank.
    fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.slot_sizes.len()];
        for layer in &self.layers {
            for (position, &slot) in layer.iter().enumerate() {
                positions[slot] = position;
            }
        }
        positions
    }

    /// Number of pairwise segment crossings between adjacent ranks.
    pub fn crossings(&self) -> usize {
        let positions = self.positions();
        let mut total = 0;
        for layer in &self.layers {
            let segments: Vec<(usize, usize)> = layer
                .iter()
                .flat_map(|&slot| {
                    self.lower[slot]
                        .iter()
                        .map(move |&below| (slot, below))
                })
                .map(|(slot, below)| (positions[slot], positions[below]))
                .collect();
            for (i, &(a1, b1)) in segments.iter().enumerate() {
                for &(a2, b2) in &segments[i + 1..] {
                    if (a1 < a2 && b1 > b2) || (a1 > a2 && b1 < b2) {
                        total += 1;
                    }
                }
            }
        }
        total
    }

    /// Barycenter sweeps, downward on even passes and upward on odd ones.
    ///
    /// Keeps the ordering with the fewest crossings seen, starting from the
    /// current one.
    pub fn minimize_crossings(&mut self) {
        let mut best_layers = self.layers.clone();
        let mut best_crossings = self.crossings();
        let initial_crossings = best_crossings;

        for pass in 0..ORDERING_PASSES {
            if best_crossings == 0 {
                break;
            }
            if pass % 2 == 0 {
                for rank in 1..self.layers.len() {
                    self.reorder(rank, true);
                }
            } else {
                for rank in (0..self.layers.len().saturating_sub(1)).rev() {
                    self.reorder(rank, false);
                }
            }

            let crossings = self.crossings();
            if crossings < best_crossings {
                best_crossings = crossings;
                best_layers.clone_from(&self.layers);
            }
        }

        self.layers = best_layers;
        debug!(
            before = initial_crossings,
            after = best_crossings;
            "Crossing minimization finished"
        );
    }

    /// Sorts one rank by the mean position of its neighbours in the rank
    /// above (`from_above`) or below. Slots without such neighbours keep
    /// their current index as key.
    fn reorder(&mut self, rank: usize, from_above: bool) {
        let positions = self.positions();
        let neighbours = if from_above { &self.upper } else { &self.lower };

        let mut keyed: Vec<(f32, usize)> = self.layers[rank]
            .iter()
            .enumerate()
            .map(|(index, &slot)| {
                let adjacent = &neighbours[slot];
                let key = if adjacent.is_empty() {
                    index as f32
                } else {
                    let sum: usize = adjacent.iter().map(|&n| positions[n]).sum();
                    sum as f32 / adjacent.len() as f32
                };
                (key, slot)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        self.layers[rank] = keyed.into_iter().map(|(_, slot)| slot).collect();
    }

    fn gap(&self, before: usize, after: usize, options: &LayoutOptions) -> f32 {
        if before < self.leaf_count && after < self.leaf_count {
            options.node_separation()
        } else {
            options.edge_separation()
        }
    }

    /// Turns ranks and in-rank order into coordinates.
    ///
    /// Ranks advance along the direction's primary axis by their thickest
    /// element plus the rank separation. Within a rank slots are packed with
    /// the node or edge separation, and each rank is centered on the widest
    /// one.
    pub fn assign_coordinates(&self, options: &LayoutOptions) -> LeafLayout {
        if self.leaf_count == 0 {
            return LeafLayout::default();
        }

        let direction = options.direction();
        let vertical = direction.is_vertical();
        let along = |size: Size| if vertical { size.height() } else { size.width() };
        let across = |size: Size| if vertical { size.width() } else { size.height() };

        let mut rank_centers = Vec::with_capacity(self.layers.len());
        let mut offset = 0.0_f32;
        for layer in &self.layers {
            let thickness = layer
                .iter()
                .map(|&slot| along(self.slot_sizes[slot]))
                .fold(0.0_f32, f32::max);
            rank_centers.push(offset + thickness / 2.0);
            offset += thickness + options.rank_separation();
        }

        let mut cross = vec![0.0_f32; self.slot_sizes.len()];
        let mut extents = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let mut cursor = 0.0_f32;
            let mut previous = None;
            for &slot in layer {
                if let Some(before) = previous {
                    cursor += self.gap(before, slot, options);
                }
                let extent = across(self.slot_sizes[slot]);
                cross[slot] = cursor + extent / 2.0;
                cursor += extent;
                previous = Some(slot);
            }
            extents.push(cursor);
        }
        let widest = extents.iter().copied().fold(0.0_f32, f32::max);
        for (layer, extent) in self.layers.iter().zip(&extents) {
            let shift = (widest - extent) / 2.0;
            for &slot in layer {
                cross[slot] += shift;
            }
        }

        let sign = if direction.is_reversed() { -1.0 } else { 1.0 };
        let mut points = vec![Point::default(); self.slot_sizes.len()];
        for (rank, layer) in self.layers.iter().enumerate() {
            let primary = sign * rank_centers[rank];
            for &slot in layer {
                points[slot] = if vertical {
                    Point::new(cross[slot], primary)
                } else {
                    Point::new(primary, cross[slot])
                };
            }
        }

        let (min_x, min_y) = points[..self.leaf_count]
            .iter()
            .zip(&self.slot_sizes)
            .fold((f32::INFINITY, f32::INFINITY), |(min_x, min_y), (center, size)| {
                let corner = center.to_bounds(*size).min_point();
                (min_x.min(corner.x()), min_y.min(corner.y()))
            });
        let offset = Point::new(options.margin_x() - min_x, options.margin_y() - min_y);
        for point in &mut points {
            *point = point.add_point(offset);
        }

        let paths = self
            .chains
            .iter()
            .zip(&self.reversed)
            .map(|(chain, &reversed)| {
                let mut path: Vec<Point> = chain.iter().map(|&slot| points[slot]).collect();
                if reversed {
                    path.reverse();
                }
                path
            })
            .collect();

        points.truncate(self.leaf_count);
        let layout = LeafLayout::new(points, paths);
        trace!(layout:?; "Leaf coordinates assigned");
        layout
    }
}
