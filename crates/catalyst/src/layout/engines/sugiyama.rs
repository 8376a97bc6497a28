use std::collections::HashMap;

use indexmap::IndexSet;
use log::{debug, warn};
use rust_sugiyama::configure::Config;

use super::{
    LeafEngine, LeafGraph, LeafLayout, layered,
    ranks::{self, AcyclicEdges, LongEdges, RankedGraph},
};
use crate::config::LayoutOptions;

/// Levels closer than this belong to the same rank.
const LEVEL_TOLERANCE: f64 = 1e-3;

/// Per connected component: vertex coordinates, width and height.
type Components = Vec<(Vec<(usize, (f64, f64))>, f64, f64)>;

/// The Sugiyama layout engine for leaf graphs.
///
/// Delegates ranking and in-rank ordering to the rust-sugiyama crate and
/// only keeps the resulting order; coordinates use the same rank packing as
/// the layered engine. Falls back to the layered engine when the crate
/// panics or its result does not cover every connected leaf.
#[derive(Debug, Default)]
pub struct Engine {
    fallback: layered::Engine,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    fn run_sugiyama(edges: &AcyclicEdges) -> Option<Components> {
        let unique: IndexSet<(u32, u32)> = edges
            .pairs()
            .iter()
            .filter_map(|&(upper, lower)| {
                Some((u32::try_from(upper).ok()?, u32::try_from(lower).ok()?))
            })
            .collect();
        let sugiyama_edges: Vec<(u32, u32)> = unique.into_iter().collect();

        debug!(
            edges = sugiyama_edges.len();
            "Applying Sugiyama algorithm to leaf graph"
        );

        // The crate panics on some inputs; those are recovered here.
        let layouts = std::panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing: 3.0,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&sugiyama_edges, &config)
        });

        match layouts {
            Ok(components) if !components.is_empty() => Some(components),
            Ok(_) => {
                warn!("Rust-sugiyama returned empty layout results");
                None
            }
            Err(err) => {
                let message = err
                    .downcast_ref::<String>()
                    .map(String::as_str)
                    .or_else(|| err.downcast_ref::<&str>().copied())
                    .unwrap_or("unknown error");
                warn!(message; "Rust-sugiyama layout engine panicked");
                None
            }
        }
    }

    /// Derives ranks and an ordering key for every leaf.
    ///
    /// Each component's distinct levels become consecutive ranks, flipped
    /// when most edges would otherwise point upward. Components share ranks
    /// and are ordered by their position in `components`. Returns `None`
    /// when a connected leaf is missing from the result.
    fn ranks_from_components(
        node_count: usize,
        edges: &AcyclicEdges,
        components: &Components,
    ) -> Option<(Vec<usize>, Vec<(usize, f64)>)> {
        let mut connected = vec![false; node_count];
        for &(upper, lower) in edges.pairs() {
            connected[upper] = true;
            connected[lower] = true;
        }

        let mut ranks: Vec<Option<usize>> = vec![None; node_count];
        let mut keys = vec![(components.len(), 0.0); node_count];

        for (component, (coords, _, _)) in components.iter().enumerate() {
            let members: Vec<(usize, f64, f64)> = coords
                .iter()
                .filter(|(id, _)| *id < node_count && connected[*id])
                .map(|&(id, (x, y))| (id, x, y))
                .collect();

            let mut levels: Vec<f64> = members.iter().map(|&(_, _, y)| y).collect();
            levels.sort_by(f64::total_cmp);
            levels.dedup_by(|a, b| (*a - *b).abs() < LEVEL_TOLERANCE);

            let local: HashMap<usize, usize> = members
                .iter()
                .map(|&(id, _, y)| (id, levels.partition_point(|&level| level < y - LEVEL_TOLERANCE)))
                .collect();

            let (mut downward, mut upward) = (0, 0);
            for (upper, lower) in edges.pairs() {
                if let (Some(from), Some(to)) = (local.get(upper), local.get(lower)) {
                    if from < to {
                        downward += 1;
                    } else if from > to {
                        upward += 1;
                    }
                }
            }
            let flip = upward > downward;

            for &(id, x, _) in &members {
                let rank = local.get(&id).copied().unwrap_or(0);
                ranks[id] = Some(if flip { levels.len() - 1 - rank } else { rank });
                keys[id] = (component, x);
            }
        }

        let missing = (0..node_count).find(|&leaf| connected[leaf] && ranks[leaf].is_none());
        if let Some(leaf) = missing {
            warn!(leaf; "Leaf missing from rust-sugiyama result");
            return None;
        }

        let isolated_rank = ranks.iter().flatten().max().map_or(0, |max| max + 1);
        let ranks: Vec<usize> = ranks
            .into_iter()
            .enumerate()
            .map(|(leaf, rank)| {
                if let Some(rank) = rank {
                    rank
                } else {
                    keys[leaf] = (components.len(), leaf as f64);
                    isolated_rank
                }
            })
            .collect();
        Some((ranks, keys))
    }
}

impl LeafEngine for Engine {
    fn calculate(&self, graph: &LeafGraph, options: &LayoutOptions) -> LeafLayout {
        if graph.is_empty() {
            return LeafLayout::default();
        }

        let edges = ranks::break_cycles(graph);
        if edges.is_empty() {
            let flat = vec![0; graph.node_count()];
            return RankedGraph::new(graph, &edges, &flat, LongEdges::Straight)
                .assign_coordinates(options);
        }

        let Some((leaf_ranks, keys)) = Self::run_sugiyama(&edges)
            .and_then(|components| Self::ranks_from_components(graph.node_count(), &edges, &components))
        else {
            warn!("Falling back to layered leaf layout");
            return self.fallback.calculate(graph, options);
        };

        let mut ranked = RankedGraph::new(graph, &edges, &leaf_ranks, LongEdges::Straight);
        ranked.sort_layers_by(|a, b| {
            let (a_component, a_x) = keys[a];
            let (b_component, b_x) = keys[b];
            a_component.cmp(&b_component).then(a_x.total_cmp(&b_x))
        });
        ranked.assign_coordinates(options)
    }
}
