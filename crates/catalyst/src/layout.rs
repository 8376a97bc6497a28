//! Layout pipeline for architecture hierarchies.
//!
//! # Pipeline
//!
//! ```text
//! Hierarchy (validated entity arena)
//!     ↓ engines    leaf graph → solver centers and raw paths
//!     ↓ bounds     cluster sizes, bottom-up
//!     ↓ placement  absolute centers, top-down
//!     ↓ routing    re-anchored, sub-sampled, tagged edges
//!     ↓ result
//! LayoutResult
//! ```
//!
//! All intermediate state lives in a [`context::LayoutContext`] created per
//! call.

mod bounds;
mod context;
mod engines;
mod placement;
mod result;
mod routing;

pub use result::{EdgePoint, LayoutCluster, LayoutEdge, LayoutNode, LayoutResult, PointRole};

use log::{debug, trace};

use catalyst_core::model::Relation;

use crate::{config::LayoutConfig, structure::Hierarchy};

use context::LayoutContext;
use engines::EngineBuilder;

/// Runs every stage over a validated hierarchy.
pub fn compute(hierarchy: Hierarchy<'_>, relations: &[Relation], config: &LayoutConfig) -> LayoutResult {
    let mut ctx = LayoutContext::new(hierarchy, config);

    let graph = ctx.leaf_graph(relations);
    let mut engines = EngineBuilder::new();
    let solved = engines
        .leaf_engine(config.engine())
        .calculate(&graph, config.options());
    debug!(leaves = solved.centers().len(); "Leaf layout solved");
    trace!(solved:?; "Leaf layout");
    ctx.set_solver_layout(solved);

    bounds::calculate(&mut ctx);
    placement::place(&mut ctx);

    let edges = routing::route_relations(&ctx, &graph, relations);
    result::assemble(&ctx, edges)
}
