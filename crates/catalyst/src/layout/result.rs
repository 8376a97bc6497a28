//! Layout output types and their assembly.

use log::trace;
use serde::{Deserialize, Serialize};

use catalyst_core::{
    geometry::{Point, Size},
    model::Relation,
};

use super::context::LayoutContext;

/// A positioned leaf element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    id: String,
    width: f32,
    height: f32,
    x: f32,
    y: f32,
}

impl LayoutNode {
    pub fn new(id: impl Into<String>, center: Point, size: Size) -> Self {
        Self {
            id: id.into(),
            width: size.width(),
            height: size.height(),
            x: center.x(),
            y: center.y(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Center x-coordinate
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Center y-coordinate
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A positioned element that contains other elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutCluster {
    id: String,
    width: f32,
    height: f32,
    x: f32,
    y: f32,
    child_ids: Vec<String>,
}

impl LayoutCluster {
    pub fn new(id: impl Into<String>, center: Point, size: Size, child_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            width: size.width(),
            height: size.height(),
            x: center.x(),
            y: center.y(),
            child_ids,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Ids of the direct children in document order
    pub fn child_ids(&self) -> &[String] {
        &self.child_ids
    }
}

/// Role of a point along an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointRole {
    Source,
    Waypoint,
    Target,
}

/// One point of a routed edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePoint {
    x: f32,
    y: f32,
    role: PointRole,
}

impl EdgePoint {
    pub fn new(position: Point, role: PointRole) -> Self {
        Self {
            x: position.x(),
            y: position.y(),
            role,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn role(&self) -> PointRole {
        self.role
    }
}

/// A routed relation.
///
/// Always carries at least two points: the first tagged
/// [`PointRole::Source`], the last [`PointRole::Target`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    source: String,
    target: String,
    #[serde(default)]
    label: String,
    points: Vec<EdgePoint>,
}

impl LayoutEdge {
    pub fn new(relation: &Relation, points: Vec<EdgePoint>) -> Self {
        Self {
            source: relation.source().to_string(),
            target: relation.target().to_string(),
            label: relation.label().to_string(),
            points,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[EdgePoint] {
        &self.points
    }
}

/// Complete geometry of a diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    nodes: Vec<LayoutNode>,
    clusters: Vec<LayoutCluster>,
    edges: Vec<LayoutEdge>,
    total_width: f32,
    total_height: f32,
}

impl LayoutResult {
    /// Leaves in document order
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    /// Containing elements in document order
    pub fn clusters(&self) -> &[LayoutCluster] {
        &self.clusters
    }

    /// Routed relations in relation order
    pub fn edges(&self) -> &[LayoutEdge] {
        &self.edges
    }

    pub fn total_width(&self) -> f32 {
        self.total_width
    }

    pub fn total_height(&self) -> f32 {
        self.total_height
    }

    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn cluster(&self, id: &str) -> Option<&LayoutCluster> {
        self.clusters.iter().find(|cluster| cluster.id == id)
    }
}

/// Collects the context's final geometry and the routed edges.
pub fn assemble(ctx: &LayoutContext<'_>, edges: Vec<LayoutEdge>) -> LayoutResult {
    let hierarchy = &ctx.hierarchy;
    let mut nodes = Vec::new();
    let mut clusters = Vec::new();
    let mut total_width = 0.0_f32;
    let mut total_height = 0.0_f32;

    for idx in 0..hierarchy.len() {
        let entity = hierarchy.entity(idx);
        let (center, size) = (ctx.center(idx), ctx.size(idx));
        let bounds = ctx.bounds(idx);
        total_width = total_width.max(bounds.max_x());
        total_height = total_height.max(bounds.max_y());

        if hierarchy.is_leaf(idx) {
            nodes.push(LayoutNode::new(entity.id(), center, size));
        } else {
            let child_ids = hierarchy
                .children(idx)
                .iter()
                .map(|&child| hierarchy.entity(child).id().to_string())
                .collect();
            clusters.push(LayoutCluster::new(entity.id(), center, size, child_ids));
        }
    }

    let canvas = ctx.config.canvas();
    let result = LayoutResult {
        nodes,
        clusters,
        edges,
        total_width: total_width.max(canvas.min_width()),
        total_height: total_height.max(canvas.min_height()),
    };
    trace!(result:?; "Layout assembled");
    result
}
