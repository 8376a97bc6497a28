//! Configuration types for Catalyst layout.
//!
//! All types implement [`serde::Deserialize`] so a configuration can be loaded
//! from TOML (see [`LayoutConfig::from_toml_str`]) or any other serde format.
//! Every section falls back to its defaults when omitted.
//!
//! # Overview
//!
//! - [`LayoutConfig`] - Top-level configuration combining all sections.
//! - [`LayoutOptions`] - Graph layout options (direction and separations).
//! - [`EngineKind`] - Which leaf layout engine to run.
//! - [`PlacementConfig`] - Root grid wrapping and interior stacking.
//! - [`RoutingConfig`] - Edge point reduction.
//! - [`CanvasConfig`] - Minimum canvas dimensions.
//! - [`ElementMetricsConfig`] - Default size and padding per [`ElementKind`].
//!
//! # Example
//!
//! ```
//! # use catalyst::config::{Direction, LayoutConfig};
//! let config = LayoutConfig::from_toml_str(
//!     r#"
//!     [options]
//!     direction = "LR"
//!     ranksep = 80
//!     "#,
//! )
//! .expect("valid configuration");
//!
//! assert_eq!(config.options().direction(), Direction::LeftToRight);
//! assert_eq!(config.options().rank_separation(), 80.0);
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

use catalyst_core::{
    geometry::{Insets, Size},
    model::ElementKind,
};

use crate::error::ConfigError;

/// Top-level layout configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LayoutConfig {
    #[serde(default)]
    options: LayoutOptions,

    #[serde(default)]
    engine: EngineKind,

    #[serde(default)]
    placement: PlacementConfig,

    #[serde(default)]
    routing: RoutingConfig,

    #[serde(default)]
    canvas: CanvasConfig,

    #[serde(default)]
    elements: ElementMetricsConfig,
}

impl LayoutConfig {
    /// Parses a TOML document and validates every value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not valid TOML or does
    /// not match the configuration schema. Out-of-range numbers are not
    /// errors; they are replaced by defaults (see [`LayoutConfig::validated`]).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Ok(config.validated())
    }

    /// Returns a copy where every non-finite or out-of-range value has been
    /// replaced by its default, logging a warning for each replacement.
    pub fn validated(self) -> Self {
        Self {
            options: self.options.validated(),
            engine: self.engine,
            placement: self.placement.validated(),
            routing: self.routing.validated(),
            canvas: self.canvas.validated(),
            elements: self.elements.validated(),
        }
    }

    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_canvas(mut self, canvas: CanvasConfig) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_elements(mut self, elements: ElementMetricsConfig) -> Self {
        self.elements = elements;
        self
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    pub fn placement(&self) -> &PlacementConfig {
        &self.placement
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    pub fn elements(&self) -> &ElementMetricsConfig {
        &self.elements
    }
}

/// Primary axis of the leaf graph layout.
///
/// Accepts both the long names and the short `TB`/`BT`/`LR`/`RL` forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "top_to_bottom", alias = "TB", alias = "TopToBottom")]
    TopToBottom,

    #[serde(rename = "bottom_to_top", alias = "BT", alias = "BottomToTop")]
    BottomToTop,

    #[serde(rename = "left_to_right", alias = "LR", alias = "LeftToRight")]
    LeftToRight,

    #[serde(rename = "right_to_left", alias = "RL", alias = "RightToLeft")]
    RightToLeft,
}

impl Direction {
    /// Returns true when ranks are stacked along the y axis
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TopToBottom | Direction::BottomToTop)
    }

    /// Returns true when ranks advance towards negative coordinates
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::BottomToTop | Direction::RightToLeft)
    }
}

/// Options of the leaf graph layout.
///
/// Field names also accept the short names used by dagre-style tools
/// (`nodesep`, `edgesep`, `ranksep`, `marginx`, `marginy`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutOptions {
    #[serde(alias = "layoutDirection", alias = "rankdir")]
    direction: Direction,

    /// Space between neighbouring leaves in the same rank
    #[serde(alias = "nodesep", alias = "nodeSeparation")]
    node_separation: f32,

    /// Space around virtual edge points in a rank
    #[serde(alias = "edgesep", alias = "edgeSeparation")]
    edge_separation: f32,

    /// Space between consecutive ranks
    #[serde(alias = "ranksep", alias = "rankSeparation")]
    rank_separation: f32,

    #[serde(alias = "marginx", alias = "marginX")]
    margin_x: f32,

    #[serde(alias = "marginy", alias = "marginY")]
    margin_y: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: Direction::TopToBottom,
            node_separation: 50.0,
            edge_separation: 10.0,
            rank_separation: 50.0,
            margin_x: 20.0,
            margin_y: 20.0,
        }
    }
}

impl LayoutOptions {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_node_separation(mut self, separation: f32) -> Self {
        self.node_separation = separation;
        self
    }

    pub fn with_edge_separation(mut self, separation: f32) -> Self {
        self.edge_separation = separation;
        self
    }

    pub fn with_rank_separation(mut self, separation: f32) -> Self {
        self.rank_separation = separation;
        self
    }

    pub fn with_margins(mut self, margin_x: f32, margin_y: f32) -> Self {
        self.margin_x = margin_x;
        self.margin_y = margin_y;
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn node_separation(&self) -> f32 {
        self.node_separation
    }

    pub fn edge_separation(&self) -> f32 {
        self.edge_separation
    }

    pub fn rank_separation(&self) -> f32 {
        self.rank_separation
    }

    pub fn margin_x(&self) -> f32 {
        self.margin_x
    }

    pub fn margin_y(&self) -> f32 {
        self.margin_y
    }

    /// Separations must be positive; margins may be zero.
    fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            direction: self.direction,
            node_separation: positive_or(
                "node_separation",
                self.node_separation,
                defaults.node_separation,
            ),
            edge_separation: positive_or(
                "edge_separation",
                self.edge_separation,
                defaults.edge_separation,
            ),
            rank_separation: positive_or(
                "rank_separation",
                self.rank_separation,
                defaults.rank_separation,
            ),
            margin_x: non_negative_or("margin_x", self.margin_x, defaults.margin_x),
            margin_y: non_negative_or("margin_y", self.margin_y, defaults.margin_y),
        }
    }
}

/// Leaf layout engine selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Built-in layered layout with deterministic cycle breaking.
    #[default]
    Layered,

    /// Ranking and ordering delegated to the `rust-sugiyama` crate.
    Sugiyama,
}

/// Placement of root clusters and of children inside clusters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Root clusters wrap onto a new row past this width
    max_row_width: f32,

    /// Gap between root clusters, both within a row and between rows
    cluster_spacing: f32,

    /// Vertical gap between stacked children of a cluster
    child_spacing: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_row_width: 1600.0,
            cluster_spacing: 40.0,
            child_spacing: 20.0,
        }
    }
}

impl PlacementConfig {
    pub fn new(max_row_width: f32, cluster_spacing: f32, child_spacing: f32) -> Self {
        Self {
            max_row_width,
            cluster_spacing,
            child_spacing,
        }
    }

    pub fn max_row_width(&self) -> f32 {
        self.max_row_width
    }

    pub fn cluster_spacing(&self) -> f32 {
        self.cluster_spacing
    }

    pub fn child_spacing(&self) -> f32 {
        self.child_spacing
    }

    fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            max_row_width: positive_or("max_row_width", self.max_row_width, defaults.max_row_width),
            cluster_spacing: non_negative_or(
                "cluster_spacing",
                self.cluster_spacing,
                defaults.cluster_spacing,
            ),
            child_spacing: non_negative_or(
                "child_spacing",
                self.child_spacing,
                defaults.child_spacing,
            ),
        }
    }
}

/// Edge routing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Upper bound on points per edge, endpoints included
    max_edge_points: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self { max_edge_points: 4 }
    }
}

impl RoutingConfig {
    /// Smallest accepted point budget: the two endpoints.
    pub const MIN_EDGE_POINTS: usize = 2;

    pub fn new(max_edge_points: usize) -> Self {
        Self { max_edge_points }
    }

    pub fn max_edge_points(&self) -> usize {
        self.max_edge_points
    }

    fn validated(self) -> Self {
        if self.max_edge_points < Self::MIN_EDGE_POINTS {
            warn!(
                option = "max_edge_points",
                value = self.max_edge_points;
                "Edge point budget below minimum, clamping"
            );
            return Self::new(Self::MIN_EDGE_POINTS);
        }
        self
    }
}

/// Lower bounds for the reported canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasConfig {
    min_width: f32,
    min_height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_width: 800.0,
            min_height: 600.0,
        }
    }
}

impl CanvasConfig {
    pub fn new(min_width: f32, min_height: f32) -> Self {
        Self {
            min_width,
            min_height,
        }
    }

    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            min_width: positive_or("min_width", self.min_width, defaults.min_width),
            min_height: positive_or("min_height", self.min_height, defaults.min_height),
        }
    }
}

/// Dimensions of one element kind.
///
/// Leaves are laid out at `default_size`. Clusters grow to fit their
/// children plus `padding`, never shrinking below `min_size`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ElementMetrics {
    default_size: Size,
    min_size: Size,
    /// Space between a cluster's border and its children; the top side
    /// reserves the title area.
    padding: Insets,
    /// Extra top space for clusters that show a technology line
    title_clearance: f32,
}

impl ElementMetrics {
    pub fn new(default_size: Size, min_size: Size, padding: Insets, title_clearance: f32) -> Self {
        Self {
            default_size,
            min_size,
            padding,
            title_clearance,
        }
    }

    /// Built-in metrics for `kind`.
    pub fn for_kind(kind: ElementKind) -> Self {
        match kind {
            ElementKind::System => Self::new(
                Size::new(400.0, 300.0),
                Size::new(280.0, 180.0),
                Insets::new(70.0, 30.0, 30.0, 30.0),
                20.0,
            ),
            ElementKind::Container => Self::new(
                Size::new(320.0, 220.0),
                Size::new(240.0, 150.0),
                Insets::new(60.0, 25.0, 25.0, 25.0),
                15.0,
            ),
            ElementKind::Component => Self::new(
                Size::new(240.0, 120.0),
                Size::new(160.0, 80.0),
                Insets::new(40.0, 20.0, 20.0, 20.0),
                10.0,
            ),
        }
    }

    fn system() -> Self {
        Self::for_kind(ElementKind::System)
    }

    fn container() -> Self {
        Self::for_kind(ElementKind::Container)
    }

    fn component() -> Self {
        Self::for_kind(ElementKind::Component)
    }

    pub fn default_size(&self) -> Size {
        self.default_size
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn title_clearance(&self) -> f32 {
        self.title_clearance
    }

    fn validated(self, kind: ElementKind) -> Self {
        let defaults = Self::for_kind(kind);
        let mut metrics = self;
        if !metrics.default_size.is_usable() {
            warn!(kind = kind.as_str(); "Unusable default size, using built-in default");
            metrics.default_size = defaults.default_size;
        }
        if !metrics.min_size.is_usable() {
            warn!(kind = kind.as_str(); "Unusable minimum size, using built-in default");
            metrics.min_size = defaults.min_size;
        }
        if !metrics.padding.is_valid() {
            warn!(kind = kind.as_str(); "Invalid padding, using built-in default");
            metrics.padding = defaults.padding;
        }
        metrics.title_clearance =
            non_negative_or("title_clearance", metrics.title_clearance, defaults.title_clearance);
        metrics
    }
}

/// Per-kind [`ElementMetrics`].
///
/// A kind's section must be given in full when present.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ElementMetricsConfig {
    #[serde(default = "ElementMetrics::system")]
    system: ElementMetrics,

    #[serde(default = "ElementMetrics::container")]
    container: ElementMetrics,

    #[serde(default = "ElementMetrics::component")]
    component: ElementMetrics,
}

impl Default for ElementMetricsConfig {
    fn default() -> Self {
        Self {
            system: ElementMetrics::system(),
            container: ElementMetrics::container(),
            component: ElementMetrics::component(),
        }
    }
}

impl ElementMetricsConfig {
    /// Returns the metrics used for `kind`
    pub fn metrics(&self, kind: ElementKind) -> &ElementMetrics {
        match kind {
            ElementKind::System => &self.system,
            ElementKind::Container => &self.container,
            ElementKind::Component => &self.component,
        }
    }

    /// Replaces the metrics of one kind
    pub fn with_metrics(mut self, kind: ElementKind, metrics: ElementMetrics) -> Self {
        match kind {
            ElementKind::System => self.system = metrics,
            ElementKind::Container => self.container = metrics,
            ElementKind::Component => self.component = metrics,
        }
        self
    }

    fn validated(self) -> Self {
        Self {
            system: self.system.validated(ElementKind::System),
            container: self.container.validated(ElementKind::Container),
            component: self.component.validated(ElementKind::Component),
        }
    }
}

fn positive_or(name: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!(option = name, value = value, default = default; "Invalid option value, using default");
        default
    }
}

fn non_negative_or(name: &str, value: f32, default: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(option = name, value = value, default = default; "Invalid option value, using default");
        default
    }
}
