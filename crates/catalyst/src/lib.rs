//! Catalyst - Hierarchical layout for C4 architecture diagrams.
//!
//! Turns a forest of Systems, Containers and Components plus the relations
//! between them into absolute geometry: a size and center for every element
//! and a short point sequence for every relation. Parsing the diagram source
//! and writing the output format are left to the caller; both sides exchange
//! the types of [`catalyst_core`].
//!
//! Leaves are laid out as a layered directed graph. Clusters are then sized
//! bottom-up around their stacked children and placed top-down, root clusters
//! on a wrapping grid.

pub mod config;

mod error;
mod layout;
mod structure;

pub use catalyst_core::{geometry, model};

pub use error::{ConfigError, HierarchyError, LayoutError};
pub use layout::{EdgePoint, LayoutCluster, LayoutEdge, LayoutNode, LayoutResult, PointRole};

use log::{debug, info};

use config::{LayoutConfig, LayoutOptions};
use model::{Entity, Relation};
use structure::Hierarchy;

/// Builder for laying out architecture diagrams.
///
/// # Examples
///
/// ```rust
/// use catalyst::{
///     DiagramLayout,
///     config::LayoutConfig,
///     model::{ElementKind, Entity, Relation},
/// };
///
/// let entities = vec![
///     Entity::new("shop", ElementKind::System, "Shop")
///         .with_child(Entity::new("api", ElementKind::Container, "API")),
///     Entity::new("bank", ElementKind::System, "Bank"),
/// ];
/// let relations = vec![Relation::new("api", "bank").with_label("Charges")];
///
/// let layout = DiagramLayout::new(LayoutConfig::default())
///     .compute(&entities, &relations)
///     .expect("valid hierarchy");
///
/// assert_eq!(layout.nodes().len(), 2);
/// assert_eq!(layout.clusters().len(), 1);
/// assert_eq!(layout.edges().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DiagramLayout {
    config: LayoutConfig,
}

impl DiagramLayout {
    /// Create a new layout builder with the given configuration.
    ///
    /// Out-of-range values are replaced by their defaults.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config: config.validated(),
        }
    }

    /// Create a layout builder from a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Config`] if the document cannot be parsed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use catalyst::{DiagramLayout, config::Direction};
    ///
    /// let builder = DiagramLayout::from_toml_str("[options]\nrankdir = \"LR\"")
    ///     .expect("valid configuration");
    /// assert_eq!(builder.config().options().direction(), Direction::LeftToRight);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, LayoutError> {
        let config = LayoutConfig::from_toml_str(content)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out a diagram.
    ///
    /// # Arguments
    ///
    /// * `entities` - Root entities, with children nested or linked by `parent`
    /// * `relations` - Directed relations; those naming unknown entities are dropped
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidHierarchy`] when the entities do not form
    /// a forest: duplicate ids, unknown or conflicting parents, or parent
    /// cycles. Nothing is placed in that case.
    pub fn compute(
        &self,
        entities: &[Entity],
        relations: &[Relation],
    ) -> Result<LayoutResult, LayoutError> {
        info!(
            entities = entities.len(),
            relations = relations.len(),
            engine:? = self.config.engine();
            "Computing diagram layout"
        );

        let hierarchy = Hierarchy::build(entities)?;
        debug!(elements = hierarchy.len(); "Hierarchy validated");

        let result = layout::compute(hierarchy, relations, &self.config);
        info!(
            nodes = result.nodes().len(),
            clusters = result.clusters().len(),
            edges = result.edges().len();
            "Layout computed"
        );
        Ok(result)
    }
}

/// Lay out a diagram with default configuration and the given graph options.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidHierarchy`] when the entities do not form a
/// forest.
pub fn layout(
    entities: &[Entity],
    relations: &[Relation],
    options: LayoutOptions,
) -> Result<LayoutResult, LayoutError> {
    DiagramLayout::new(LayoutConfig::default().with_options(options)).compute(entities, relations)
}
