//! Architecture model exchanged with parsers and serializers.
//!
//! A diagram is a forest of [`Entity`] values (Systems containing Containers
//! containing Components) plus a flat list of [`Relation`]s between any two
//! entities. Parsers build these values; the layout pipeline only reads them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a name does not denote a supported element kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown element kind: {0}")]
pub struct UnknownElementKind(pub String);

/// The nesting level of an architecture element, outermost first.
///
/// The kind only selects default dimensions and padding during layout; it has
/// no influence on whether a hierarchy is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    System,
    Container,
    Component,
}

impl ElementKind {
    /// All kinds, outermost first.
    pub const ALL: [ElementKind; 3] = [
        ElementKind::System,
        ElementKind::Container,
        ElementKind::Component,
    ];

    /// Maps a C4-PlantUML element macro name to its kind.
    ///
    /// Database, queue and external variants collapse onto their base kind,
    /// so `ContainerDb_Ext` is a [`ElementKind::Container`].
    ///
    /// # Errors
    ///
    /// Returns [`UnknownElementKind`] for macros outside the three nesting
    /// levels, such as `Person` or `System_Boundary`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use catalyst_core::model::ElementKind;
    /// assert_eq!(ElementKind::from_c4_macro("SystemQueue_Ext"), Ok(ElementKind::System));
    /// assert!(ElementKind::from_c4_macro("Person").is_err());
    /// ```
    pub fn from_c4_macro(name: &str) -> Result<Self, UnknownElementKind> {
        let base = name.strip_suffix("_Ext").unwrap_or(name);
        let base = base
            .strip_suffix("Db")
            .or_else(|| base.strip_suffix("Queue"))
            .unwrap_or(base);

        match base {
            "System" => Ok(ElementKind::System),
            "Container" => Ok(ElementKind::Container),
            "Component" => Ok(ElementKind::Component),
            _ => Err(UnknownElementKind(name.to_string())),
        }
    }

    /// The canonical macro name of this kind
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::System => "System",
            ElementKind::Container => "Container",
            ElementKind::Component => "Component",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = UnknownElementKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_c4_macro(s)
    }
}

/// An architecture element and, transitively, everything it contains.
///
/// Children can be given by nesting (`children`) or by naming the enclosing
/// element in `parent` and listing the entity at the top level. Both forms may
/// be mixed within one diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: String,
    kind: ElementKind,
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Entity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
}

impl Entity {
    /// Creates a childless entity with the given id, kind and label.
    pub fn new(id: impl Into<String>, kind: ElementKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            technology: None,
            description: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Sets the technology line shown under the title
    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a nested child
    pub fn with_child(mut self, child: Entity) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several nested children in order
    pub fn with_children(mut self, children: impl IntoIterator<Item = Entity>) -> Self {
        self.children.extend(children);
        self
    }

    /// Names the enclosing entity for entities listed outside of it
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Nested children in declaration order
    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    /// Explicitly declared parent id, if any
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

/// Finds the entity with `id` anywhere in a nested forest.
///
/// The search is depth-first in declaration order and returns the first match.
pub fn find_entity<'a>(entities: &'a [Entity], id: &str) -> Option<&'a Entity> {
    let mut stack: Vec<&Entity> = entities.iter().rev().collect();
    while let Some(entity) = stack.pop() {
        if entity.id == id {
            return Some(entity);
        }
        stack.extend(entity.children.iter().rev());
    }
    None
}

/// A directed relation between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    source: String,
    target: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    description: String,
}

impl Relation {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: String::new(),
            description: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
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

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns true when the relation points back at its own source
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
