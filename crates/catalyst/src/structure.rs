//! Containment hierarchy of a diagram.
//!
//! [`Hierarchy`] flattens a forest of [`Entity`] values, nested or linked
//! through `parent` ids, into an index arena and validates that the result
//! is a proper forest. Every later layout stage addresses entities by arena
//! index.

use std::collections::{HashMap, VecDeque};

use log::{debug, trace};

use catalyst_core::model::Entity;

use crate::error::HierarchyError;

/// A validated containment forest over borrowed entities.
///
/// Arena indices follow document order: a pre-order walk over the input
/// slice and each entity's nested `children`.
#[derive(Debug)]
pub struct Hierarchy<'a> {
    entities: Vec<&'a Entity>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    index_of: HashMap<&'a str, usize>,
}

impl<'a> Hierarchy<'a> {
    /// Flattens and validates `entities`.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::DuplicateId`] when two entities share an id.
    /// - [`HierarchyError::ConflictingParent`] when a nested entity declares
    ///   a parent other than the entity it is nested in.
    /// - [`HierarchyError::UnknownParent`] when a declared parent does not exist.
    /// - [`HierarchyError::Cycle`] when parent links form a loop, leaving
    ///   entities unreachable from any root.
    pub fn build(entities: &'a [Entity]) -> Result<Self, HierarchyError> {
        let mut arena: Vec<&'a Entity> = Vec::new();
        let mut enclosing: Vec<Option<usize>> = Vec::new();
        let mut index_of: HashMap<&'a str, usize> = HashMap::new();

        let mut stack: Vec<(&'a Entity, Option<usize>)> =
            entities.iter().rev().map(|entity| (entity, None)).collect();
        while let Some((entity, outer)) = stack.pop() {
            let idx = arena.len();
            if index_of.insert(entity.id(), idx).is_some() {
                return Err(HierarchyError::DuplicateId(entity.id().to_string()));
            }
            arena.push(entity);
            enclosing.push(outer);
            stack.extend(
                entity
                    .children()
                    .iter()
                    .rev()
                    .map(|child| (child, Some(idx))),
            );
        }

        let mut parents = Vec::with_capacity(arena.len());
        for (idx, entity) in arena.iter().enumerate() {
            let parent = match (enclosing[idx], entity.parent()) {
                (Some(outer), Some(declared)) if arena[outer].id() != declared => {
                    return Err(HierarchyError::ConflictingParent {
                        id: entity.id().to_string(),
                        enclosing: arena[outer].id().to_string(),
                        declared: declared.to_string(),
                    });
                }
                (Some(outer), _) => Some(outer),
                (None, Some(declared)) => match index_of.get(declared) {
                    Some(&parent_idx) => Some(parent_idx),
                    None => {
                        return Err(HierarchyError::UnknownParent {
                            id: entity.id().to_string(),
                            parent: declared.to_string(),
                        });
                    }
                },
                (None, None) => None,
            };
            parents.push(parent);
        }

        let mut children = vec![Vec::new(); arena.len()];
        let mut roots = Vec::new();
        for (idx, parent) in parents.iter().enumerate() {
            match parent {
                Some(parent_idx) => children[*parent_idx].push(idx),
                None => roots.push(idx),
            }
        }

        // Entities on a parent cycle have no path from a root.
        let mut reached = vec![false; arena.len()];
        let mut queue: VecDeque<usize> = roots.iter().copied().collect();
        while let Some(idx) = queue.pop_front() {
            reached[idx] = true;
            queue.extend(children[idx].iter().copied());
        }
        if let Some(idx) = reached.iter().position(|seen| !seen) {
            return Err(HierarchyError::Cycle(arena[idx].id().to_string()));
        }

        debug!(entities = arena.len(), roots = roots.len(); "Hierarchy built");
        trace!(roots:?, children:?; "Hierarchy structure");

        Ok(Self {
            entities: arena,
            parents,
            children,
            roots,
            index_of,
        })
    }

    /// Number of entities in the arena
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, idx: usize) -> &'a Entity {
        self.entities[idx]
    }

    pub fn parent(&self, idx: usize) -> Option<usize> {
        self.parents[idx]
    }

    /// Children of `idx` in document order
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    /// Root entities in document order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn is_leaf(&self, idx: usize) -> bool {
        self.children[idx].is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of.get(id).copied()
    }

    /// Leaf indices in document order
    pub fn leaves(&self) -> Vec<usize> {
        (0..self.len()).filter(|&idx| self.is_leaf(idx)).collect()
    }

    /// Parents before children, siblings in document order.
    pub fn pre_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.children[idx].iter().rev().copied());
        }
        order
    }

    /// Children before parents.
    pub fn post_order(&self) -> Vec<usize> {
        let mut order = self.pre_order();
        order.reverse();
        order
    }
}

#[cfg(test)]
mod tests {
    use catalyst_core::model::ElementKind;

    use super::*;

    fn system(id: &str) -> Entity {
        Entity::new(id, ElementKind::System, id)
    }

    fn container(id: &str) -> Entity {
        Entity::new(id, ElementKind::Container, id)
    }

    fn component(id: &str) -> Entity {
        Entity::new(id, ElementKind::Component, id)
    }

    fn ids(hierarchy: &Hierarchy<'_>, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&idx| hierarchy.entity(idx).id().to_string())
            .collect()
    }

    #[test]
    fn test_nested_forest() {
        let entities = vec![
            system("s").with_child(container("c").with_children([component("x"), component("y")])),
            system("t"),
        ];
        let hierarchy = Hierarchy::build(&entities).expect("valid hierarchy");

        assert_eq!(hierarchy.len(), 5);
        assert_eq!(ids(&hierarchy, hierarchy.roots()), ["s", "t"]);
        assert_eq!(ids(&hierarchy, &hierarchy.leaves()), ["x", "y", "t"]);
        assert!(!hierarchy.is_leaf(hierarchy.index_of("s").expect("s exists")));

        let c = hierarchy.index_of("c").expect("c exists");
        assert_eq!(ids(&hierarchy, hierarchy.children(c)), ["x", "y"]);
        assert_eq!(hierarchy.parent(c), hierarchy.index_of("s"));
    }

    #[test]
    fn test_flat_and_mixed_links() {
        let entities = vec![
            system("s").with_child(container("c1")),
            container("c2").with_parent("s"),
            component("x").with_parent("c2"),
            component("y").with_parent("c1"),
        ];
        let hierarchy = Hierarchy::build(&entities).expect("valid hierarchy");

        let s = hierarchy.index_of("s").expect("s exists");
        assert_eq!(ids(&hierarchy, hierarchy.roots()), ["s"]);
        assert_eq!(ids(&hierarchy, hierarchy.children(s)), ["c1", "c2"]);
        assert_eq!(ids(&hierarchy, &hierarchy.leaves()), ["x", "y"]);
    }

    #[test]
    fn test_nested_entity_may_repeat_its_parent() {
        let entities = vec![system("s").with_child(container("c").with_parent("s"))];
        assert!(Hierarchy::build(&entities).is_ok());
    }

    #[test]
    fn test_traversal_orders() {
        let entities = vec![
            system("s").with_children([container("c").with_child(component("x")), component("y")]),
            component("z").with_parent("c"),
        ];
        let hierarchy = Hierarchy::build(&entities).expect("valid hierarchy");

        assert_eq!(ids(&hierarchy, &hierarchy.pre_order()), ["s", "c", "x", "z", "y"]);

        let post = hierarchy.post_order();
        let position = |id: &str| {
            let idx = hierarchy.index_of(id).expect("id exists");
            post.iter().position(|&p| p == idx).expect("visited")
        };
        assert!(position("x") < position("c"));
        assert!(position("z") < position("c"));
        assert!(position("c") < position("s"));
        assert!(position("y") < position("s"));
    }

    #[test]
    fn test_duplicate_id() {
        let entities = vec![system("s").with_child(component("x")), component("x")];
        assert_eq!(
            Hierarchy::build(&entities).unwrap_err(),
            HierarchyError::DuplicateId("x".to_string())
        );
    }

    #[test]
    fn test_unknown_parent() {
        let entities = vec![system("s"), component("x").with_parent("missing")];
        assert_eq!(
            Hierarchy::build(&entities).unwrap_err(),
            HierarchyError::UnknownParent {
                id: "x".to_string(),
                parent: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_conflicting_parent() {
        let entities = vec![
            system("s").with_child(component("x").with_parent("t")),
            system("t"),
        ];
        assert!(matches!(
            Hierarchy::build(&entities),
            Err(HierarchyError::ConflictingParent { .. })
        ));
    }

    #[test]
    fn test_parent_cycle() {
        let entities = vec![
            system("root"),
            container("a").with_parent("b"),
            container("b").with_parent("a"),
        ];
        assert_eq!(
            Hierarchy::build(&entities).unwrap_err(),
            HierarchyError::Cycle("a".to_string())
        );
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let entities = vec![component("x").with_parent("x")];
        assert!(matches!(
            Hierarchy::build(&entities),
            Err(HierarchyError::Cycle(id)) if id == "x"
        ));
    }

    #[test]
    fn test_empty_input() {
        let hierarchy = Hierarchy::build(&[]).expect("empty forest is valid");
        assert_eq!(hierarchy.len(), 0);
        assert!(hierarchy.pre_order().is_empty());
        assert!(hierarchy.leaves().is_empty());
    }
}
