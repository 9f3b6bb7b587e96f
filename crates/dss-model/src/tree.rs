//! Arena-based specification tree.
//!
//! One [`SpecTree`] holds the full module/attribute hierarchy of a single
//! IOD. Nodes reference each other through [`NodeId`] handles into a flat
//! arena, so parent back-references never form language-level cycles.
//! Traversal is depth-first pre-order with the root excluded, matching the
//! order in which the rows are rendered.

use thiserror::Error;

/// Handle to a node inside a [`SpecTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Index of this node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Typed payload of a tree node, resolved once at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The tree root, carrying only the IOD title.
    Root,
    /// A module row of the IOD table.
    Module {
        /// Section reference, e.g. `"C.7.1.1"`.
        reference: String,
        /// Usage code, e.g. `"M"`, `"U"`, `"C"` (possibly with condition text).
        usage: String,
    },
    /// An attribute row inside a module.
    Attribute {
        /// Element tag, e.g. `"(0008,0016)"`.
        tag: String,
        /// Attribute type code, e.g. `"1"`, `"2C"`.
        attr_type: String,
        /// Free-text description.
        description: String,
    },
}

/// One node of the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecNode {
    /// Display name (module name or attribute name).
    pub name: String,
    /// Typed payload.
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Structural defects detected by [`SpecTree::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TreeError {
    /// A node carries an empty display name.
    #[error("node {index} has an empty name")]
    EmptyName {
        /// Arena index of the offending node.
        index: usize,
    },
    /// A non-root node has no parent reference.
    #[error("node {index} is detached from the tree")]
    Detached {
        /// Arena index of the offending node.
        index: usize,
    },
    /// Parent and child references disagree.
    #[error("node {child} and its parent {parent} have inconsistent links")]
    InconsistentLink {
        /// Arena index of the child node.
        child: usize,
        /// Arena index of the referenced parent node.
        parent: usize,
    },
}

/// Hierarchical parsed representation of one IOD's modules and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTree {
    nodes: Vec<SpecNode>,
}

impl SpecTree {
    /// Create a tree holding only its root node.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![SpecNode {
                name: root_name.into(),
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Handle of the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a child under `parent` and return its handle.
    ///
    /// # Panics
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SpecNode {
            name: name.into(),
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Borrow a node.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SpecNode {
        &self.nodes[id.0]
    }

    /// Child handles of `id`, in insertion order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent handle of `id`, `None` for the root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Number of nodes including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when the tree holds only its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Depth-first pre-order traversal, root excluded.
    pub fn walk(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack: Vec<NodeId> = self.children(self.root()).iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some(id)
        })
    }

    /// Slash-joined node names from the root down to `id`, root included.
    ///
    /// The path is the stable handle used to re-resolve a node after the
    /// view has been torn down and rebuilt.
    #[must_use]
    pub fn node_path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            names.push(self.nodes[current.0].name.as_str());
            cursor = self.nodes[current.0].parent;
        }
        names.reverse();
        names.join("/")
    }

    /// Resolve a path produced by [`node_path`](Self::node_path).
    ///
    /// Returns `None` when the path is empty, names a different root, or
    /// any segment has no matching child.
    #[must_use]
    pub fn node_by_path(&self, path: &str) -> Option<NodeId> {
        let mut segments = path.split('/');
        let root = self.root();
        if segments.next()? != self.nodes[root.0].name {
            return None;
        }
        let mut cursor = root;
        for segment in segments {
            cursor = *self
                .children(cursor)
                .iter()
                .find(|&&child| self.nodes[child.0].name == segment)?;
        }
        Some(cursor)
    }

    /// Check arena link consistency and node-name invariants.
    ///
    /// Used as a defensive contract check on trees produced by the external
    /// specification builder.
    pub fn validate(&self) -> Result<(), TreeError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.name.is_empty() {
                return Err(TreeError::EmptyName { index });
            }
            if index == 0 {
                continue;
            }
            let Some(parent) = node.parent else {
                return Err(TreeError::Detached { index });
            };
            let known_child = self
                .nodes
                .get(parent.0)
                .is_some_and(|p| p.children.contains(&NodeId(index)));
            if !known_child {
                return Err(TreeError::InconsistentLink {
                    child: index,
                    parent: parent.0,
                });
            }
        }
        for (index, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                if self.nodes.get(child.0).and_then(|c| c.parent) != Some(NodeId(index)) {
                    return Err(TreeError::InconsistentLink {
                        child: child.0,
                        parent: index,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> SpecTree {
        let mut tree = SpecTree::new("CR Image");
        let patient = tree.add_child(
            tree.root(),
            "Patient",
            NodeKind::Module {
                reference: "C.7.1.1".to_string(),
                usage: "M".to_string(),
            },
        );
        tree.add_child(
            patient,
            "Patient's Name",
            NodeKind::Attribute {
                tag: "(0010,0010)".to_string(),
                attr_type: "2".to_string(),
                description: "Patient's full name.".to_string(),
            },
        );
        tree.add_child(
            tree.root(),
            "General Study",
            NodeKind::Module {
                reference: "C.7.2.1".to_string(),
                usage: "M".to_string(),
            },
        );
        tree
    }

    #[test]
    fn test_walk_is_preorder_without_root() {
        let tree = sample_tree();
        let names: Vec<&str> = tree.walk().map(|id| tree.node(id).name.as_str()).collect();
        assert_eq!(names, ["Patient", "Patient's Name", "General Study"]);
    }

    #[test]
    fn test_node_path_round_trip() {
        let tree = sample_tree();
        for id in tree.walk() {
            let path = tree.node_path(id);
            assert_eq!(tree.node_by_path(&path), Some(id));
        }
        assert_eq!(
            tree.node_path(tree.node_by_path("CR Image/Patient/Patient's Name").unwrap()),
            "CR Image/Patient/Patient's Name"
        );
    }

    #[test]
    fn test_node_by_path_rejects_unknown_segments() {
        let tree = sample_tree();
        assert_eq!(tree.node_by_path(""), None);
        assert_eq!(tree.node_by_path("Wrong Root/Patient"), None);
        assert_eq!(tree.node_by_path("CR Image/Missing Module"), None);
    }

    #[test]
    fn test_empty_tree() {
        let tree = SpecTree::new("Empty");
        assert!(tree.is_empty());
        assert_eq!(tree.walk().count(), 0);
        assert_eq!(tree.node_path(tree.root()), "Empty");
    }

    #[test]
    fn test_validate_accepts_well_formed_tree() {
        assert_eq!(sample_tree().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let mut tree = SpecTree::new("Root");
        tree.add_child(
            tree.root(),
            "",
            NodeKind::Module {
                reference: String::new(),
                usage: String::new(),
            },
        );
        assert_eq!(tree.validate(), Err(TreeError::EmptyName { index: 1 }));
    }
}
