//! The path tree arena and its node views.
//!
//! [`PathTree`] owns every node in a flat arena. Slot 0 is the synthetic
//! forest root; bundles and fields follow. Parent links are plain
//! [`TreeNodeId`]s into the arena, so the tree never holds a second owning
//! reference to any node.
//!
//! Read access goes through [`PathTreeNode`], a cheap copyable view pairing
//! the arena with one node id.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use pathgraph_core::{PathRecord, TreeNodeId};

use crate::element::{decompose, PathElement};

/// What a tree node represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The forest root. Has no record; its children are top-level bundles.
    Root,
    /// A group record with child bundles and fields.
    Bundle(PathRecord),
    /// A leaf record.
    Field(PathRecord),
}

#[derive(Debug, Clone)]
pub(crate) struct TreeNode {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<TreeNodeId>,
    pub(crate) children: Vec<TreeNodeId>,
    pub(crate) depth: usize,
}

/// A rooted forest of bundles and fields.
#[derive(Debug, Clone)]
pub struct PathTree {
    pub(crate) nodes: Vec<TreeNode>,
}

impl PathTree {
    /// Creates a tree containing only the root.
    pub(crate) fn empty() -> Self {
        PathTree {
            nodes: vec![TreeNode {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
        }
    }

    /// Appends a node under `parent` and returns its id.
    pub(crate) fn push(&mut self, kind: NodeKind, parent: TreeNodeId) -> TreeNodeId {
        let id = TreeNodeId(self.nodes.len() as u32);
        let depth = self.nodes[parent.index()].depth + 1;
        self.nodes.push(TreeNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// The forest root.
    pub fn root(&self) -> PathTreeNode<'_> {
        PathTreeNode {
            tree: self,
            id: TreeNodeId::ROOT,
        }
    }

    /// Looks up a node by arena id.
    pub fn node(&self, id: TreeNodeId) -> Option<PathTreeNode<'_>> {
        (id.index() < self.nodes.len()).then_some(PathTreeNode { tree: self, id })
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds no bundle.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Top-level bundles in sibling order.
    pub fn children(&self) -> impl Iterator<Item = PathTreeNode<'_>> + '_ {
        self.root().children()
    }

    /// Pre-order traversal of the whole forest, starting at the root.
    pub fn walk(&self) -> Walk<'_> {
        self.root().walk()
    }

    /// The first node in walk order whose record has identifier `id`.
    pub fn find(&self, id: &str) -> Option<PathTreeNode<'_>> {
        self.root().find(id)
    }

    /// Records of every bundle and field, in walk order.
    pub fn paths(&self) -> impl Iterator<Item = &PathRecord> + '_ {
        self.root().paths()
    }

    /// Every class, property and datatype identifier used in the forest.
    pub fn uris(&self) -> IndexSet<&str> {
        self.root().uris()
    }
}

/// A view of one node of a [`PathTree`].
#[derive(Clone, Copy)]
pub struct PathTreeNode<'a> {
    tree: &'a PathTree,
    id: TreeNodeId,
}

impl<'a> PathTreeNode<'a> {
    fn data(&self) -> &'a TreeNode {
        &self.tree.nodes[self.id.index()]
    }

    fn view(&self, id: TreeNodeId) -> PathTreeNode<'a> {
        PathTreeNode {
            tree: self.tree,
            id,
        }
    }

    /// Arena id of this node.
    pub fn id(&self) -> TreeNodeId {
        self.id
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.data().kind
    }

    /// The record that defined this node. `None` for the root.
    pub fn record(&self) -> Option<&'a PathRecord> {
        match self.kind() {
            NodeKind::Root => None,
            NodeKind::Bundle(record) | NodeKind::Field(record) => Some(record),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind(), NodeKind::Root)
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self.kind(), NodeKind::Bundle(_))
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind(), NodeKind::Field(_))
    }

    /// Distance from the root (root = 0).
    pub fn depth(&self) -> usize {
        self.data().depth
    }

    /// Original input position of the defining record. `None` for the root.
    pub fn index(&self) -> Option<usize> {
        self.record().map(|r| r.index)
    }

    /// Sibling ordering key: weight, then original position.
    pub fn sort_key(&self) -> (i64, usize) {
        self.record().map_or((i64::MIN, 0), |r| (r.weight, r.index))
    }

    pub fn parent(&self) -> Option<PathTreeNode<'a>> {
        self.data().parent.map(|id| self.view(id))
    }

    /// Children in sibling order.
    pub fn children(&self) -> impl Iterator<Item = PathTreeNode<'a>> + 'a {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| PathTreeNode { tree, id })
    }

    /// Child bundles in sibling order.
    pub fn bundles(&self) -> impl Iterator<Item = PathTreeNode<'a>> + 'a {
        self.children().filter(|c| c.is_bundle())
    }

    /// Child fields in sibling order.
    pub fn fields(&self) -> impl Iterator<Item = PathTreeNode<'a>> + 'a {
        self.children().filter(|c| c.is_field())
    }

    /// Pre-order depth-first traversal of this subtree, starting with
    /// this node.
    pub fn walk(&self) -> Walk<'a> {
        Walk {
            tree: self.tree,
            stack: vec![self.id],
        }
    }

    /// The first node in walk order whose record has identifier `id`.
    pub fn find(&self, id: &str) -> Option<PathTreeNode<'a>> {
        self.walk()
            .find(|n| n.record().is_some_and(|r| r.id == id))
    }

    /// Records of every bundle and field in this subtree, in walk order.
    pub fn paths(&self) -> impl Iterator<Item = &'a PathRecord> + 'a {
        self.walk().filter_map(|n| n.record())
    }

    /// Every identifier reachable from this subtree, in first-seen order.
    pub fn uris(&self) -> IndexSet<&'a str> {
        self.paths().flat_map(|r| r.uris()).collect()
    }

    /// The path array of the parent, empty when the parent is the root.
    pub fn parent_path(&self) -> &'a [String] {
        self.parent()
            .and_then(|p| p.record())
            .map(|r| r.path_array.as_slice())
            .unwrap_or(&[])
    }

    /// Decomposes this node's path into elements relative to its parent's
    /// path. Fields with a datatype property end in a datatype element.
    pub fn elements(&self) -> Vec<PathElement<'a>> {
        match self.kind() {
            NodeKind::Root => Vec::new(),
            NodeKind::Bundle(record) => decompose(record, self.parent_path(), false),
            NodeKind::Field(record) => decompose(record, self.parent_path(), true),
        }
    }
}

impl PartialEq for PathTreeNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for PathTreeNode<'_> {}

impl fmt::Debug for PathTreeNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind() {
            NodeKind::Root => "Root",
            NodeKind::Bundle(_) => "Bundle",
            NodeKind::Field(_) => "Field",
        };
        f.debug_struct(label)
            .field("id", &self.id)
            .field("record", &self.record().map(|r| r.id.as_str()))
            .field("depth", &self.depth())
            .finish()
    }
}

/// Pre-order iterator returned by [`PathTreeNode::walk`].
///
/// Each call to `walk` starts a fresh traversal.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    tree: &'a PathTree,
    stack: Vec<TreeNodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = PathTreeNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree.nodes[id.index()];
        self.stack.extend(node.children.iter().rev());
        Some(PathTreeNode {
            tree: self.tree,
            id,
        })
    }
}
