//! Node and edge labels of the concept graph.
//!
//! [`ModelNode`] is either a concept (one class occurrence, possibly merged
//! with others) or a literal (the target of a datatype property).
//! [`ModelEdge`] connects two concepts through an object property, or a
//! concept and a literal through a datatype property.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use pathgraph_core::{Multigraph, TreeNodeId};

use crate::context::NodeContext;

/// The concept graph produced by the builder.
pub type ModelGraph = Multigraph<ModelNode, ModelEdge, NodeKey>;

/// A class occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub class_uri: String,
    /// Bundles whose own path ends on this concept.
    pub bundles: IndexSet<TreeNodeId>,
    /// Fields without a datatype property whose path ends on this concept.
    pub fields: IndexSet<TreeNodeId>,
}

impl ConceptNode {
    pub fn new(class_uri: &str) -> Self {
        ConceptNode {
            class_uri: class_uri.to_string(),
            bundles: IndexSet::new(),
            fields: IndexSet::new(),
        }
    }
}

/// The value end of one or more datatype properties.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiteralNode {
    /// Fields pointing at this literal.
    pub fields: IndexSet<TreeNodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelNode {
    Concept(ConceptNode),
    Literal(LiteralNode),
}

impl ModelNode {
    /// Variant name, for diagnostics.
    pub fn variant(&self) -> &'static str {
        match self {
            ModelNode::Concept(_) => "concept",
            ModelNode::Literal(_) => "literal",
        }
    }

    /// Every tree node merged into this graph node.
    pub fn members(&self) -> impl Iterator<Item = TreeNodeId> + '_ {
        let (bundles, fields) = match self {
            ModelNode::Concept(concept) => (Some(&concept.bundles), &concept.fields),
            ModelNode::Literal(literal) => (None, &literal.fields),
        };
        bundles.into_iter().flatten().chain(fields).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelEdge {
    /// Object property between two concepts.
    Property { property_uri: String },
    /// Datatype property from a concept to a literal.
    Data { property_uri: String },
}

impl ModelEdge {
    pub fn property_uri(&self) -> &str {
        match self {
            ModelEdge::Property { property_uri } | ModelEdge::Data { property_uri } => property_uri,
        }
    }
}

/// What a node key identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    /// A class, keyed by class identifier.
    Class,
    /// A literal, keyed by datatype property identifier.
    Data,
}

/// Merge key of a model node: `(context, kind, uri)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub context: NodeContext,
    pub kind: KeyKind,
    pub uri: String,
}

impl NodeKey {
    pub fn class(context: NodeContext, class_uri: &str) -> Self {
        NodeKey {
            context,
            kind: KeyKind::Class,
            uri: class_uri.to_string(),
        }
    }

    pub fn data(context: NodeContext, property_uri: &str) -> Self {
        NodeKey {
            context,
            kind: KeyKind::Data,
            uri: property_uri.to_string(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            KeyKind::Class => "class",
            KeyKind::Data => "data",
        };
        write!(f, "({}, {}, {})", self.context, kind, self.uri)
    }
}

/// Node and edge counts of a model graph, by variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphSummary {
    pub concepts: usize,
    pub literals: usize,
    pub properties: usize,
    pub data: usize,
}

impl GraphSummary {
    pub fn of(graph: &ModelGraph) -> Self {
        let mut summary = GraphSummary::default();
        for (_, node) in graph.nodes() {
            match node {
                ModelNode::Concept(_) => summary.concepts += 1,
                ModelNode::Literal(_) => summary.literals += 1,
            }
        }
        for edge in graph.edges() {
            match edge.label {
                ModelEdge::Property { .. } => summary.properties += 1,
                ModelEdge::Data { .. } => summary.data += 1,
            }
        }
        summary
    }
}
