//! ModelGraphBuilder: the single pass from path tree to concept graph.
//!
//! The builder walks the tree in pre-order. For every bundle and field it
//! asks the active [`ContextPolicy`] for the context of each concept,
//! upserts one concept node per `(context, class)` key, links consecutive
//! concepts with property edges, and hangs a literal node off the last
//! concept of fields that end in a datatype property. The contexts a node
//! resolved are kept so its children can align with them.
//!
//! Degenerate paths (empty, even-length, undrawable datatype linkage) are
//! logged and skipped locally. Only an internal key collision aborts.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;
use tracing::{debug, warn};

use pathgraph_core::{NodeId, Tracker, TreeNodeId};
use pathgraph_tree::{ElementRole, NodeKind, PathElement, PathTree, PathTreeNode};

use crate::context::NodeContext;
use crate::error::BuildError;
use crate::model::{ConceptNode, GraphSummary, LiteralNode, ModelEdge, ModelGraph, ModelNode, NodeKey};
use crate::policy::{ContextPolicy, Deduplication};

/// Contexts a node resolved, indexed by concept position.
type ContextVec = SmallVec<[NodeContext; 4]>;

/// A concept drawn for the current node.
type Drawn = Option<(NodeId, NodeKey)>;

/// Edge identity for idempotent insertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EdgeKey {
    Property(NodeId, NodeId, String),
    Data(NodeId, NodeId),
}

/// Builds a [`ModelGraph`] from a [`PathTree`].
///
/// The builder is consumed by [`build`](Self::build), so a tree walk
/// happens at most once per builder.
pub struct ModelGraphBuilder<'t, P> {
    tree: &'t PathTree,
    include: P,
    deduplication: Deduplication,
}

impl<'t, P> ModelGraphBuilder<'t, P>
where
    P: Fn(PathTreeNode<'_>) -> bool,
{
    /// Creates a builder.
    ///
    /// `include` decides which tree nodes are drawn. Excluded nodes still
    /// resolve contexts, so their descendants line up with them.
    pub fn new(tree: &'t PathTree, include: P, deduplication: Deduplication) -> Self {
        ModelGraphBuilder {
            tree,
            include,
            deduplication,
        }
    }

    /// Walks the tree and returns the populated graph.
    pub fn build(self) -> Result<ModelGraph, BuildError> {
        let policy = self.deduplication.policy(self.tree);
        let mut state = BuildState {
            policy: policy.as_ref(),
            graph: ModelGraph::new(),
            edges: Tracker::new(),
            contexts: HashMap::new(),
        };

        for node in self.tree.walk() {
            if node.is_root() {
                continue;
            }
            let omitted = !(self.include)(node);
            state.visit(node, omitted)?;
        }

        let mut graph = state.graph;
        graph.set_definitely_acyclic(self.deduplication.is_acyclic());

        let summary = GraphSummary::of(&graph);
        debug!(
            deduplication = %self.deduplication,
            concepts = summary.concepts,
            literals = summary.literals,
            properties = summary.properties,
            data = summary.data,
            "model graph built"
        );
        Ok(graph)
    }
}

/// Convenience wrapper around [`ModelGraphBuilder`].
pub fn build_graph<P>(
    tree: &PathTree,
    include: P,
    deduplication: Deduplication,
) -> Result<ModelGraph, BuildError>
where
    P: Fn(PathTreeNode<'_>) -> bool,
{
    ModelGraphBuilder::new(tree, include, deduplication).build()
}

/// An inclusion predicate that leaves out the records named in `ids` and
/// everything below them.
pub fn exclude_ids<I, S>(ids: I) -> impl Fn(PathTreeNode<'_>) -> bool
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let excluded: HashSet<String> = ids.into_iter().map(Into::into).collect();
    move |node: PathTreeNode<'_>| {
        let mut current = Some(node);
        while let Some(n) = current {
            if n.record().is_some_and(|r| excluded.contains(&r.id)) {
                return false;
            }
            current = n.parent();
        }
        true
    }
}

struct BuildState<'p> {
    policy: &'p dyn ContextPolicy,
    graph: ModelGraph,
    edges: Tracker<EdgeKey>,
    contexts: HashMap<TreeNodeId, ContextVec>,
}

impl BuildState<'_> {
    fn visit(&mut self, node: PathTreeNode<'_>, omitted: bool) -> Result<(), BuildError> {
        let Some(record) = node.record() else {
            return Ok(());
        };

        if record.path_array.len() % 2 == 0 && !record.path_array.is_empty() {
            warn!(
                record = %record.id,
                len = record.path_array.len(),
                "path array has even length, trailing property has no target"
            );
        }

        let parent_contexts = node
            .parent()
            .and_then(|p| self.contexts.get(&p.id()))
            .cloned()
            .unwrap_or_default();

        let elements = node.elements();

        // Concepts.
        let mut contexts = ContextVec::new();
        let mut drawn: SmallVec<[Drawn; 4]> = SmallVec::new();
        let mut previous: Option<NodeContext> = None;
        for element in elements.iter().filter(|e| e.role == ElementRole::Concept) {
            let parent = parent_contexts.get(element.concept_index());
            let context = self
                .policy
                .concept_context(element, omitted, previous.as_ref(), node, parent)
                .resolve();

            let handle = if omitted || context.is_suppressed() {
                None
            } else {
                let key = NodeKey::class(context.clone(), element.uri);
                let id = self.graph.try_upsert_node(
                    key.clone(),
                    || ModelNode::Concept(ConceptNode::new(element.uri)),
                    |label| concept_mut(label, &key).map(drop),
                )?;
                Some((id, key))
            };

            contexts.push(context.clone());
            drawn.push(handle);
            previous = Some(context);
        }

        // Properties between consecutive drawn concepts.
        for element in elements.iter().filter(|e| e.role == ElementRole::Property) {
            let source = drawn.get(element.index / 2).and_then(Option::as_ref);
            let target = drawn.get(element.index / 2 + 1).and_then(Option::as_ref);
            let (Some((from, _)), Some((to, _))) = (source, target) else {
                continue;
            };
            let (from, to) = (*from, *to);
            if self
                .edges
                .add(EdgeKey::Property(from, to, element.uri.to_string()))
            {
                self.graph.add_edge(
                    from,
                    to,
                    ModelEdge::Property {
                        property_uri: element.uri.to_string(),
                    },
                )?;
            }
        }

        match node.kind() {
            NodeKind::Field(_) => {
                let datatype = elements.iter().find(|e| e.role == ElementRole::Datatype);
                match datatype {
                    Some(element) => {
                        self.draw_datatype(node, element, omitted, &contexts, &drawn)?
                    }
                    None if !omitted => {
                        self.attach(node, &drawn, |concept, id| {
                            concept.fields.insert(id);
                        })?;
                    }
                    None => {}
                }
            }
            NodeKind::Bundle(_) => {
                if record.path_array.is_empty() {
                    warn!(record = %record.id, "bundle has an empty path");
                }
                if !omitted {
                    self.attach(node, &drawn, |concept, id| {
                        concept.bundles.insert(id);
                    })?;
                }
            }
            NodeKind::Root => {}
        }

        self.contexts.insert(node.id(), contexts);
        Ok(())
    }

    /// Draws the literal of a field's datatype property and links it to
    /// the field's last concept.
    fn draw_datatype(
        &mut self,
        node: PathTreeNode<'_>,
        element: &PathElement<'_>,
        omitted: bool,
        contexts: &ContextVec,
        drawn: &[Drawn],
    ) -> Result<(), BuildError> {
        // Datatype contexts are never inherited, so an omitted field has
        // nothing to resolve.
        if omitted {
            return Ok(());
        }
        let Some(last) = drawn.len().checked_sub(1) else {
            warn!(
                record = %record_id(node),
                datatype = element.uri,
                "datatype property without a concept to attach to"
            );
            return Ok(());
        };

        let context = self
            .policy
            .datatype_context(element, omitted, node, contexts.get(last))
            .resolve();
        if context.is_suppressed() {
            return Ok(());
        }

        let Some((from, _)) = &drawn[last] else {
            warn!(
                record = %record_id(node),
                datatype = element.uri,
                "last concept was not drawn, skipping datatype property"
            );
            return Ok(());
        };
        let from = *from;

        let key = NodeKey::data(context, element.uri);
        let field = node.id();
        let literal = self.graph.try_upsert_node(
            key.clone(),
            || ModelNode::Literal(LiteralNode::default()),
            |label| {
                literal_mut(label, &key)?.fields.insert(field);
                Ok::<_, BuildError>(())
            },
        )?;

        if self.edges.add(EdgeKey::Data(from, literal)) {
            self.graph.add_edge(
                from,
                literal,
                ModelEdge::Data {
                    property_uri: element.uri.to_string(),
                },
            )?;
        }
        Ok(())
    }

    /// Records `node` on the concept its own path ends on.
    fn attach<F>(&mut self, node: PathTreeNode<'_>, drawn: &[Drawn], update: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut ConceptNode, TreeNodeId),
    {
        let Some(Some((_, key))) = drawn.last() else {
            warn!(
                record = %record_id(node),
                "last concept is missing or was not drawn, cannot attach"
            );
            return Ok(());
        };

        let id = node.id();
        self.graph.try_upsert_node(
            key.clone(),
            || ModelNode::Concept(ConceptNode::new(&key.uri)),
            |label| {
                update(concept_mut(label, key)?, id);
                Ok::<_, BuildError>(())
            },
        )?;
        Ok(())
    }
}

fn record_id<'a>(node: PathTreeNode<'a>) -> &'a str {
    node.record().map_or("", |r| r.id.as_str())
}

/// The concept stored under `key`. Anything else means two entities were
/// keyed identically.
fn concept_mut<'n>(label: &'n mut ModelNode, key: &NodeKey) -> Result<&'n mut ConceptNode, BuildError> {
    let found = label.variant();
    match label {
        ModelNode::Concept(concept) => Ok(concept),
        ModelNode::Literal(_) => Err(BuildError::VariantCollision {
            key: key.to_string(),
            expected: "concept",
            found,
        }),
    }
}

/// The literal stored under `key`.
fn literal_mut<'n>(label: &'n mut ModelNode, key: &NodeKey) -> Result<&'n mut LiteralNode, BuildError> {
    let found = label.variant();
    match label {
        ModelNode::Literal(literal) => Ok(literal),
        ModelNode::Concept(_) => Err(BuildError::VariantCollision {
            key: key.to_string(),
            expected: "literal",
            found,
        }),
    }
}
