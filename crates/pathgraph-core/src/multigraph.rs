//! Multigraph: a directed multigraph with keyed node merging.
//!
//! [`Multigraph`] wraps a petgraph `StableGraph` and adds a key index so
//! that callers can register nodes under an external key and later merge
//! new information into them with [`Multigraph::add_or_update_node`] or
//! [`Multigraph::try_upsert_node`]. Edges
//! are never deduplicated by the container; callers that need idempotent
//! edges track them with a [`Tracker`](crate::Tracker).
//!
//! Handles are assigned sequentially starting at 0. Nodes and edges are
//! never removed, so handles stay dense for the lifetime of the graph.

use std::collections::HashMap;
use std::hash::Hash;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::Directed;

use crate::error::CoreError;
use crate::id::{EdgeId, NodeId};

/// A directed multigraph whose nodes may be addressed by an external key.
#[derive(Debug, Clone)]
pub struct Multigraph<N, E, K = String> {
    graph: StableGraph<N, E, Directed, u32>,
    /// Registered key -> node handle. At most one handle per key.
    keys: HashMap<K, NodeId>,
    /// Hint for layout collaborators; not enforced.
    definitely_acyclic: bool,
}

/// A borrowed view of one edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeEntry<'a, E> {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub label: &'a E,
}

impl<N, E, K: Hash + Eq> Multigraph<N, E, K> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Multigraph {
            graph: StableGraph::new(),
            keys: HashMap::new(),
            definitely_acyclic: false,
        }
    }

    // -----------------------------------------------------------------------
    // Node methods
    // -----------------------------------------------------------------------

    /// Adds a node.
    ///
    /// If `key` is given and already registered, returns the existing handle
    /// and drops `label`. Otherwise allocates a new handle and registers the
    /// key, if any.
    pub fn add_node(&mut self, label: N, key: Option<K>) -> NodeId {
        match key {
            Some(key) => {
                if let Some(&id) = self.keys.get(&key) {
                    return id;
                }
                self.insert_keyed(key, label)
            }
            None => NodeId::from(self.graph.add_node(label)),
        }
    }

    /// Inserts or merges the node registered under `key`.
    ///
    /// The label becomes `updater(Some(current))` when the key is known, and
    /// `updater(None)` for a new node. The current label is moved into
    /// `updater`, so merging never copies it.
    pub fn add_or_update_node<F>(&mut self, key: K, updater: F) -> NodeId
    where
        N: Default,
        F: FnOnce(Option<N>) -> N,
    {
        if let Some(&id) = self.keys.get(&key) {
            if let Some(weight) = self.graph.node_weight_mut(id.into()) {
                let current = std::mem::take(weight);
                *weight = updater(Some(current));
                return id;
            }
        }
        self.insert_keyed(key, updater(None))
    }

    /// Inserts `insert()` under `key`, or applies `update` to the label
    /// already stored there, in place.
    ///
    /// An `update` that fails must do so before touching the label; the
    /// error is returned and nothing is inserted.
    pub fn try_upsert_node<I, U, Err>(&mut self, key: K, insert: I, update: U) -> Result<NodeId, Err>
    where
        I: FnOnce() -> N,
        U: FnOnce(&mut N) -> Result<(), Err>,
    {
        if let Some(&id) = self.keys.get(&key) {
            if let Some(weight) = self.graph.node_weight_mut(id.into()) {
                update(weight)?;
                return Ok(id);
            }
        }
        let mut label = insert();
        update(&mut label)?;
        Ok(self.insert_keyed(key, label))
    }

    fn insert_keyed(&mut self, key: K, label: N) -> NodeId {
        let id = NodeId::from(self.graph.add_node(label));
        self.keys.insert(key, id);
        id
    }

    /// Returns `true` if a node is registered under `key`.
    pub fn has_node(&self, key: &K) -> bool {
        self.keys.contains_key(key)
    }

    /// Looks up the handle registered under `key`.
    pub fn node_id(&self, key: &K) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    /// Looks up a node label by handle.
    pub fn node(&self, id: NodeId) -> Option<&N> {
        let idx: NodeIndex<u32> = id.into();
        self.graph.node_weight(idx)
    }

    // -----------------------------------------------------------------------
    // Edge methods
    // -----------------------------------------------------------------------

    /// Adds an edge between two existing nodes.
    ///
    /// Always creates a new edge, even if an identical one exists.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, label: E) -> Result<EdgeId, CoreError> {
        let from_idx: NodeIndex<u32> = from.into();
        let to_idx: NodeIndex<u32> = to.into();

        if !self.graph.contains_node(from_idx) {
            return Err(CoreError::NodeNotFound { id: from });
        }
        if !self.graph.contains_node(to_idx) {
            return Err(CoreError::NodeNotFound { id: to });
        }

        let idx = self.graph.add_edge(from_idx, to_idx, label);
        Ok(EdgeId::from(idx))
    }

    /// Looks up an edge by handle.
    pub fn edge(&self, id: EdgeId) -> Option<EdgeEntry<'_, E>> {
        let idx: EdgeIndex<u32> = id.into();
        let (from, to) = self.graph.edge_endpoints(idx)?;
        let label = self.graph.edge_weight(idx)?;
        Some(EdgeEntry {
            id,
            from: from.into(),
            to: to.into(),
            label,
        })
    }

    // -----------------------------------------------------------------------
    // Query methods
    // -----------------------------------------------------------------------

    /// Iterates over all nodes in handle order.
    ///
    /// Each call starts a fresh pass over the current contents.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx).map(|n| (NodeId::from(idx), n)))
    }

    /// Iterates over all edges in handle order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeEntry<'_, E>> + '_ {
        self.graph
            .edge_indices()
            .filter_map(move |idx| self.edge(EdgeId::from(idx)))
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns a read-only reference to the backing graph, for traversals.
    pub fn graph(&self) -> &StableGraph<N, E, Directed, u32> {
        &self.graph
    }

    /// Whether the producer guarantees the graph has no directed cycle.
    pub fn definitely_acyclic(&self) -> bool {
        self.definitely_acyclic
    }

    /// Sets the acyclic hint.
    pub fn set_definitely_acyclic(&mut self, acyclic: bool) {
        self.definitely_acyclic = acyclic;
    }
}

impl<N, E, K: Hash + Eq> Default for Multigraph<N, E, K> {
    fn default() -> Self {
        Self::new()
    }
}
