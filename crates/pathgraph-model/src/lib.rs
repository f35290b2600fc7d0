//! Concept graph construction from a path tree.
//!
//! Walks a [`PathTree`](pathgraph_tree::PathTree) once and turns every
//! class occurrence into a concept node and every datatype property into a
//! literal node. Which occurrences collapse into one node is decided by a
//! [`Deduplication`] policy.
//!
//! # Modules
//!
//! - [`context`]: node contexts and the specs policies return
//! - [`policy`]: the four deduplication policies
//! - [`model`]: node and edge labels of the output graph
//! - [`builder`]: the single-pass graph builder
//! - [`error`]: BuildError and parse errors

pub mod builder;
pub mod context;
pub mod error;
pub mod model;
pub mod policy;

pub use builder::{build_graph, exclude_ids, ModelGraphBuilder};
pub use context::{ContextSpec, NodeContext};
pub use error::{BuildError, ParseDeduplicationError};
pub use model::{ConceptNode, GraphSummary, KeyKind, LiteralNode, ModelEdge, ModelGraph, ModelNode, NodeKey};
pub use policy::{BundlePolicy, ContextPolicy, Deduplication, FullPolicy, NonePolicy, ParentsPolicy};
