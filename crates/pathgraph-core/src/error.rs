//! Core error types for pathgraph-core.
//!
//! Uses `thiserror` for structured, matchable error variants.

use crate::id::NodeId;
use thiserror::Error;

/// Core errors produced by the pathgraph-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A node handle was not found in the graph.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },
}
