//! Error types for pathgraph-model.

use pathgraph_core::CoreError;
use thiserror::Error;

/// Errors that abort a model graph build.
///
/// Degenerate path shapes are not errors; they are logged and skipped.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Two different node variants were keyed identically. Indicates a
    /// defect in context key construction.
    #[error("node variant collision at key {key}: expected {expected}, found {found}")]
    VariantCollision {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The underlying graph rejected an operation.
    #[error(transparent)]
    Graph(#[from] CoreError),
}

/// An unrecognized deduplication name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown deduplication '{0}': expected one of full, bundle, parents, none")]
pub struct ParseDeduplicationError(pub String);
