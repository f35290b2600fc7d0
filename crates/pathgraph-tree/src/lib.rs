//! Path tree reconstruction for flat path record lists.
//!
//! Rebuilds the hierarchy of bundles (group records) and fields from the
//! flat, parent-referencing [`PathRecord`](pathgraph_core::PathRecord)
//! list, reporting structural problems as [`Diagnostic`] values instead of
//! failing.
//!
//! # Modules
//!
//! - [`diagnostics`]: Diagnostic enum for malformed group references
//! - [`element`]: decomposition of a path into typed elements
//! - [`tree`]: the tree arena, node views and traversals
//! - [`build`]: construction from the record list

pub mod build;
pub mod diagnostics;
pub mod element;
pub mod tree;

pub use build::build;
pub use diagnostics::Diagnostic;
pub use element::{common_prefix_len, decompose, ElementRole, PathElement};
pub use tree::{NodeKind, PathTree, PathTreeNode, Walk};
