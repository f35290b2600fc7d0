//! Structural diagnostics produced while building a path tree.
//!
//! [`Diagnostic`] values are collected, never thrown: the offending records
//! are left out of the tree and the rest of the input is still processed.

use serde::{Deserialize, Serialize};

/// A structural problem found in the record list.
///
/// Every variant names the record or group identifier involved so the
/// caller can point at the offending input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    /// A field names a group that no enabled group record defines.
    #[error("orphaned field '{id}': group '{group_id}' is not an enabled group")]
    OrphanedField {
        /// The dropped field record.
        id: String,
        /// The group identifier it referenced (possibly empty).
        group_id: String,
    },

    /// A group identifier is referenced but never defined.
    #[error("missing bundle '{id}': referenced by {referenced_by:?}")]
    MissingBundle {
        /// The undefined group identifier.
        id: String,
        /// Records that named this group as their parent, in input order.
        referenced_by: Vec<String>,
    },

    /// Two enabled group records share one identifier.
    #[error("duplicate bundle '{id}': keeping input position {kept}, dropping {dropped}")]
    DuplicateBundle {
        /// The shared group identifier.
        id: String,
        /// Input position of the record that was kept.
        kept: usize,
        /// Input position of the record that was dropped.
        dropped: usize,
    },

    /// A group whose chain of parents loops back to itself.
    #[error("cyclic bundle '{id}': its parent chain never reaches a top-level group")]
    CyclicBundle {
        /// The unreachable group identifier.
        id: String,
    },
}

impl Diagnostic {
    /// The identifier of the record or group this diagnostic is about.
    pub fn id(&self) -> &str {
        match self {
            Diagnostic::OrphanedField { id, .. }
            | Diagnostic::MissingBundle { id, .. }
            | Diagnostic::DuplicateBundle { id, .. }
            | Diagnostic::CyclicBundle { id } => id,
        }
    }
}
