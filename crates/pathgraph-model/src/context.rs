//! Node contexts.
//!
//! A [`NodeContext`] scopes node identity: two class occurrences become the
//! same concept node exactly when they resolve to the same context and the
//! same class identifier. Policies answer with a [`ContextSpec`], which the
//! builder resolves into a concrete context.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Source of unique context tokens. Strictly increasing for the process.
static NEXT_UNIQUE: AtomicU64 = AtomicU64::new(0);

/// A resolved context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeContext {
    /// No node is drawn for this occurrence; descendants still see it.
    Suppressed,
    /// A shareable scope. Occurrences naming the same scope may merge.
    Named(String),
    /// A scope nothing else can name. Never equal to a `Named` context.
    Unique(u64),
}

impl NodeContext {
    /// Mints a context no previous call has returned.
    pub fn fresh() -> NodeContext {
        NodeContext::Unique(NEXT_UNIQUE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn named(scope: impl Into<String>) -> NodeContext {
        NodeContext::Named(scope.into())
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, NodeContext::Suppressed)
    }

    pub fn is_named(&self) -> bool {
        matches!(self, NodeContext::Named(_))
    }
}

impl fmt::Display for NodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeContext::Suppressed => write!(f, "false"),
            NodeContext::Named(scope) => write!(f, "{:?}", scope),
            NodeContext::Unique(token) => write!(f, "#{}", token),
        }
    }
}

/// A policy's answer for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextSpec {
    /// Draw nothing for this element.
    Suppress,
    /// Allocate a brand-new unique context.
    Fresh,
    /// Use this context, typically one inherited from the parent or the
    /// previous concept.
    Use(NodeContext),
}

impl ContextSpec {
    /// Reuses the named scope `scope`.
    pub fn named(scope: impl Into<String>) -> ContextSpec {
        ContextSpec::Use(NodeContext::named(scope))
    }

    /// Turns the spec into a concrete context, minting one if needed.
    pub fn resolve(self) -> NodeContext {
        match self {
            ContextSpec::Suppress => NodeContext::Suppressed,
            ContextSpec::Fresh => NodeContext::fresh(),
            ContextSpec::Use(context) => context,
        }
    }
}
