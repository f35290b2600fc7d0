//! Deduplication policies.
//!
//! A [`ContextPolicy`] decides, for every concept and datatype element the
//! builder visits, which context the element lives in. Four policies are
//! provided, selected by the closed [`Deduplication`] enum:
//!
//! | Policy    | Concepts                                                   | Datatypes                     |
//! |-----------|------------------------------------------------------------|-------------------------------|
//! | `Full`    | always the empty named scope                               | always the empty named scope  |
//! | `Bundle`  | parent's context in the shared prefix, else the scope of a known scope class, else continue the chain | parent's context if named, else fresh |
//! | `Parents` | parent's context in the shared prefix, else fresh          | fresh                         |
//! | `None`    | fresh                                                      | fresh                         |

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use pathgraph_tree::{PathElement, PathTree, PathTreeNode};

use crate::context::{ContextSpec, NodeContext};
use crate::error::ParseDeduplicationError;

/// Decides node identity for the elements of each tree node.
pub trait ContextPolicy {
    /// Pre-pass over the whole tree, run once before the walk.
    fn prepare(&mut self, _tree: &PathTree) {}

    /// Context for a concept element.
    ///
    /// `previous` is the context of the prior concept of the same node;
    /// `parent` is the context the parent node resolved for the concept at
    /// the same position, if it had one.
    fn concept_context(
        &self,
        element: &PathElement<'_>,
        omitted: bool,
        previous: Option<&NodeContext>,
        node: PathTreeNode<'_>,
        parent: Option<&NodeContext>,
    ) -> ContextSpec;

    /// Context for the trailing datatype element of a field. `parent` is the
    /// context of the field's last concept.
    fn datatype_context(
        &self,
        element: &PathElement<'_>,
        omitted: bool,
        node: PathTreeNode<'_>,
        parent: Option<&NodeContext>,
    ) -> ContextSpec;
}

/// Reuses `parent` while `element` is still in the prefix shared with the
/// parent's path.
fn inherited(element: &PathElement<'_>, parent: Option<&NodeContext>) -> Option<ContextSpec> {
    if element.is_inherited() {
        parent.map(|context| ContextSpec::Use(context.clone()))
    } else {
        None
    }
}

/// Draws every class exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullPolicy;

impl ContextPolicy for FullPolicy {
    fn concept_context(
        &self,
        _element: &PathElement<'_>,
        _omitted: bool,
        _previous: Option<&NodeContext>,
        _node: PathTreeNode<'_>,
        _parent: Option<&NodeContext>,
    ) -> ContextSpec {
        ContextSpec::named("")
    }

    fn datatype_context(
        &self,
        _element: &PathElement<'_>,
        _omitted: bool,
        _node: PathTreeNode<'_>,
        _parent: Option<&NodeContext>,
    ) -> ContextSpec {
        ContextSpec::named("")
    }
}

/// Shares nodes inside bundles and around disambiguated concepts.
#[derive(Debug, Clone, Default)]
pub struct BundlePolicy {
    /// Class identifiers that open a named scope.
    scopes: HashSet<String>,
}

impl BundlePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `uri` opens a named scope.
    pub fn is_scope(&self, uri: &str) -> bool {
        self.scopes.contains(uri)
    }
}

impl ContextPolicy for BundlePolicy {
    /// Collects the disambiguated concept of every field and the last
    /// concept of every bundle.
    fn prepare(&mut self, tree: &PathTree) {
        for node in tree.walk() {
            let Some(record) = node.record() else {
                continue;
            };
            let scope = if node.is_bundle() {
                record.last_concept()
            } else {
                record.disambiguated_concept()
            };
            if let Some(scope) = scope {
                self.scopes.insert(scope.to_string());
            }
        }
    }

    fn concept_context(
        &self,
        element: &PathElement<'_>,
        _omitted: bool,
        previous: Option<&NodeContext>,
        _node: PathTreeNode<'_>,
        parent: Option<&NodeContext>,
    ) -> ContextSpec {
        if let Some(spec) = inherited(element, parent) {
            return spec;
        }
        if self.is_scope(element.uri) {
            return ContextSpec::named(element.uri);
        }
        match previous {
            Some(context) => ContextSpec::Use(context.clone()),
            None => ContextSpec::Fresh,
        }
    }

    fn datatype_context(
        &self,
        _element: &PathElement<'_>,
        _omitted: bool,
        _node: PathTreeNode<'_>,
        parent: Option<&NodeContext>,
    ) -> ContextSpec {
        match parent {
            Some(context) if context.is_named() => ContextSpec::Use(context.clone()),
            Some(_) | None => ContextSpec::Fresh,
        }
    }
}

/// Shares only the nodes a path inherits from its parent's path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentsPolicy;

impl ContextPolicy for ParentsPolicy {
    fn concept_context(
        &self,
        element: &PathElement<'_>,
        _omitted: bool,
        _previous: Option<&NodeContext>,
        _node: PathTreeNode<'_>,
        parent: Option<&NodeContext>,
    ) -> ContextSpec {
        inherited(element, parent).unwrap_or(ContextSpec::Fresh)
    }

    fn datatype_context(
        &self,
        _element: &PathElement<'_>,
        _omitted: bool,
        _node: PathTreeNode<'_>,
        _parent: Option<&NodeContext>,
    ) -> ContextSpec {
        ContextSpec::Fresh
    }
}

/// Never shares a node.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonePolicy;

impl ContextPolicy for NonePolicy {
    fn concept_context(
        &self,
        _element: &PathElement<'_>,
        _omitted: bool,
        _previous: Option<&NodeContext>,
        _node: PathTreeNode<'_>,
        _parent: Option<&NodeContext>,
    ) -> ContextSpec {
        ContextSpec::Fresh
    }

    fn datatype_context(
        &self,
        _element: &PathElement<'_>,
        _omitted: bool,
        _node: PathTreeNode<'_>,
        _parent: Option<&NodeContext>,
    ) -> ContextSpec {
        ContextSpec::Fresh
    }
}

/// Selects one of the deduplication policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deduplication {
    Full,
    #[default]
    Bundle,
    Parents,
    None,
}

impl Deduplication {
    pub const ALL: [Deduplication; 4] = [
        Deduplication::Full,
        Deduplication::Bundle,
        Deduplication::Parents,
        Deduplication::None,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Deduplication::Full => "Full",
            Deduplication::Bundle => "Bundle",
            Deduplication::Parents => "Parents",
            Deduplication::None => "None",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Deduplication::Full => "Draw every class exactly once, no matter where it is used.",
            Deduplication::Bundle => {
                "Share classes within a bundle and around disambiguated concepts."
            }
            Deduplication::Parents => {
                "Share only the classes a path inherits from its parent bundle's path."
            }
            Deduplication::None => "Draw every class occurrence as its own node.",
        }
    }

    /// Whether graphs built with this policy are forests.
    pub fn is_acyclic(self) -> bool {
        match self {
            Deduplication::Parents | Deduplication::None => true,
            Deduplication::Full | Deduplication::Bundle => false,
        }
    }

    /// Instantiates the policy and runs its pre-pass over `tree`.
    pub fn policy(self, tree: &PathTree) -> Box<dyn ContextPolicy> {
        let mut policy: Box<dyn ContextPolicy> = match self {
            Deduplication::Full => Box::new(FullPolicy),
            Deduplication::Bundle => Box::new(BundlePolicy::new()),
            Deduplication::Parents => Box::new(ParentsPolicy),
            Deduplication::None => Box::new(NonePolicy),
        };
        policy.prepare(tree);
        policy
    }
}

impl fmt::Display for Deduplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Deduplication::Full => "full",
            Deduplication::Bundle => "bundle",
            Deduplication::Parents => "parents",
            Deduplication::None => "none",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Deduplication {
    type Err = ParseDeduplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Deduplication::Full),
            "bundle" => Ok(Deduplication::Bundle),
            "parents" => Ok(Deduplication::Parents),
            "none" => Ok(Deduplication::None),
            _ => Err(ParseDeduplicationError(s.to_string())),
        }
    }
}
