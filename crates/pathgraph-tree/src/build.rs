//! Construction of a [`PathTree`] from the flat record list.
//!
//! Records are processed in input order. Each group identifier gets a
//! *shell* the first time it is mentioned, either by the group record that
//! defines it or by a child naming it as parent. Once every record has been
//! seen, shells reachable from the top-level groups are resolved into the
//! tree arena; everything else is reported and dropped.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use pathgraph_core::{PathRecord, TreeNodeId};

use crate::diagnostics::Diagnostic;
use crate::tree::{NodeKind, PathTree};

#[derive(Debug)]
enum ShellChild<'r> {
    Bundle(&'r str),
    Field(&'r PathRecord),
}

#[derive(Debug, Default)]
struct Shell<'r> {
    record: Option<&'r PathRecord>,
    children: Vec<ShellChild<'r>>,
}

/// Builds the path tree for `records`, passing every structural problem to
/// `sink`.
///
/// Disabled records are ignored. Malformed group references never abort
/// the build; the affected records are left out of the tree instead.
pub fn build<F>(records: &[PathRecord], mut sink: F) -> PathTree
where
    F: FnMut(Diagnostic),
{
    let mut emit = |diagnostic: Diagnostic| {
        debug!(%diagnostic, "path tree diagnostic");
        sink(diagnostic);
    };

    let mut shells: IndexMap<&str, Shell<'_>> = IndexMap::new();
    let mut roots: Vec<&str> = Vec::new();

    for record in records.iter().filter(|r| r.enabled) {
        if !record.is_group {
            if record.is_top_level() {
                emit(Diagnostic::OrphanedField {
                    id: record.id.clone(),
                    group_id: String::new(),
                });
                continue;
            }
            shells
                .entry(record.group_id.as_str())
                .or_default()
                .children
                .push(ShellChild::Field(record));
            continue;
        }

        let shell = shells.entry(record.id.as_str()).or_default();
        if let Some(kept) = shell.record {
            emit(Diagnostic::DuplicateBundle {
                id: record.id.clone(),
                kept: kept.index,
                dropped: record.index,
            });
            continue;
        }
        shell.record = Some(record);

        if record.is_top_level() {
            roots.push(&record.id);
        } else {
            shells
                .entry(record.group_id.as_str())
                .or_default()
                .children
                .push(ShellChild::Bundle(&record.id));
        }
    }

    // Undefined shells: report them, and every field that named them.
    let mut pruned: IndexSet<&str> = IndexSet::new();
    for (&id, shell) in &shells {
        if shell.record.is_some() {
            continue;
        }
        let referenced_by = shell
            .children
            .iter()
            .map(|child| match child {
                ShellChild::Bundle(bundle) => bundle.to_string(),
                ShellChild::Field(field) => field.id.clone(),
            })
            .collect();
        emit(Diagnostic::MissingBundle {
            id: id.to_string(),
            referenced_by,
        });
        for child in &shell.children {
            if let ShellChild::Field(field) = child {
                emit(Diagnostic::OrphanedField {
                    id: field.id.clone(),
                    group_id: id.to_string(),
                });
            }
        }
        mark_descendants(&shells, id, &mut pruned);
    }

    let mut tree = PathTree::empty();
    let mut placed: IndexSet<&str> = IndexSet::new();
    let mut top: Vec<&PathRecord> = roots
        .iter()
        .filter_map(|id| shells.get(id).and_then(|s| s.record))
        .collect();
    top.sort_by_key(|r| (r.weight, r.index));
    for record in top {
        resolve(&shells, record, TreeNodeId::ROOT, &mut tree, &mut placed);
    }

    // Defined groups that were neither placed nor cut off by a missing
    // ancestor can only sit on a parent cycle.
    for (&id, shell) in &shells {
        if shell.record.is_some() && !placed.contains(id) && !pruned.contains(id) {
            emit(Diagnostic::CyclicBundle { id: id.to_string() });
        }
    }

    debug!(
        records = records.len(),
        nodes = tree.len() - 1,
        "path tree built"
    );
    tree
}

/// Marks every group below `id` as pruned.
fn mark_descendants<'r>(
    shells: &IndexMap<&'r str, Shell<'r>>,
    id: &'r str,
    pruned: &mut IndexSet<&'r str>,
) {
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let Some(shell) = shells.get(current) else {
            continue;
        };
        for child in &shell.children {
            if let ShellChild::Bundle(bundle) = child {
                if pruned.insert(*bundle) {
                    stack.push(*bundle);
                }
            }
        }
    }
}

/// Places the bundle defined by `record` under `parent`, then its children
/// in sibling order.
fn resolve<'r>(
    shells: &IndexMap<&'r str, Shell<'r>>,
    record: &'r PathRecord,
    parent: TreeNodeId,
    tree: &mut PathTree,
    placed: &mut IndexSet<&'r str>,
) {
    if !placed.insert(record.id.as_str()) {
        return;
    }
    let id = tree.push(NodeKind::Bundle(record.clone()), parent);

    let Some(shell) = shells.get(record.id.as_str()) else {
        return;
    };

    let mut children: Vec<(&'r PathRecord, bool)> = shell
        .children
        .iter()
        .filter_map(|child| match child {
            ShellChild::Field(field) => Some((*field, false)),
            ShellChild::Bundle(bundle) => shells
                .get(bundle)
                .and_then(|s| s.record)
                .map(|r| (r, true)),
        })
        .collect();
    children.sort_by_key(|(r, _)| (r.weight, r.index));

    for (child, is_bundle) in children {
        if is_bundle {
            resolve(shells, child, id, tree, placed);
        } else {
            tree.push(NodeKind::Field(child.clone()), id);
        }
    }
}

impl PathTree {
    /// Builds the tree and collects diagnostics into a vector.
    pub fn from_records(records: &[PathRecord]) -> (PathTree, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let tree = build(records, |d| diagnostics.push(d));
        (tree, diagnostics)
    }
}
