//! End-to-end scenarios: record list -> path tree -> model graph.
//!
//! Each test builds a small path list, reconstructs the tree, runs the
//! builder under one deduplication policy and checks the shape of the
//! resulting concept graph.

use petgraph::algo::is_cyclic_directed;
use proptest::prelude::*;

use pathgraph_core::{NodeId, PathRecord};
use pathgraph_model::{
    build_graph, Deduplication, GraphSummary, ModelEdge, ModelGraph, ModelNode, NodeContext, NodeKey,
};
use pathgraph_tree::{Diagnostic, PathTree, PathTreeNode};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn tree(mut records: Vec<PathRecord>) -> PathTree {
    PathRecord::number(&mut records);
    let (tree, diagnostics) = PathTree::from_records(&records);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    tree
}

fn all(_: PathTreeNode<'_>) -> bool {
    true
}

/// Handles of every concept node drawn for `class_uri`.
fn concept_handles(graph: &ModelGraph, class_uri: &str) -> Vec<NodeId> {
    graph
        .nodes()
        .filter_map(|(id, n)| match n {
            ModelNode::Concept(c) if c.class_uri == class_uri => Some(id),
            ModelNode::Concept(_) | ModelNode::Literal(_) => None,
        })
        .collect()
}

/// Labels and edges in handle order, ignoring handles themselves.
fn shape(graph: &ModelGraph) -> (Vec<ModelNode>, Vec<(u32, u32, ModelEdge)>) {
    let nodes = graph.nodes().map(|(_, n)| n.clone()).collect();
    let edges = graph
        .edges()
        .map(|e| (e.from.0, e.to.0, e.label.clone()))
        .collect();
    (nodes, edges)
}

/// A museum-like record list: two bundles sharing classes, nested groups,
/// datatype fields and a disambiguated field.
fn museum() -> Vec<PathRecord> {
    vec![
        PathRecord::group("object", "", &["Object"]),
        PathRecord::field("title", "object", &["Object", "hasTitle", "Title"]).with_datatype("value"),
        PathRecord::field("maker", "object", &["Object", "producedBy", "Production", "carriedOutBy", "Person"])
            .with_disambiguation(3),
        PathRecord::group("production", "object", &["Object", "producedBy", "Production"]).with_weight(2),
        PathRecord::field("date", "production", &["Object", "producedBy", "Production", "hasDate", "Date"])
            .with_datatype("value"),
        PathRecord::field("place", "production", &["Object", "producedBy", "Production", "tookPlaceAt", "Place"]),
        PathRecord::group("person", "", &["Person"]),
        PathRecord::field("name", "person", &["Person"]).with_datatype("name"),
        PathRecord::field("born", "person", &["Person", "bornIn", "Place"]),
    ]
}

// ---------------------------------------------------------------------------
// Tree scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_fields_ordered_by_weight() {
    let tree = tree(vec![
        PathRecord::group("A", "", &["C"]),
        PathRecord::field("F1", "A", &["C"]).with_weight(5),
        PathRecord::field("F2", "A", &["C"]).with_weight(1),
    ]);
    let roots: Vec<_> = tree.children().map(|n| n.record().unwrap().id.clone()).collect();
    assert_eq!(roots, vec!["A"]);
    let fields: Vec<_> = tree
        .find("A")
        .unwrap()
        .fields()
        .map(|n| n.record().unwrap().id.clone())
        .collect();
    assert_eq!(fields, vec!["F2", "F1"]);
}

#[test]
fn scenario_lone_orphan() {
    let mut records = vec![PathRecord::field("orphan", "ghost", &["C"])];
    PathRecord::number(&mut records);
    let (tree, diagnostics) = PathTree::from_records(&records);
    assert_eq!(tree.children().count(), 0);
    let orphans = diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::OrphanedField { id, .. } if id == "orphan"))
        .count();
    assert_eq!(orphans, 1);
}

// ---------------------------------------------------------------------------
// Policy scenarios
// ---------------------------------------------------------------------------

#[test]
fn parents_shares_prefix_with_bundle_only() {
    let tree = tree(vec![
        PathRecord::group("B", "", &["A", "p", "B", "q", "C"]),
        PathRecord::field("f1", "B", &["A", "p", "B", "q", "C", "r", "D"]),
        PathRecord::field("f2", "B", &["A", "p", "B", "q", "C", "s", "D"]),
    ]);
    let graph = build_graph(&tree, all, Deduplication::Parents).unwrap();

    for shared in ["A", "B", "C"] {
        assert_eq!(concept_handles(&graph, shared).len(), 1, "{} should be shared", shared);
    }
    assert_eq!(concept_handles(&graph, "D").len(), 2);
    assert!(graph.definitely_acyclic());
    assert!(!is_cyclic_directed(graph.graph()));
}

#[test]
fn parents_shares_prefix_ending_on_a_property() {
    let tree = tree(vec![
        PathRecord::group("B", "", &["A", "p", "B", "q"]),
        PathRecord::field("f1", "B", &["A", "p", "B", "q", "C", "r", "D"]),
        PathRecord::field("f2", "B", &["A", "p", "B", "q", "E", "s", "D"]),
    ]);
    let graph = build_graph(&tree, all, Deduplication::Parents).unwrap();

    // The bundle draws A and B; both fields inherit them.
    assert_eq!(concept_handles(&graph, "A").len(), 1);
    assert_eq!(concept_handles(&graph, "B").len(), 1);
    assert_eq!(concept_handles(&graph, "C").len(), 1);
    assert_eq!(concept_handles(&graph, "E").len(), 1);
    assert_eq!(concept_handles(&graph, "D").len(), 2);

    // One shared q edge per diverging target.
    let q_edges = graph
        .edges()
        .filter(|e| matches!(e.label, ModelEdge::Property { property_uri } if property_uri == "q"))
        .count();
    assert_eq!(q_edges, 2);
    assert!(!is_cyclic_directed(graph.graph()));
}

#[test]
fn none_draws_every_included_occurrence() {
    let records = museum();
    let tree = tree(records.clone());
    let graph = build_graph(&tree, all, Deduplication::None).unwrap();

    let occurrences: usize = records.iter().map(|r| r.path_array.len().div_ceil(2)).sum();
    assert_eq!(GraphSummary::of(&graph).concepts, occurrences);
    assert!(!is_cyclic_directed(graph.graph()));
}

#[test]
fn none_counts_only_included_nodes() {
    let records = museum();
    let tree = tree(records.clone());
    let include = |n: PathTreeNode<'_>| n.record().is_some_and(|r| r.id != "title");
    let graph = build_graph(&tree, include, Deduplication::None).unwrap();

    let occurrences: usize = records
        .iter()
        .filter(|r| r.id != "title")
        .map(|r| r.path_array.len().div_ceil(2))
        .sum();
    assert_eq!(GraphSummary::of(&graph).concepts, occurrences);
}

#[test]
fn full_collapses_classes_across_bundles() {
    let tree = tree(vec![
        PathRecord::group("X", "", &["Thing"]),
        PathRecord::field("a", "X", &["Thing", "locatedIn", "Place"]),
        PathRecord::group("Y", "", &["Event"]),
        PathRecord::field("b", "Y", &["Event", "tookPlaceAt", "Place"]),
    ]);
    let graph = build_graph(&tree, all, Deduplication::Full).unwrap();
    let places = concept_handles(&graph, "Place");
    assert_eq!(places.len(), 1);

    match graph.node(places[0]).unwrap() {
        ModelNode::Concept(c) => assert_eq!(c.fields.len(), 2),
        ModelNode::Literal(_) => panic!("expected concept"),
    }
    assert!(!graph.definitely_acyclic());
}

#[test]
fn full_self_reference_is_a_cycle() {
    let tree = tree(vec![
        PathRecord::group("P", "", &["Person"]),
        PathRecord::field("knows", "P", &["Person", "knows", "Person"]),
    ]);
    let graph = build_graph(&tree, all, Deduplication::Full).unwrap();
    assert_eq!(GraphSummary::of(&graph).concepts, 1);
    assert!(is_cyclic_directed(graph.graph()));
    assert!(!graph.definitely_acyclic());
}

#[test]
fn property_edges_are_idempotent() {
    let tree = tree(vec![
        PathRecord::group("X", "", &["A"]),
        PathRecord::field("f1", "X", &["A", "p", "B"]),
        PathRecord::group("Y", "", &["C"]),
        PathRecord::field("f2", "Y", &["A", "p", "B"]).with_datatype("d"),
    ]);
    let graph = build_graph(&tree, all, Deduplication::Full).unwrap();
    let p_edges = graph
        .edges()
        .filter(|e| matches!(e.label, ModelEdge::Property { property_uri } if property_uri == "p"))
        .count();
    assert_eq!(p_edges, 1);
}

#[test]
fn bundle_scopes_merge_bundle_classes() {
    let tree = tree(museum());
    let graph = build_graph(&tree, all, Deduplication::Bundle).unwrap();

    // "Person" ends the person bundle and is the maker's disambiguated
    // concept, so every occurrence lands in the "Person" scope.
    let person = NodeKey::class(NodeContext::named("Person"), "Person");
    let handle = graph.node_id(&person).unwrap();
    assert_eq!(concept_handles(&graph, "Person"), vec![handle]);

    let maker = tree.find("maker").unwrap().id();
    let bundle = tree.find("person").unwrap().id();
    match graph.node(handle).unwrap() {
        ModelNode::Concept(c) => {
            assert!(c.fields.contains(&maker));
            assert!(c.bundles.contains(&bundle));
        }
        ModelNode::Literal(_) => panic!("expected concept"),
    }

    // "Place" is not a scope: the production's place and the person's
    // birthplace stay apart.
    assert_eq!(concept_handles(&graph, "Place").len(), 2);
}

#[test]
fn every_policy_keeps_bundle_membership() {
    let tree = tree(museum());
    for dedup in Deduplication::ALL {
        let graph = build_graph(&tree, all, dedup).unwrap();
        let bundles: usize = graph
            .nodes()
            .map(|(_, n)| match n {
                ModelNode::Concept(c) => c.bundles.len(),
                ModelNode::Literal(_) => 0,
            })
            .sum();
        assert_eq!(bundles, 3, "policy {}", dedup);
        if graph.definitely_acyclic() {
            assert!(!is_cyclic_directed(graph.graph()), "policy {}", dedup);
        }
    }
}

#[test]
fn literal_fields_cover_every_datatype_field() {
    let tree = tree(museum());
    for dedup in Deduplication::ALL {
        let graph = build_graph(&tree, all, dedup).unwrap();
        let fields: usize = graph
            .nodes()
            .map(|(_, n)| match n {
                ModelNode::Literal(l) => l.fields.len(),
                ModelNode::Concept(_) => 0,
            })
            .sum();
        assert_eq!(fields, 3, "policy {}", dedup);
    }
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn builds_are_deterministic() {
    let tree = tree(museum());
    for dedup in Deduplication::ALL {
        let first = build_graph(&tree, all, dedup).unwrap();
        let second = build_graph(&tree, all, dedup).unwrap();
        assert_eq!(shape(&first), shape(&second), "policy {}", dedup);
    }
}

proptest! {
    #[test]
    fn random_paths_build_deterministically(
        paths in proptest::collection::vec(
            proptest::collection::vec(0usize..4, 1..4),
            1..8,
        ),
        dedup in proptest::sample::select(Deduplication::ALL.to_vec()),
    ) {
        let classes = ["A", "B", "C", "D"];
        let mut records = vec![PathRecord::group("G", "", &["A"])];
        for (i, concepts) in paths.iter().enumerate() {
            let mut path: Vec<&str> = vec!["A"];
            for &c in concepts {
                path.push("p");
                path.push(classes[c]);
            }
            records.push(PathRecord::field(&format!("f{}", i), "G", &path));
        }
        PathRecord::number(&mut records);
        let (tree, _) = PathTree::from_records(&records);

        let first = build_graph(&tree, all, dedup).unwrap();
        let second = build_graph(&tree, all, dedup).unwrap();
        prop_assert_eq!(shape(&first), shape(&second));

        if first.definitely_acyclic() {
            prop_assert!(!is_cyclic_directed(first.graph()));
        }
    }
}
