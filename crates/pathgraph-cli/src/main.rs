//! Path graph CLI.
//!
//! Provides the `pathgraph` binary for inspecting decoded path record lists
//! (a JSON array of records). `tree` prints the reconstructed bundle/field
//! hierarchy, `graph` builds the concept graph under one deduplication
//! policy and prints it as text or JSON.
//!
//! Structural diagnostics go to stderr and never change the exit code.

use std::fs;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

use pathgraph_core::{EdgeId, NodeId, PathRecord};
use pathgraph_model::{
    build_graph, exclude_ids, Deduplication, GraphSummary, ModelEdge, ModelGraph, ModelNode,
};
use pathgraph_tree::{NodeKind, PathTree};

/// Semantic path list inspection tools.
#[derive(Parser)]
#[command(name = "pathgraph", about = "Semantic path list inspection tools")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the bundle/field hierarchy.
    Tree {
        /// Path to a JSON array of path records.
        #[arg(short, long)]
        input: String,
    },

    /// Build and print the concept graph.
    Graph {
        /// Path to a JSON array of path records.
        #[arg(short, long)]
        input: String,

        /// Deduplication policy: full, bundle, parents, none.
        #[arg(short, long, default_value = "bundle")]
        dedup: Deduplication,

        /// Record ID to leave out, together with everything below it.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Print the graph as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Commands::Tree { input } => run_tree(&input),
        Commands::Graph {
            input,
            dedup,
            exclude,
            json,
        } => run_graph(&input, dedup, exclude, json),
    };
    process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the record list and reconstructs the tree, printing diagnostics.
///
/// Returns exit code on failure: 2 = malformed input, 3 = I/O error.
fn load_tree(path: &str) -> Result<PathTree, i32> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", path, e);
            return Err(3);
        }
    };

    let mut records: Vec<PathRecord> = match serde_json::from_str(&text) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: '{}' is not a path record list: {}", path, e);
            return Err(2);
        }
    };
    PathRecord::number(&mut records);

    let (tree, diagnostics) = PathTree::from_records(&records);
    if !diagnostics.is_empty() {
        eprintln!("{} diagnostic(s):", diagnostics.len());
        for diagnostic in &diagnostics {
            eprintln!("  - {}", diagnostic);
        }
    }
    Ok(tree)
}

/// Execute the tree subcommand.
fn run_tree(input: &str) -> i32 {
    let tree = match load_tree(input) {
        Ok(tree) => tree,
        Err(code) => return code,
    };

    for node in tree.walk() {
        let (marker, record) = match node.kind() {
            NodeKind::Root => continue,
            NodeKind::Bundle(record) => ('+', record),
            NodeKind::Field(record) => ('-', record),
        };
        let indent = "  ".repeat(node.depth().saturating_sub(1));
        let path: Vec<&str> = record.uris().collect();
        println!("{}{} {}: {}", indent, marker, record.id, path.join(" "));
    }
    0
}

/// Execute the graph subcommand.
///
/// Returns exit code: 0 = success, 1 = build error, 2 = malformed input,
/// 3 = I/O error.
fn run_graph(input: &str, dedup: Deduplication, exclude: Vec<String>, json: bool) -> i32 {
    let tree = match load_tree(input) {
        Ok(tree) => tree,
        Err(code) => return code,
    };

    let graph = match build_graph(&tree, exclude_ids(exclude), dedup) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Graph build error: {}", e);
            return 1;
        }
    };

    if json {
        let dump = GraphDump::new(&tree, &graph, dedup);
        let json = serde_json::to_string_pretty(&dump)
            .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize graph: {}\"}}", e));
        println!("{}", json);
    } else {
        print_graph(&tree, &graph, dedup);
    }
    0
}

/// Record IDs of the tree nodes merged into `node`.
fn member_ids<'t>(tree: &'t PathTree, node: &ModelNode) -> Vec<&'t str> {
    node.members()
        .filter_map(|id| tree.node(id))
        .filter_map(|n| n.record())
        .map(|r| r.id.as_str())
        .collect()
}

fn print_graph(tree: &PathTree, graph: &ModelGraph, dedup: Deduplication) {
    let summary = GraphSummary::of(graph);
    println!("{} deduplication: {}", dedup.name(), dedup.description());
    println!(
        "{} concept(s), {} literal(s), {} property edge(s), {} data edge(s){}",
        summary.concepts,
        summary.literals,
        summary.properties,
        summary.data,
        if graph.definitely_acyclic() { ", acyclic" } else { "" }
    );

    for (id, node) in graph.nodes() {
        let members = member_ids(tree, node).join(", ");
        match node {
            ModelNode::Concept(concept) => {
                println!("n{} concept {} [{}]", id, concept.class_uri, members)
            }
            ModelNode::Literal(_) => println!("n{} literal [{}]", id, members),
        }
    }
    for edge in graph.edges() {
        match edge.label {
            ModelEdge::Property { property_uri } => {
                println!("n{} -{}-> n{}", edge.from, property_uri, edge.to)
            }
            ModelEdge::Data { property_uri } => {
                println!("n{} ={}=> n{}", edge.from, property_uri, edge.to)
            }
        }
    }
}

/// JSON shape of the `graph --json` output.
#[derive(Serialize)]
struct GraphDump<'a> {
    deduplication: Deduplication,
    definitely_acyclic: bool,
    summary: GraphSummary,
    nodes: Vec<NodeDump<'a>>,
    edges: Vec<EdgeDump<'a>>,
}

#[derive(Serialize)]
struct NodeDump<'a> {
    id: NodeId,
    #[serde(flatten)]
    label: &'a ModelNode,
    members: Vec<&'a str>,
}

#[derive(Serialize)]
struct EdgeDump<'a> {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    #[serde(flatten)]
    label: &'a ModelEdge,
}

impl<'a> GraphDump<'a> {
    fn new(tree: &'a PathTree, graph: &'a ModelGraph, dedup: Deduplication) -> Self {
        GraphDump {
            deduplication: dedup,
            definitely_acyclic: graph.definitely_acyclic(),
            summary: GraphSummary::of(graph),
            nodes: graph
                .nodes()
                .map(|(id, label)| NodeDump {
                    id,
                    label,
                    members: member_ids(tree, label),
                })
                .collect(),
            edges: graph
                .edges()
                .map(|edge| EdgeDump {
                    id: edge.id,
                    from: edge.from,
                    to: edge.to,
                    label: edge.label,
                })
                .collect(),
        }
    }
}
