//! Dependency graph construction from an analyzed task batch.
//!
//! `build_graph` is a straight structural transform: one node per task, one
//! edge per dependency entry, cycle membership carried along purely for
//! highlighting. No cycle detection happens here; cycles are whatever the
//! scoring service reported.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

use crate::core::task::{Cycle, Task};

/// A graph node, identified by task id. Positions live in the force
/// simulation, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
}

/// A dependency edge: `source` (the dependency) points at `target` (the
/// dependent). The source id may be absent from the node set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// The dependency graph for one analysis response.
///
/// The petgraph structure holds only edges whose endpoints both resolve to
/// known tasks; the full edge list (dangling edges included) is kept
/// alongside so views can count and render-skip unresolved references.
pub struct TaskGraph {
    graph: DiGraph<GraphNode, ()>,
    index: HashMap<String, NodeIndex>,
    edges: Vec<GraphEdge>,
    cycle_members: HashSet<String>,
}

/// Build the dependency graph for a task batch and the cycles the service
/// reported for it. Runs in O(tasks + total dependency edges).
pub fn build_graph(tasks: &[Task], cycles: &[Cycle]) -> TaskGraph {
    let mut graph = DiGraph::with_capacity(tasks.len(), 0);
    let mut index = HashMap::with_capacity(tasks.len());

    for task in tasks {
        let node = graph.add_node(GraphNode {
            id: task.id.clone(),
        });
        index.entry(task.id.clone()).or_insert(node);
    }

    let mut edges = Vec::new();
    for task in tasks {
        for dep in &task.dependencies {
            edges.push(GraphEdge {
                source: dep.clone(),
                target: task.id.clone(),
            });
            if let (Some(&from), Some(&to)) = (index.get(dep), index.get(&task.id)) {
                graph.add_edge(from, to, ());
            }
        }
    }

    let cycle_members = cycles.iter().flatten().cloned().collect();

    TaskGraph {
        graph,
        index,
        edges,
        cycle_members,
    }
}

impl TaskGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Total edge count including dangling edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn graph(&self) -> &DiGraph<GraphNode, ()> {
        &self.graph
    }

    /// All edges in construction order, dangling ones included.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(index)
    }

    /// True when the id appears in any reported cycle. Used for
    /// highlighting only, never for filtering.
    pub fn is_in_cycle(&self, id: &str) -> bool {
        self.cycle_members.contains(id)
    }

    /// Edges with both endpoints resolved, as node index pairs.
    pub fn resolved_edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, deps: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            due_date: None,
            estimated_hours: 1.0,
            importance: 5,
            dependencies: deps.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_node_and_edge_counts() {
        let tasks = vec![task("a", &[]), task("b", &["a"]), task("c", &["a", "b"])];
        let graph = build_graph(&tasks, &[]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_edge_direction_dependency_to_dependent() {
        let tasks = vec![task("a", &[]), task("b", &["a"])];
        let graph = build_graph(&tasks, &[]);
        assert_eq!(
            graph.edges(),
            &[GraphEdge {
                source: "a".to_string(),
                target: "b".to_string(),
            }]
        );
        let (from, to) = graph.resolved_edges().next().unwrap();
        assert_eq!(graph.node(from).unwrap().id, "a");
        assert_eq!(graph.node(to).unwrap().id, "b");
    }

    #[test]
    fn test_dangling_edges_kept_without_phantom_nodes() {
        let tasks = vec![task("a", &["ghost"])];
        let graph = build_graph(&tasks, &[]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.resolved_edges().count(), 0);
        assert!(graph.node_index("ghost").is_none());
    }

    #[test]
    fn test_cycle_membership() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"]), task("c", &[])];
        let cycles = vec![vec!["a".to_string(), "b".to_string()]];
        let graph = build_graph(&tasks, &cycles);
        assert!(graph.is_in_cycle("a"));
        assert!(graph.is_in_cycle("b"));
        assert!(!graph.is_in_cycle("c"));
        // Cycle ids never filter the structure.
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_duplicate_dependencies_produce_duplicate_edges() {
        let tasks = vec![task("a", &[]), task("b", &["a", "a"])];
        let graph = build_graph(&tasks, &[]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.resolved_edges().count(), 2);
    }

    #[test]
    fn test_same_input_same_output() {
        let tasks = vec![task("a", &["b", "ghost"]), task("b", &[])];
        let cycles = vec![vec!["a".to_string()]];
        let g1 = build_graph(&tasks, &cycles);
        let g2 = build_graph(&tasks, &cycles);
        assert_eq!(g1.edges(), g2.edges());
        assert_eq!(g1.node_count(), g2.node_count());
    }

    #[test]
    fn test_empty_input() {
        let graph = build_graph(&[], &[]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.is_in_cycle("anything"));
    }
}
