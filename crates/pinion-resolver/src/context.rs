//! Per-resolution state.
//!
//! A [`ResolutionContext`] is created at the start of one resolution, threaded
//! by reference through graph construction, reduction and selection, and
//! dropped at the end. Nothing in it outlives the call.

use petgraph::stable_graph::NodeIndex;

use crate::graph::DependencyGraph;

/// One user request: the package it names and its candidate nodes.
#[derive(Debug, Clone)]
pub struct RootGroup {
    pub name: String,
    pub constraint: String,
    pub nodes: Vec<NodeIndex>,
}

/// The memo table and candidate graph of a single resolution.
#[derive(Default)]
pub struct ResolutionContext {
    graph: DependencyGraph,
    roots: Vec<RootGroup>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node already built for `(name, version)`, if any.
    pub fn lookup(&self, name: &str, version: &str) -> Option<NodeIndex> {
        self.graph.find(name, version)
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut DependencyGraph {
        &mut self.graph
    }

    /// Record a request; requests for an already requested package extend its group.
    pub fn add_root(&mut self, name: &str, constraint: &str, nodes: Vec<NodeIndex>) {
        if let Some(group) = self.roots.iter_mut().find(|g| g.name == name) {
            group.constraint = format!("{}, {constraint}", group.constraint);
            group.nodes.retain(|idx| nodes.contains(idx));
            return;
        }
        self.roots.push(RootGroup {
            name: name.to_string(),
            constraint: constraint.to_string(),
            nodes,
        });
    }

    pub fn roots(&self) -> &[RootGroup] {
        &self.roots
    }

    /// Indices of the root groups `idx` belongs to.
    pub fn root_memberships(&self, idx: NodeIndex) -> Vec<usize> {
        self.roots
            .iter()
            .enumerate()
            .filter(|(_, g)| g.nodes.contains(&idx))
            .map(|(i, _)| i)
            .collect()
    }

    /// Every live root node, in request order.
    pub fn root_nodes(&self) -> Vec<NodeIndex> {
        self.roots
            .iter()
            .flat_map(|g| g.nodes.iter().copied())
            .filter(|idx| self.graph.contains(*idx))
            .collect()
    }

    /// Drop root entries whose nodes have been removed from the graph.
    pub fn prune_roots(&mut self) {
        let graph = &self.graph;
        for group in &mut self.roots {
            group.nodes.retain(|idx| graph.contains(*idx));
        }
    }
}
