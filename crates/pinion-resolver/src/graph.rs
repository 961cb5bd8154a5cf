//! Candidate graph: one node per `(name, version)`, edges from a package
//! version to every candidate version of each of its dependencies.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::version::Version;

/// A candidate package version.
#[derive(Debug, Clone)]
pub struct PackageNode {
    pub name: String,
    pub version: Version,
    pub channel: String,
    /// Selection weight; every node currently weighs 1.
    pub factor: u64,
}

impl PackageNode {
    pub fn new(name: impl Into<String>, version: &str, channel: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Version::parse(version),
            channel: channel.into(),
            factor: 1,
        }
    }
}

impl fmt::Display for PackageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Edge label: the merged constraint the parent places on the child's package.
#[derive(Debug, Clone)]
pub struct DepEdge {
    pub constraint: String,
}

/// Arena of candidate nodes addressed by stable indices.
///
/// Parent and child links are graph edges, so removing a node drops every
/// reference to it in both directions.
pub struct DependencyGraph {
    graph: StableDiGraph<PackageNode, DepEdge>,
    /// `name -> version string -> node`; at most one node per pair.
    index: HashMap<String, HashMap<String, NodeIndex>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Add a node, or return the existing index for the same `(name, version)`.
    pub fn add_node(&mut self, node: PackageNode) -> NodeIndex {
        if let Some(idx) = self.find(&node.name, &node.version.original) {
            return idx;
        }
        let name = node.name.clone();
        let version = node.version.original.clone();
        let idx = self.graph.add_node(node);
        self.index.entry(name).or_default().insert(version, idx);
        idx
    }

    /// Add a dependency edge from `from` to `to` unless one already exists.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: DepEdge) {
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, edge);
        }
    }

    /// Look up a node by exact name and version string.
    pub fn find(&self, name: &str, version: &str) -> Option<NodeIndex> {
        self.index.get(name)?.get(version).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &PackageNode {
        &self.graph[idx]
    }

    pub fn contains(&self, idx: NodeIndex) -> bool {
        self.graph.contains_node(idx)
    }

    /// Remove a node together with all edges touching it.
    pub fn remove_node(&mut self, idx: NodeIndex) -> Option<PackageNode> {
        let node = self.graph.remove_node(idx)?;
        if let Some(versions) = self.index.get_mut(&node.name) {
            versions.remove(&node.version.original);
            if versions.is_empty() {
                self.index.remove(&node.name);
            }
        }
        Some(node)
    }

    /// Nodes that depend on `idx` (the node's in-edges).
    pub fn parents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .collect()
    }

    /// Every candidate `idx` depends on, across all dependency groups.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect()
    }

    /// Children grouped by dependency name: at least one of each group must
    /// be selected whenever `idx` is.
    pub fn dependency_groups(&self, idx: NodeIndex) -> BTreeMap<String, Vec<NodeIndex>> {
        let mut groups: BTreeMap<String, Vec<NodeIndex>> = BTreeMap::new();
        for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
            let child = edge.target();
            groups
                .entry(self.graph[child].name.clone())
                .or_default()
                .push(child);
        }
        for group in groups.values_mut() {
            group.sort();
        }
        groups
    }

    /// The constraint text on the edge `from -> to`.
    pub fn requirement(&self, from: NodeIndex, to: NodeIndex) -> Option<&str> {
        self.graph
            .find_edge(from, to)
            .map(|e| self.graph[e].constraint.as_str())
    }

    /// All live nodes of one package, in index order.
    pub fn nodes_named(&self, name: &str) -> Vec<NodeIndex> {
        let mut nodes: Vec<NodeIndex> = self
            .index
            .get(name)
            .map(|versions| versions.values().copied().collect())
            .unwrap_or_default();
        nodes.sort();
        nodes
    }

    /// Distinct package names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Print the candidate graph below `roots` as an indented tree.
    ///
    /// A node reached again on the same path is printed but not expanded.
    pub fn print_tree(&self, roots: &[NodeIndex], max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let mut visited = HashSet::new();
        for &root in roots {
            if !self.contains(root) {
                continue;
            }
            output.push_str(&format!("{}\n", self.label(root)));
            visited.insert(root);
            self.print_children(&mut output, root, "", 1, max_depth, &mut visited);
            visited.remove(&root);
        }
        output
    }

    fn print_children(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        depth: usize,
        max_depth: Option<usize>,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let mut children = self.children(idx);
        children.sort_by(|a, b| {
            let (a, b) = (&self.graph[*a], &self.graph[*b]);
            a.name.cmp(&b.name).then_with(|| b.version.cmp(&a.version))
        });
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let is_last = i == count - 1;
            let connector = if is_last { "└── " } else { "├── " };
            output.push_str(&format!("{prefix}{connector}{}\n", self.label(child)));

            if max_depth.is_some_and(|max| depth >= max) {
                continue;
            }
            if !visited.insert(child) {
                continue;
            }
            let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            self.print_children(output, child, &child_prefix, depth + 1, max_depth, visited);
            visited.remove(&child);
        }
    }

    fn label(&self, idx: NodeIndex) -> String {
        let node = &self.graph[idx];
        if node.channel.is_empty() {
            format!("{node} (installed)")
        } else {
            format!("{node} [{}]", node.channel)
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(constraint: &str) -> DepEdge {
        DepEdge {
            constraint: constraint.to_string(),
        }
    }

    #[test]
    fn duplicate_add_returns_same_index() {
        let mut g = DependencyGraph::new();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let b = g.add_node(PackageNode::new("A", "1.0", "other"));
        assert_eq!(a, b);
        assert_eq!(g.len(), 1);
        assert_eq!(g.node(a).channel, "main");
    }

    #[test]
    fn find_by_name_and_version() {
        let mut g = DependencyGraph::new();
        let idx = g.add_node(PackageNode::new("A", "1.0", "main"));
        assert_eq!(g.find("A", "1.0"), Some(idx));
        assert_eq!(g.find("A", "2.0"), None);
        assert_eq!(g.find("B", "1.0"), None);
    }

    #[test]
    fn groups_children_by_name() {
        let mut g = DependencyGraph::new();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let b1 = g.add_node(PackageNode::new("B", "1.0", "main"));
        let b2 = g.add_node(PackageNode::new("B", "2.0", "main"));
        let c = g.add_node(PackageNode::new("C", "1.0", "main"));
        g.add_edge(a, b1, edge("B >=1.0"));
        g.add_edge(a, b2, edge("B >=1.0"));
        g.add_edge(a, c, edge("C"));
        g.add_edge(a, c, edge("C"));

        let groups = g.dependency_groups(a);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["B"], vec![b1, b2]);
        assert_eq!(groups["C"], vec![c]);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.parents(b2), vec![a]);
        assert_eq!(g.requirement(a, b1), Some("B >=1.0"));
    }

    #[test]
    fn remove_node_cleans_edges_and_index() {
        let mut g = DependencyGraph::new();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let b = g.add_node(PackageNode::new("B", "1.0", "main"));
        let c = g.add_node(PackageNode::new("C", "1.0", "main"));
        g.add_edge(a, b, edge("B"));
        g.add_edge(b, c, edge("C"));

        let removed = g.remove_node(b).unwrap();
        assert_eq!(removed.name, "B");
        assert!(!g.contains(b));
        assert!(g.children(a).is_empty());
        assert!(g.parents(c).is_empty());
        assert_eq!(g.find("B", "1.0"), None);
        assert!(!g.names().contains(&"B"));
        // Indices of survivors stay valid.
        assert_eq!(g.node(c).name, "C");
    }

    #[test]
    fn tree_printing() {
        let mut g = DependencyGraph::new();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let b1 = g.add_node(PackageNode::new("B", "1.0", "main"));
        let b2 = g.add_node(PackageNode::new("B", "2.0", ""));
        g.add_edge(a, b1, edge("B"));
        g.add_edge(a, b2, edge("B"));

        let tree = g.print_tree(&[a], None);
        assert!(tree.starts_with("A 1.0 [main]\n"));
        assert!(tree.contains("├── B 2.0 (installed)"));
        assert!(tree.contains("└── B 1.0 [main]"));
    }

    #[test]
    fn tree_printing_stops_on_cycles() {
        let mut g = DependencyGraph::new();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let b = g.add_node(PackageNode::new("B", "1.0", "main"));
        g.add_edge(a, b, edge("B"));
        g.add_edge(b, a, edge("A"));

        let tree = g.print_tree(&[a], None);
        assert_eq!(tree.lines().count(), 3);
    }

    #[test]
    fn tree_respects_max_depth() {
        let mut g = DependencyGraph::new();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let b = g.add_node(PackageNode::new("B", "1.0", "main"));
        let c = g.add_node(PackageNode::new("C", "1.0", "main"));
        g.add_edge(a, b, edge("B"));
        g.add_edge(b, c, edge("C"));

        let tree = g.print_tree(&[a], Some(1));
        assert!(tree.contains("B 1.0"));
        assert!(!tree.contains("C 1.0"));
    }
}
