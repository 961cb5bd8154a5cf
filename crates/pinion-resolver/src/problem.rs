//! The 0/1 selection problem extracted from a reduced candidate graph.
//!
//! One binary variable per node. Constraints:
//! - at most one variable per package is set
//! - exactly one candidate of every request is set
//! - a set variable implies at least one candidate of each of its dependency groups
//! - a variable that is not a request candidate is only set when one of its
//!   parents is set
//!
//! The objective minimises the summed variable costs given by a [`Preference`].

use std::collections::HashMap;

use petgraph::stable_graph::NodeIndex;
use pinion_core::channel::ChannelPriority;
use pinion_core::config::Objective;

use crate::context::ResolutionContext;
use crate::graph::PackageNode;
use crate::reduce::preference_order;

/// Scores candidate nodes; lower cost is preferred.
pub trait Preference {
    /// `rank` is the node's position among its package's nodes ordered by
    /// channel priority then version, newest first (0 = most preferred).
    fn cost(&self, node: &PackageNode, rank: usize) -> u64;
}

/// Prefer the highest channel priority, then the newest version.
pub struct Newest;

impl Preference for Newest {
    fn cost(&self, _node: &PackageNode, rank: usize) -> u64 {
        rank as u64
    }
}

/// Prefer selecting as few packages as possible.
pub struct FewestPackages;

impl Preference for FewestPackages {
    fn cost(&self, node: &PackageNode, _rank: usize) -> u64 {
        node.factor
    }
}

impl Preference for Objective {
    fn cost(&self, node: &PackageNode, rank: usize) -> u64 {
        match self {
            Objective::Newest => Newest.cost(node, rank),
            Objective::FewestPackages => FewestPackages.cost(node, rank),
        }
    }
}

/// A binary decision variable.
#[derive(Debug, Clone)]
pub struct Variable {
    pub node: NodeIndex,
    pub package: usize,
    pub cost: u64,
    /// `name version` of the node.
    pub label: String,
}

/// All variables of one package, most preferred first.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub variables: Vec<usize>,
}

/// Exactly one of `candidates` must be set.
#[derive(Debug, Clone)]
pub struct Request {
    pub package: usize,
    pub constraint: String,
    pub candidates: Vec<usize>,
}

/// If `from` is set, at least one of `candidates` (all of package `package`) must be.
#[derive(Debug, Clone)]
pub struct Implication {
    pub from: usize,
    pub package: usize,
    pub constraint: String,
    pub candidates: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Problem {
    pub variables: Vec<Variable>,
    pub packages: Vec<Package>,
    pub requests: Vec<Request>,
    pub implications: Vec<Implication>,
    /// Implication ids per variable.
    pub implications_of: Vec<Vec<usize>>,
    /// Parent variables per variable.
    pub parents: Vec<Vec<usize>>,
    /// Whether a variable is a candidate of some request.
    pub requested: Vec<bool>,
}

impl Problem {
    /// Formulate the selection problem over the nodes of `ctx`.
    pub fn from_context(
        ctx: &ResolutionContext,
        priority: &ChannelPriority,
        preference: &dyn Preference,
    ) -> Self {
        let graph = ctx.graph();
        let mut problem = Problem::default();
        let mut var_of: HashMap<NodeIndex, usize> = HashMap::new();

        for name in graph.names() {
            let package = problem.packages.len();
            let mut variables = Vec::new();
            for (rank, idx) in preference_order(ctx, priority, name).into_iter().enumerate() {
                let node = graph.node(idx);
                let var = problem.variables.len();
                problem.variables.push(Variable {
                    node: idx,
                    package,
                    cost: preference.cost(node, rank),
                    label: node.to_string(),
                });
                var_of.insert(idx, var);
                variables.push(var);
            }
            problem.packages.push(Package {
                name: name.to_string(),
                variables,
            });
        }

        let count = problem.variables.len();
        problem.implications_of = vec![Vec::new(); count];
        problem.parents = vec![Vec::new(); count];
        problem.requested = vec![false; count];

        for group in ctx.roots() {
            let candidates: Vec<usize> = group
                .nodes
                .iter()
                .filter_map(|idx| var_of.get(idx).copied())
                .collect();
            for &var in &candidates {
                problem.requested[var] = true;
            }
            let package = problem
                .packages
                .iter()
                .position(|p| p.name == group.name);
            match package {
                Some(package) => problem.requests.push(Request {
                    package,
                    constraint: group.constraint.clone(),
                    candidates,
                }),
                // Every candidate of this request is gone; keep it unsatisfiable.
                None => {
                    problem.packages.push(Package {
                        name: group.name.clone(),
                        variables: Vec::new(),
                    });
                    problem.requests.push(Request {
                        package: problem.packages.len() - 1,
                        constraint: group.constraint.clone(),
                        candidates: Vec::new(),
                    });
                }
            }
        }

        for from in 0..count {
            let idx = problem.variables[from].node;
            for (dep_name, children) in graph.dependency_groups(idx) {
                let candidates: Vec<usize> =
                    children.iter().map(|child| var_of[child]).collect();
                let Some(&first) = candidates.first() else {
                    continue;
                };
                let constraint = graph
                    .requirement(idx, children[0])
                    .unwrap_or(dep_name.as_str())
                    .to_string();
                for &child in &candidates {
                    problem.parents[child].push(from);
                }
                let id = problem.implications.len();
                problem.implications.push(Implication {
                    from,
                    package: problem.variables[first].package,
                    constraint,
                    candidates,
                });
                problem.implications_of[from].push(id);
            }
        }

        problem
    }

    pub fn package_of(&self, var: usize) -> &Package {
        &self.packages[self.variables[var].package]
    }
}
