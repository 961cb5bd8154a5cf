//! Resolution pipeline: build the candidate graph for a set of requests,
//! reduce it, formulate the selection problem and solve it.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use petgraph::stable_graph::NodeIndex;
use pinion_core::channel::ChannelPriority;
use pinion_core::config::ResolverConfig;
use pinion_core::lockfile::{LockedPackage, Lockfile};
use pinion_core::repodata::Repodata;
use pinion_util::errors::PinionError;

use crate::builder::{build, build_request};
use crate::context::ResolutionContext;
use crate::problem::Problem;
use crate::reduce::reduce;
use crate::select::{select, SolverLimits};

/// The output of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// One version per selected package, dependencies before dependents.
    pub packages: Vec<ResolvedPackage>,
    pub stats: ResolutionStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    pub channel: String,
    /// Selected dependencies as `name version`, sorted.
    pub depends: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolutionStats {
    pub nodes_built: usize,
    pub nodes_removed: usize,
    pub solver_steps: u64,
    pub cost: u64,
}

/// A built (and possibly reduced) candidate graph with its selection problem.
pub struct Prepared {
    pub context: ResolutionContext,
    pub problem: Problem,
    pub nodes_built: usize,
    pub nodes_removed: usize,
}

/// Resolve `requests` (constraint strings such as `"A >=1.0"`) against `repodata`.
pub fn resolve<R: Repodata + ?Sized>(
    requests: &[&str],
    repodata: &R,
    config: &ResolverConfig,
) -> Result<Resolution, PinionError> {
    let prepared = prepare(requests, repodata, config)?;
    solve(&prepared, config)
}

/// Resolve a single root package at an exact version.
pub fn resolve_exact<R: Repodata + ?Sized>(
    name: &str,
    version: &str,
    repodata: &R,
    config: &ResolverConfig,
) -> Result<Resolution, PinionError> {
    let mut context = ResolutionContext::new();
    let root = build(name, version, repodata, &mut context)?;
    context.add_root(name, &format!("{name} {version}"), vec![root]);
    let prepared = finish(context, config);
    solve(&prepared, config)
}

/// Run the build and reduction phases and formulate the selection problem.
pub fn prepare<R: Repodata + ?Sized>(
    requests: &[&str],
    repodata: &R,
    config: &ResolverConfig,
) -> Result<Prepared, PinionError> {
    let mut context = ResolutionContext::new();
    for request in requests {
        tracing::debug!("building candidates for `{request}`");
        build_request(request, repodata, &mut context)?;
    }
    Ok(finish(context, config))
}

fn finish(mut context: ResolutionContext, config: &ResolverConfig) -> Prepared {
    let priority = ChannelPriority::from_config(config);
    let nodes_built = context.graph().len();
    tracing::info!(
        "Built candidate graph: {} node(s), {} edge(s)",
        nodes_built,
        context.graph().edge_count()
    );

    let nodes_removed = if config.solver.reduce {
        let removed = reduce(&mut context, &priority);
        tracing::info!("Reduced candidate graph by {removed} node(s)");
        removed
    } else {
        0
    };

    let problem = Problem::from_context(&context, &priority, &config.solver.objective);
    tracing::debug!(
        "selection problem: {} variable(s), {} package(s), {} implication(s)",
        problem.variables.len(),
        problem.packages.len(),
        problem.implications.len()
    );

    Prepared {
        context,
        problem,
        nodes_built,
        nodes_removed,
    }
}

/// Select one version per required package from a prepared graph.
pub fn solve(prepared: &Prepared, config: &ResolverConfig) -> Result<Resolution, PinionError> {
    let limits = SolverLimits::from_config(&config.solver);
    let selection = select(&prepared.problem, &limits)?;
    tracing::info!(
        "Selected {} package(s) in {} step(s), cost {}",
        selection.variables.len(),
        selection.steps,
        selection.cost
    );

    let chosen: Vec<NodeIndex> = selection
        .variables
        .iter()
        .map(|&v| prepared.problem.variables[v].node)
        .collect();
    let packages = install_order(&prepared.context, &chosen);

    Ok(Resolution {
        packages,
        stats: ResolutionStats {
            nodes_built: prepared.nodes_built,
            nodes_removed: prepared.nodes_removed,
            solver_steps: selection.steps,
            cost: selection.cost,
        },
    })
}

/// Order the chosen nodes so dependencies come before dependents.
///
/// Members of a dependency cycle are emitted together; otherwise ties go to
/// the alphabetically first package.
fn install_order(ctx: &ResolutionContext, chosen: &[NodeIndex]) -> Vec<ResolvedPackage> {
    let graph = ctx.graph();
    let mut sorted = chosen.to_vec();
    sorted.sort_by(|&a, &b| graph.node(a).name.cmp(&graph.node(b).name));

    let mut sub: DiGraph<NodeIndex, ()> = DiGraph::new();
    let mut local: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    for &idx in &sorted {
        local.insert(idx, sub.add_node(idx));
    }
    for &idx in &sorted {
        for child in graph.children(idx) {
            if let Some(&to) = local.get(&child) {
                sub.add_edge(local[&idx], to, ());
            }
        }
    }

    let sccs = tarjan_scc(&sub);
    let mut component = vec![0; sub.node_count()];
    for (c, members) in sccs.iter().enumerate() {
        for n in members {
            component[n.index()] = c;
        }
    }
    let key = |c: usize| {
        sccs[c]
            .iter()
            .map(|n| graph.node(sub[*n]).name.clone())
            .min()
            .unwrap_or_default()
    };

    // Outstanding dependency components per component.
    let mut waiting: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); sccs.len()];
    let mut dependents: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); sccs.len()];
    for edge in sub.raw_edges() {
        let (from, to) = (
            component[edge.source().index()],
            component[edge.target().index()],
        );
        if from != to {
            waiting[from].insert(to);
            dependents[to].insert(from);
        }
    }

    let mut ready: BTreeSet<(String, usize)> = (0..sccs.len())
        .filter(|&c| waiting[c].is_empty())
        .map(|c| (key(c), c))
        .collect();
    let mut packages = Vec::with_capacity(sorted.len());
    while let Some((name, c)) = ready.pop_first() {
        tracing::trace!("emitting component led by {name}");
        let mut members: Vec<NodeIndex> = sccs[c].iter().map(|n| sub[*n]).collect();
        members.sort_by(|&a, &b| graph.node(a).name.cmp(&graph.node(b).name));
        for idx in members {
            packages.push(resolved_package(ctx, idx, &local));
        }
        for &dependent in &dependents[c] {
            waiting[dependent].remove(&c);
            if waiting[dependent].is_empty() {
                ready.insert((key(dependent), dependent));
            }
        }
    }
    packages
}

fn resolved_package(
    ctx: &ResolutionContext,
    idx: NodeIndex,
    chosen: &HashMap<NodeIndex, NodeIndex>,
) -> ResolvedPackage {
    let graph = ctx.graph();
    let node = graph.node(idx);
    let mut depends: Vec<String> = graph
        .children(idx)
        .into_iter()
        .filter(|child| chosen.contains_key(child))
        .map(|child| graph.node(child).to_string())
        .collect();
    depends.sort();
    ResolvedPackage {
        name: node.name.clone(),
        version: node.version.to_string(),
        channel: node.channel.clone(),
        depends,
    }
}

impl Resolution {
    /// Look up the selected version of `name`.
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.packages
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.version.as_str())
    }

    pub fn to_lockfile(&self) -> Lockfile {
        Lockfile {
            package: self
                .packages
                .iter()
                .map(|p| LockedPackage {
                    name: p.name.clone(),
                    version: p.version.clone(),
                    channel: p.channel.clone(),
                    dependencies: p.depends.clone(),
                })
                .collect(),
        }
    }
}
