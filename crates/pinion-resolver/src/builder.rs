//! Recursive construction of the candidate graph.
//!
//! Every version compatible with a dependency's constraints becomes a child
//! of the depending node; choosing among them is left to the selector.

use std::slice;

use petgraph::stable_graph::NodeIndex;
use pinion_core::repodata::Repodata;
use pinion_util::errors::PinionError;

use crate::constraint::{filter_candidates, group_by_name, Constraint};
use crate::context::ResolutionContext;
use crate::graph::{DepEdge, PackageNode};
use crate::version::Version;

/// Build (or reuse) the node for `name` at `version` and everything below it.
///
/// A node is registered in `ctx` before its dependencies are expanded, so a
/// dependency cycle ends at the already registered node instead of recursing.
pub fn build<R: Repodata + ?Sized>(
    name: &str,
    version: &str,
    repodata: &R,
    ctx: &mut ResolutionContext,
) -> Result<NodeIndex, PinionError> {
    if let Some(existing) = ctx.lookup(name, version) {
        return Ok(existing);
    }

    let record = repodata
        .record(name, version)
        .ok_or_else(|| PinionError::Repodata {
            message: format!("`{name} {version}` is not in the repodata"),
        })?;

    let idx = ctx
        .graph_mut()
        .add_node(PackageNode::new(name, version, record.channel.as_str()));
    tracing::trace!("expanding {name} {version}");

    for constraint in group_by_name(record.depends.as_slice())? {
        let candidates = candidates_for(&constraint, repodata);
        if candidates.is_empty() {
            return Err(PinionError::DependencyNotFound {
                name: constraint.name.clone(),
                constraint: constraint.to_string(),
                required_by: format!("{name} {version}"),
            });
        }

        let label = constraint.to_string();
        for candidate in candidates {
            let child = build(&constraint.name, candidate, repodata, ctx)?;
            ctx.graph_mut().add_edge(
                idx,
                child,
                DepEdge {
                    constraint: label.clone(),
                },
            );
        }
    }

    Ok(idx)
}

/// Parse a request such as `"A >=1.0"`, build every matching version of the
/// requested package and record them as one root group.
pub fn build_request<R: Repodata + ?Sized>(
    request: &str,
    repodata: &R,
    ctx: &mut ResolutionContext,
) -> Result<Vec<NodeIndex>, PinionError> {
    let constraint = Constraint::parse(request)?;
    let candidates = candidates_for(&constraint, repodata);
    if candidates.is_empty() {
        return Err(PinionError::DependencyNotFound {
            name: constraint.name.clone(),
            constraint: constraint.to_string(),
            required_by: "the request".to_string(),
        });
    }

    let mut nodes = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        nodes.push(build(&constraint.name, candidate, repodata, ctx)?);
    }
    ctx.add_root(&constraint.name, &constraint.to_string(), nodes.clone());
    Ok(nodes)
}

/// Versions of the constrained package that satisfy it, newest first.
fn candidates_for<'r, R: Repodata + ?Sized>(
    constraint: &Constraint,
    repodata: &'r R,
) -> Vec<&'r str> {
    let available = repodata.versions(&constraint.name);
    let mut candidates = filter_candidates(slice::from_ref(constraint), &available);
    candidates.sort_by_cached_key(|v| std::cmp::Reverse(Version::parse(v)));
    candidates
}
