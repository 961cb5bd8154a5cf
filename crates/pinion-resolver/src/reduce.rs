//! Removal of dominated candidate versions.
//!
//! Two versions of one package with the same parents and the same children
//! are interchangeable in every solution, so only the preferred one (higher
//! channel priority, then newer version) has to stay in the graph.

use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use pinion_core::channel::ChannelPriority;

use crate::context::ResolutionContext;

/// Structural context of a node: the requests it satisfies plus its
/// parent and child `(name, version)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    requests: Vec<usize>,
    parents: Vec<(String, String)>,
    children: Vec<(String, String)>,
}

/// Compute the signature of `idx`.
pub fn signature(ctx: &ResolutionContext, idx: NodeIndex) -> Signature {
    let graph = ctx.graph();
    let key = |i: NodeIndex| {
        let node = graph.node(i);
        (node.name.clone(), node.version.original.clone())
    };
    let mut parents: Vec<(String, String)> = graph.parents(idx).into_iter().map(key).collect();
    let mut children: Vec<(String, String)> = graph.children(idx).into_iter().map(key).collect();
    parents.sort();
    children.sort();
    Signature {
        requests: ctx.root_memberships(idx),
        parents,
        children,
    }
}

/// Nodes of `name`, most preferred first.
pub fn preference_order(
    ctx: &ResolutionContext,
    priority: &ChannelPriority,
    name: &str,
) -> Vec<NodeIndex> {
    let graph = ctx.graph();
    let mut nodes = graph.nodes_named(name);
    nodes.sort_by(|&a, &b| {
        let (na, nb) = (graph.node(a), graph.node(b));
        priority
            .priority(&nb.channel)
            .cmp(&priority.priority(&na.channel))
            .then_with(|| nb.version.cmp(&na.version))
            .then_with(|| a.cmp(&b))
    });
    nodes
}

/// Remove dominated nodes until none are left; returns how many were removed.
pub fn reduce(ctx: &mut ResolutionContext, priority: &ChannelPriority) -> usize {
    warn_unknown_channels(ctx, priority);

    let mut removed = 0;
    let mut pass = 0;
    loop {
        pass += 1;
        let removed_now = reduce_pass(ctx, priority);
        tracing::debug!("reduction pass {pass} removed {removed_now} node(s)");
        if removed_now == 0 {
            break;
        }
        removed += removed_now;
    }
    ctx.prune_roots();
    removed
}

fn reduce_pass(ctx: &mut ResolutionContext, priority: &ChannelPriority) -> usize {
    let names: Vec<String> = ctx.graph().names().into_iter().map(String::from).collect();
    let mut removed = 0;
    for name in names {
        let mut seen: HashSet<Signature> = HashSet::new();
        for idx in preference_order(ctx, priority, &name) {
            if !seen.insert(signature(ctx, idx)) {
                let node = ctx.graph_mut().remove_node(idx);
                if let Some(node) = node {
                    tracing::trace!("removed dominated candidate {node}");
                }
                removed += 1;
            }
        }
    }
    removed
}

fn warn_unknown_channels(ctx: &ResolutionContext, priority: &ChannelPriority) {
    let graph = ctx.graph();
    let mut unknown: Vec<&str> = graph
        .node_indices()
        .map(|idx| graph.node(idx).channel.as_str())
        .filter(|channel| !priority.is_known(channel))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    unknown.sort_unstable();
    for channel in unknown {
        tracing::warn!("Channel `{channel}` is not in the configured channel list; ranking it last");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build, build_request};
    use crate::graph::{DepEdge, PackageNode};
    use pinion_core::repodata::{MemoryRepodata, PackageRecord};

    fn edge() -> DepEdge {
        DepEdge {
            constraint: String::new(),
        }
    }

    fn priority() -> ChannelPriority {
        ChannelPriority::new(&["main".to_string(), "extra".to_string()], &[])
    }

    #[test]
    fn twins_keep_only_the_newest() {
        let mut repo = MemoryRepodata::new();
        repo.insert("A", "1.0", PackageRecord::new("main").depends("B"))
            .insert("B", "1.0", PackageRecord::new("main"))
            .insert("B", "2.0", PackageRecord::new("main"))
            .insert("B", "3.0", PackageRecord::new("main"));
        let mut ctx = ResolutionContext::new();
        build("A", "1.0", &repo, &mut ctx).unwrap();

        assert_eq!(reduce(&mut ctx, &priority()), 2);
        let survivors = ctx.graph().nodes_named("B");
        assert_eq!(survivors.len(), 1);
        assert_eq!(ctx.graph().node(survivors[0]).version.to_string(), "3.0");
    }

    #[test]
    fn channel_priority_beats_version() {
        let mut ctx = ResolutionContext::new();
        let g = ctx.graph_mut();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let b_old = g.add_node(PackageNode::new("B", "1.0", "main"));
        let b_new = g.add_node(PackageNode::new("B", "2.0", "extra"));
        g.add_edge(a, b_old, edge());
        g.add_edge(a, b_new, edge());

        assert_eq!(reduce(&mut ctx, &priority()), 1);
        assert!(ctx.graph().contains(b_old));
        assert!(!ctx.graph().contains(b_new));
    }

    #[test]
    fn installed_channel_wins() {
        let mut ctx = ResolutionContext::new();
        let g = ctx.graph_mut();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let b_installed = g.add_node(PackageNode::new("B", "1.0", ""));
        let b_main = g.add_node(PackageNode::new("B", "2.0", "main"));
        g.add_edge(a, b_installed, edge());
        g.add_edge(a, b_main, edge());

        reduce(&mut ctx, &priority());
        assert!(ctx.graph().contains(b_installed));
        assert!(!ctx.graph().contains(b_main));
    }

    #[test]
    fn different_children_are_kept() {
        let mut repo = MemoryRepodata::new();
        repo.insert("A", "1.0", PackageRecord::new("main").depends("B"))
            .insert("B", "1.0", PackageRecord::new("main"))
            .insert("B", "2.0", PackageRecord::new("main").depends("C"))
            .insert("C", "1.0", PackageRecord::new("main"));
        let mut ctx = ResolutionContext::new();
        build("A", "1.0", &repo, &mut ctx).unwrap();

        assert_eq!(reduce(&mut ctx, &priority()), 0);
        assert_eq!(ctx.graph().nodes_named("B").len(), 2);
    }

    #[test]
    fn different_parents_are_kept() {
        let mut ctx = ResolutionContext::new();
        let g = ctx.graph_mut();
        let a = g.add_node(PackageNode::new("A", "1.0", "main"));
        let c = g.add_node(PackageNode::new("C", "1.0", "main"));
        let b1 = g.add_node(PackageNode::new("B", "1.0", "main"));
        let b2 = g.add_node(PackageNode::new("B", "2.0", "main"));
        g.add_edge(a, b1, edge());
        g.add_edge(a, b2, edge());
        g.add_edge(c, b1, edge());

        assert_eq!(reduce(&mut ctx, &priority()), 0);
        assert!(ctx.graph().contains(b1));
        assert!(ctx.graph().contains(b2));
    }

    #[test]
    fn request_membership_protects_candidates() {
        let mut repo = MemoryRepodata::new();
        repo.insert("P", "1.0", PackageRecord::new("main").depends("A"))
            .insert("A", "0.9", PackageRecord::new("main"))
            .insert("A", "1.0", PackageRecord::new("main"));
        let mut ctx = ResolutionContext::new();
        build_request("A <1.0", &repo, &mut ctx).unwrap();
        build_request("P", &repo, &mut ctx).unwrap();

        reduce(&mut ctx, &priority());
        let requested = &ctx.roots()[0];
        assert_eq!(requested.nodes.len(), 1);
        assert_eq!(
            ctx.graph().node(requested.nodes[0]).version.to_string(),
            "0.9"
        );
    }

    #[test]
    fn dominated_roots_are_pruned() {
        let mut repo = MemoryRepodata::new();
        repo.insert("A", "1.0", PackageRecord::new("main"))
            .insert("A", "2.0", PackageRecord::new("main"));
        let mut ctx = ResolutionContext::new();
        build_request("A", &repo, &mut ctx).unwrap();

        assert_eq!(reduce(&mut ctx, &priority()), 1);
        assert_eq!(ctx.roots()[0].nodes.len(), 1);
        let kept = ctx.roots()[0].nodes[0];
        assert_eq!(ctx.graph().node(kept).version.to_string(), "2.0");
    }

    #[test]
    fn twins_across_packages_reduce_in_one_call() {
        // Once the older B is gone both C versions have the same context.
        let mut repo = MemoryRepodata::new();
        repo.insert("A", "1.0", PackageRecord::new("main").depends("C"))
            .insert("C", "1.0", PackageRecord::new("main").depends("B"))
            .insert("C", "2.0", PackageRecord::new("main").depends("B"))
            .insert("B", "1.0", PackageRecord::new("main"))
            .insert("B", "2.0", PackageRecord::new("main"));
        let mut ctx = ResolutionContext::new();
        build("A", "1.0", &repo, &mut ctx).unwrap();

        assert_eq!(reduce(&mut ctx, &priority()), 2);
        let c = ctx.graph().nodes_named("C");
        let b = ctx.graph().nodes_named("B");
        assert_eq!(c.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(ctx.graph().node(c[0]).version.to_string(), "2.0");
        assert_eq!(ctx.graph().children(c[0]), b);
    }

    #[test]
    fn reduction_is_idempotent() {
        let mut repo = MemoryRepodata::new();
        repo.insert("A", "1.0", PackageRecord::new("main").depends("B").depends("C"))
            .insert("B", "1.0", PackageRecord::new("main").depends("C"))
            .insert("B", "2.0", PackageRecord::new("main").depends("C"))
            .insert("C", "1.0", PackageRecord::new("main"))
            .insert("C", "2.0", PackageRecord::new("extra"));
        let mut ctx = ResolutionContext::new();
        build("A", "1.0", &repo, &mut ctx).unwrap();

        assert!(reduce(&mut ctx, &priority()) > 0);
        let before = ctx.graph().len();
        assert_eq!(reduce(&mut ctx, &priority()), 0);
        assert_eq!(ctx.graph().len(), before);
    }

    #[test]
    fn survivors_have_distinct_signatures_and_no_dangling_edges() {
        let mut repo = MemoryRepodata::new();
        repo.insert("A", "1.0", PackageRecord::new("main").depends("B").depends("D"))
            .insert("B", "1.0", PackageRecord::new("main").depends("C"))
            .insert("B", "1.1", PackageRecord::new("main").depends("C"))
            .insert("B", "2.0", PackageRecord::new("main").depends("C >=2"))
            .insert("C", "1.0", PackageRecord::new("main"))
            .insert("C", "2.0", PackageRecord::new("main"))
            .insert("D", "1.0", PackageRecord::new("main").depends("C <2"));
        let mut ctx = ResolutionContext::new();
        build("A", "1.0", &repo, &mut ctx).unwrap();
        let all_before: Vec<NodeIndex> = ctx.graph().node_indices().collect();

        reduce(&mut ctx, &priority());

        let graph = ctx.graph();
        for name in graph.names() {
            let mut seen = HashSet::new();
            for idx in graph.nodes_named(name) {
                assert!(seen.insert(signature(&ctx, idx)), "duplicate signature for {name}");
            }
        }
        let removed: Vec<NodeIndex> = all_before
            .into_iter()
            .filter(|idx| !graph.contains(*idx))
            .collect();
        assert!(!removed.is_empty());
        for idx in graph.node_indices() {
            for other in graph.parents(idx).into_iter().chain(graph.children(idx)) {
                assert!(!removed.contains(&other));
                assert!(graph.contains(other));
            }
        }
    }
}
