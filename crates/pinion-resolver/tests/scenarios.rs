use std::collections::HashSet;

use pinion_core::config::{Objective, ResolverConfig};
use pinion_core::repodata::{MemoryRepodata, PackageRecord};
use pinion_resolver::builder::build;
use pinion_resolver::constraint::Constraint;
use pinion_resolver::context::ResolutionContext;
use pinion_resolver::resolver::{prepare, resolve, resolve_exact};
use pinion_resolver::version::Version;
use pinion_util::errors::PinionError;

fn rec() -> PackageRecord {
    PackageRecord::new("pkgs/main")
}

fn pairs(resolution: &pinion_resolver::resolver::Resolution) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = resolution
        .packages
        .iter()
        .map(|p| (p.name.clone(), p.version.clone()))
        .collect();
    pairs.sort();
    pairs
}

fn accepts(spec: &str, version: &str) -> bool {
    Constraint::parse(spec)
        .unwrap()
        .matches(&Version::parse(version))
}

#[test]
fn single_comparators_follow_version_order() {
    assert!(accepts("pkg >=1.2.0", "1.2.0"));
    assert!(accepts("pkg >=1.2.0", "1.3.0"));
    assert!(!accepts("pkg >=1.2.0", "1.1.9"));
    assert!(accepts("pkg >1.2", "1.10"));
    assert!(!accepts("pkg >1.2", "1.2"));
    assert!(accepts("pkg <=2.0", "2.0"));
    assert!(!accepts("pkg <2.0", "2.0"));
    assert!(accepts("pkg !=1.0", "1.1"));
    assert!(!accepts("pkg !=1.0", "1.0"));
}

#[test]
fn equality_is_bounded_by_sentinel() {
    for spec in ["pkg =1.4", "pkg ==1.4", "pkg 1.4"] {
        assert!(accepts(spec, "1.4.0"), "{spec}");
        assert!(accepts(spec, "1.4.5"), "{spec}");
        assert!(!accepts(spec, "1.5.0"), "{spec}");
    }
}

#[test]
fn scenario_a_prefers_newest() {
    let mut repo = MemoryRepodata::new();
    repo.insert("A", "1.0", rec().depends("B>=1.0"))
        .insert("B", "1.0", rec())
        .insert("B", "2.0", rec());

    let resolution = resolve_exact("A", "1.0", &repo, &ResolverConfig::default()).unwrap();
    assert_eq!(
        pairs(&resolution),
        vec![
            ("A".to_string(), "1.0".to_string()),
            ("B".to_string(), "2.0".to_string())
        ]
    );
}

#[test]
fn scenario_b_missing_dependency() {
    let mut repo = MemoryRepodata::new();
    repo.insert("A", "1.0", rec().depends("B>=1.0"))
        .insert("B", "0.9", rec());

    let err = resolve_exact("A", "1.0", &repo, &ResolverConfig::default()).unwrap_err();
    match err {
        PinionError::DependencyNotFound { name, .. } => assert_eq!(name, "B"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn scenario_c_unsatisfiable_names_e() {
    let mut repo = MemoryRepodata::new();
    repo.insert("C", "1.0", rec().depends("E >=2.0"))
        .insert("D", "1.0", rec().depends("E <1.0"))
        .insert("E", "0.1", rec())
        .insert("E", "2.5", rec());

    let err = resolve(&["C", "D"], &repo, &ResolverConfig::default()).unwrap_err();
    match err {
        PinionError::Unsatisfiable { packages, .. } => assert_eq!(packages, vec!["E"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn scenario_c_through_a_common_root() {
    let mut repo = MemoryRepodata::new();
    repo.insert("R", "1.0", rec().depends("C").depends("D"))
        .insert("C", "1.0", rec().depends("E >=2.0"))
        .insert("D", "1.0", rec().depends("E <1.0"))
        .insert("E", "0.1", rec())
        .insert("E", "2.5", rec());

    let err = resolve_exact("R", "1.0", &repo, &ResolverConfig::default()).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains('E'), "{rendered}");
    assert!(matches!(err, PinionError::Unsatisfiable { ref packages, .. } if packages == &["E"]));
}

#[test]
fn built_nodes_are_unique() {
    let mut repo = MemoryRepodata::new();
    repo.insert("A", "1.0", rec().depends("B").depends("C"))
        .insert("B", "1.0", rec().depends("D"))
        .insert("B", "2.0", rec().depends("D >=1"))
        .insert("C", "1.0", rec().depends("D <3").depends("B"))
        .insert("D", "1.0", rec())
        .insert("D", "2.0", rec());

    let mut ctx = ResolutionContext::new();
    build("A", "1.0", &repo, &mut ctx).unwrap();
    let graph = ctx.graph();
    let mut seen = HashSet::new();
    for idx in graph.node_indices() {
        let node = graph.node(idx);
        assert!(seen.insert((node.name.clone(), node.version.to_string())));
    }
    assert_eq!(seen.len(), 6);
}

#[test]
fn dependency_cycles_resolve() {
    let mut repo = MemoryRepodata::new();
    repo.insert("A", "1.0", rec().depends("B 1.0"))
        .insert("B", "1.0", rec().depends("A 1.0"));

    let resolution = resolve_exact("A", "1.0", &repo, &ResolverConfig::default()).unwrap();
    assert_eq!(resolution.packages.len(), 2);
}

#[test]
fn channel_order_outranks_version() {
    let mut repo = MemoryRepodata::new();
    repo.insert("app", "1.0", PackageRecord::new("conda-forge").depends("lib"))
        .insert("lib", "1.0", PackageRecord::new("pkgs/main"))
        .insert("lib", "2.0", PackageRecord::new("conda-forge"));

    let config = ResolverConfig {
        channels: vec!["defaults".to_string(), "conda-forge".to_string()],
        ..ResolverConfig::default()
    };
    let resolution = resolve(&["app"], &repo, &config).unwrap();
    assert_eq!(resolution.version_of("lib"), Some("1.0"));
}

#[test]
fn fewest_packages_objective() {
    let mut repo = MemoryRepodata::new();
    repo.insert("A", "1.0", rec().depends("B"))
        .insert("B", "1.0", rec())
        .insert("B", "2.0", rec().depends("C"))
        .insert("C", "1.0", rec());

    let mut config = ResolverConfig::default();
    config.solver.objective = Objective::FewestPackages;
    let resolution = resolve(&["A"], &repo, &config).unwrap();
    assert_eq!(resolution.packages.len(), 2);
    assert_eq!(resolution.version_of("B"), Some("1.0"));
}

#[test]
fn step_limit_reports_timeout() {
    let mut repo = MemoryRepodata::new();
    repo.insert("A", "1.0", rec().depends("B"))
        .insert("B", "1.0", rec().depends("C"))
        .insert("C", "1.0", rec());

    let mut config = ResolverConfig::default();
    config.solver.max_steps = Some(1);
    let err = resolve(&["A"], &repo, &config).unwrap_err();
    assert!(matches!(err, PinionError::SolverTimeout { .. }));
}

#[test]
fn reduction_shrinks_but_keeps_the_answer() {
    let mut repo = MemoryRepodata::new();
    repo.insert("A", "1.0", rec().depends("B").depends("C"))
        .insert("B", "1.0", rec())
        .insert("B", "1.1", rec())
        .insert("B", "1.2", rec())
        .insert("C", "1.0", rec().depends("B <1.2"));

    let reduced = resolve(&["A"], &repo, &ResolverConfig::default()).unwrap();
    let mut config = ResolverConfig::default();
    config.solver.reduce = false;
    let full = resolve(&["A"], &repo, &config).unwrap();

    assert_eq!(pairs(&reduced), pairs(&full));
    assert_eq!(reduced.version_of("B"), Some("1.1"));
    assert!(reduced.stats.nodes_removed > 0);

    let prepared = prepare(&["A"], &repo, &ResolverConfig::default()).unwrap();
    assert!(prepared.context.graph().len() < prepared.nodes_built);
}

#[test]
fn time_limit_reports_timeout() {
    let mut repo = MemoryRepodata::new();
    let mut root = rec();
    for i in 0..40 {
        let name = format!("lib{i:02}");
        root = root.depends(name.clone());
        for minor in 0..6 {
            repo.insert(name.clone(), format!("2.{minor}"), rec());
        }
    }
    repo.insert("app", "1.0", root);

    let mut config = ResolverConfig::default();
    config.solver.reduce = false;
    config.solver.timeout_ms = 0;
    let err = resolve(&["app"], &repo, &config).unwrap_err();
    match err {
        PinionError::SolverTimeout { steps, .. } => assert!(steps >= 64),
        other => panic!("unexpected error: {other}"),
    }
}
