//! Operation: resolve requests against a repodata file.

use std::path::{Path, PathBuf};

use pinion_core::config::{Objective, ResolverConfig};
use pinion_core::lockfile::Lockfile;
use pinion_resolver::lp::write_lp;
use pinion_resolver::resolver::{self, Resolution};
use pinion_util::errors::PinionError;

/// Options for `pinion resolve`.
#[derive(Debug, Default)]
pub struct ResolveOptions {
    /// Constraint strings, e.g. `numpy >=1.20`.
    pub requests: Vec<String>,
    pub repodata: PathBuf,
    pub config: Option<PathBuf>,
    /// Overrides `solver.objective` from the config.
    pub objective: Option<Objective>,
    pub no_reduce: bool,
    /// Write a lockfile here.
    pub lock: Option<PathBuf>,
    /// Write the selection problem here in CPLEX LP format.
    pub emit_lp: Option<PathBuf>,
}

/// Resolve, print the chosen packages in install order and write any
/// requested artifacts.
pub fn resolve(opts: &ResolveOptions) -> miette::Result<()> {
    let resolution = run(opts)?;
    print!("{}", format_resolution(&resolution));
    eprintln!(
        "Resolved {} package(s) ({} redundant candidate(s) removed)",
        resolution.packages.len(),
        resolution.stats.nodes_removed
    );
    Ok(())
}

/// Everything `resolve` does except printing.
pub fn run(opts: &ResolveOptions) -> miette::Result<Resolution> {
    let config = effective_config(opts)?;
    let repodata = crate::load_repodata(&opts.repodata)?;
    let requests: Vec<&str> = opts.requests.iter().map(String::as_str).collect();

    let prepared = resolver::prepare(&requests, &repodata, &config)?;
    if let Some(path) = &opts.emit_lp {
        std::fs::write(path, write_lp(&prepared.problem)).map_err(PinionError::Io)?;
        tracing::info!("Wrote selection problem to {}", path.display());
    }

    let resolution = resolver::solve(&prepared, &config)?;

    if let Some(path) = &opts.lock {
        report_lock_changes(path, &resolution);
        resolution.to_lockfile().write(path)?;
        tracing::info!("Wrote lockfile to {}", path.display());
    }

    Ok(resolution)
}

fn effective_config(opts: &ResolveOptions) -> miette::Result<ResolverConfig> {
    let mut config = crate::load_config(opts.config.as_deref())?;
    if let Some(objective) = opts.objective {
        config.solver.objective = objective;
    }
    if opts.no_reduce {
        config.solver.reduce = false;
    }
    Ok(config)
}

/// Log how the new resolution differs from an existing lockfile.
fn report_lock_changes(path: &Path, resolution: &Resolution) {
    if !path.is_file() {
        return;
    }
    let previous = match Lockfile::from_path(path) {
        Ok(lock) => lock,
        Err(e) => {
            tracing::warn!("Ignoring unreadable lockfile {}: {e}", path.display());
            return;
        }
    };
    for package in &resolution.packages {
        match previous.locked_version(&package.name) {
            Some(old) if old != package.version => {
                tracing::info!("Updating {} {old} -> {}", package.name, package.version);
            }
            None => tracing::info!("Adding {} {}", package.name, package.version),
            _ => {}
        }
    }
    for locked in &previous.package {
        if resolution.version_of(&locked.name).is_none() {
            tracing::info!("Removing {} {}", locked.name, locked.version);
        }
    }
}

/// One `name version channel` line per package.
pub fn format_resolution(resolution: &Resolution) -> String {
    let mut out = String::new();
    for p in &resolution.packages {
        let channel = if p.channel.is_empty() {
            "(installed)"
        } else {
            p.channel.as_str()
        };
        out.push_str(&format!("{} {} {}\n", p.name, p.version, channel));
    }
    out
}
