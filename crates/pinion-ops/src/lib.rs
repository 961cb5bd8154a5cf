pub mod ops_graph;
pub mod ops_resolve;

use std::path::Path;

use pinion_core::config::ResolverConfig;
use pinion_core::repodata::MemoryRepodata;

/// Load the resolver configuration from an explicit file, or from the
/// global config (falling back to defaults when that cannot be read).
pub fn load_config(path: Option<&Path>) -> miette::Result<ResolverConfig> {
    match path {
        Some(path) => ResolverConfig::from_path(path),
        None => Ok(ResolverConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load global config, using defaults: {e}");
            ResolverConfig::default()
        })),
    }
}

/// Read a repodata JSON file.
pub fn load_repodata(path: &Path) -> miette::Result<MemoryRepodata> {
    let repodata = MemoryRepodata::from_path(path)?;
    tracing::debug!(
        "loaded {} package(s) from {}",
        repodata.len(),
        path.display()
    );
    Ok(repodata)
}
