//! Read-only access to repository metadata.
//!
//! The resolver only ever talks to the [`Repodata`] trait. [`MemoryRepodata`]
//! is the in-memory implementation backed by a JSON document of the form
//!
//! ```json
//! { "A": { "1.0": { "depends": ["B >=1.0"], "channel": "pkgs/main" } } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use pinion_util::errors::PinionError;

/// Metadata for one version of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Dependency constraint strings, in declaration order.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Source channel; empty means already installed.
    #[serde(default)]
    pub channel: String,
}

impl PackageRecord {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            depends: Vec::new(),
            channel: channel.into(),
        }
    }

    /// Append a dependency constraint.
    pub fn depends(mut self, spec: impl Into<String>) -> Self {
        self.depends.push(spec.into());
        self
    }
}

/// Source of known package versions and their declared dependencies.
pub trait Repodata {
    /// All known versions of `name`, in no particular order. Empty if unknown.
    fn versions(&self, name: &str) -> Vec<&str>;

    /// Metadata for one `(name, version)`.
    fn record(&self, name: &str, version: &str) -> Option<&PackageRecord>;
}

/// Repodata held entirely in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryRepodata {
    packages: BTreeMap<String, BTreeMap<String, PackageRecord>>,
}

impl MemoryRepodata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one package version.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        record: PackageRecord,
    ) -> &mut Self {
        self.packages
            .entry(name.into())
            .or_default()
            .insert(version.into(), record);
        self
    }

    /// Parse repodata from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, PinionError> {
        serde_json::from_str(content).map_err(|e| PinionError::Repodata {
            message: format!("Failed to parse repodata: {e}"),
        })
    }

    /// Load and parse a repodata JSON file.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PinionError::Repodata {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Ok(Self::from_json_str(&content)?)
    }

    /// Number of distinct package names.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl Repodata for MemoryRepodata {
    fn versions(&self, name: &str) -> Vec<&str> {
        self.packages
            .get(name)
            .map(|versions| versions.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn record(&self, name: &str, version: &str) -> Option<&PackageRecord> {
        self.packages.get(name)?.get(version)
    }
}
