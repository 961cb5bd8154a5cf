use serde::{Deserialize, Serialize};
use std::path::Path;

use pinion_util::errors::PinionError;

/// Lockfile recording the exact package versions chosen by a resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lockfile {
    #[serde(default)]
    pub package: Vec<LockedPackage>,
}

/// A single locked package, listed in install order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub channel: String,
    /// Locked packages this one depends on, each as `"name version"`.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Lockfile {
    /// Load and parse a lockfile from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PinionError::Generic {
            message: format!("Failed to read lockfile: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| {
            PinionError::Generic {
                message: format!("Failed to parse lockfile: {e}"),
            }
            .into()
        })
    }

    /// Serialize the lockfile to a pretty-printed TOML string.
    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Write the lockfile to `path`.
    pub fn write(&self, path: &Path) -> miette::Result<()> {
        let content = self.to_string_pretty().map_err(|e| PinionError::Generic {
            message: format!("Failed to serialize lockfile: {e}"),
        })?;
        std::fs::write(path, content).map_err(PinionError::Io)?;
        Ok(())
    }

    /// The locked version of `name`, if present.
    pub fn locked_version(&self, name: &str) -> Option<&str> {
        self.package
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.version.as_str())
    }
}
