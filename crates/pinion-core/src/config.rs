use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pinion_util::errors::PinionError;

/// Resolver configuration loaded from `~/.pinion/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Channel priority order; the first entry has the highest priority.
    #[serde(default = "default_channels_order")]
    pub channels: Vec<String>,

    /// Concrete channels the `defaults` meta-channel stands for.
    #[serde(default = "default_default_channels", rename = "default-channels")]
    pub default_channels: Vec<String>,

    #[serde(default)]
    pub solver: SolverConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            channels: default_channels_order(),
            default_channels: default_default_channels(),
            solver: SolverConfig::default(),
        }
    }
}

fn default_channels_order() -> Vec<String> {
    vec!["defaults".to_string()]
}

fn default_default_channels() -> Vec<String> {
    ["pkgs/main", "pkgs/free", "pkgs/r", "pkgs/pro", "pkgs/msys2"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Selection settings from `[solver]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub objective: Objective,
    #[serde(default = "default_timeout_ms", rename = "timeout-ms")]
    pub timeout_ms: u64,
    #[serde(default, rename = "max-steps")]
    pub max_steps: Option<u64>,
    #[serde(default = "default_reduce")]
    pub reduce: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            objective: Objective::default(),
            timeout_ms: default_timeout_ms(),
            max_steps: None,
            reduce: default_reduce(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_reduce() -> bool {
    true
}

/// Which solutions the selector prefers when several are feasible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    /// Highest channel priority first, then the newest version.
    #[default]
    Newest,
    /// The smallest number of selected packages.
    FewestPackages,
}

impl std::str::FromStr for Objective {
    type Err = PinionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "fewest-packages" => Ok(Self::FewestPackages),
            other => Err(PinionError::Config {
                message: format!(
                    "unknown objective `{other}` (expected `newest` or `fewest-packages`)"
                ),
            }),
        }
    }
}

impl ResolverConfig {
    /// Load the configuration from `~/.pinion/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::from_path(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and parse a configuration file at an explicit path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        tracing::debug!("loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| PinionError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            PinionError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the pinion data directory (`~/.pinion/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".pinion")
}
