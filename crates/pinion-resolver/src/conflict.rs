//! Conflict collection for unsatisfiable selections.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Every package the selector could not satisfy, with the requirements
/// that clashed on it.
#[derive(Debug, Default)]
pub struct ConflictReport {
    pub conflicts: Vec<PackageConflict>,
}

/// Incompatible requirements on one package.
#[derive(Debug, Clone)]
pub struct PackageConflict {
    pub package: String,
    /// e.g. `C 1.0 requires E >=2.0` or `request E <1.0`.
    pub required_by: Vec<String>,
}

impl ConflictReport {
    /// Conflicting package names, sorted.
    pub fn packages(&self) -> Vec<String> {
        self.conflicts.iter().map(|c| c.package.clone()).collect()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No conflicts.");
        }
        writeln!(f, "Conflicting requirements ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PackageConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.package, self.required_by.join("; "))
    }
}

/// Accumulates conflicts seen while searching; merged per package.
#[derive(Debug, Default)]
pub(crate) struct ConflictLog {
    seen: BTreeMap<String, BTreeSet<String>>,
}

impl ConflictLog {
    pub(crate) fn record(&mut self, package: &str, required_by: impl IntoIterator<Item = String>) {
        self.seen
            .entry(package.to_string())
            .or_default()
            .extend(required_by);
    }

    pub(crate) fn into_report(self) -> ConflictReport {
        ConflictReport {
            conflicts: self
                .seen
                .into_iter()
                .map(|(package, required_by)| PackageConflict {
                    package,
                    required_by: required_by.into_iter().collect(),
                })
                .collect(),
        }
    }
}
