//! Exact solver for the 0/1 selection [`Problem`].
//!
//! Depth-first branch and bound. The search only ever decides packages that
//! are *pending*: requested, or required by an already chosen variable. Each
//! pending package carries the candidates still allowed by every requirement
//! on it; an empty set, or a chosen version outside a later requirement, is
//! a conflict and the branch is abandoned.

use std::time::{Duration, Instant};

use pinion_core::config::SolverConfig;
use pinion_util::errors::PinionError;

use crate::conflict::{ConflictLog, ConflictReport};
use crate::problem::Problem;

/// Time and work budget for one search.
#[derive(Debug, Clone)]
pub struct SolverLimits {
    pub timeout: Duration,
    pub max_steps: Option<u64>,
}

impl SolverLimits {
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            max_steps: config.max_steps,
        }
    }
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

/// An optimal assignment: the set variables, one per selected package.
#[derive(Debug, Clone)]
pub struct Selection {
    pub variables: Vec<usize>,
    pub cost: u64,
    pub steps: u64,
}

/// How often the wall clock is consulted.
const CLOCK_CHECK_INTERVAL: u64 = 64;

#[derive(Clone)]
struct State {
    /// Chosen variable per package.
    chosen: Vec<Option<usize>>,
    /// Candidates still allowed per required package, most preferred first.
    allowed: Vec<Option<Vec<usize>>>,
    cost: u64,
}

struct Search<'p> {
    problem: &'p Problem,
    limits: &'p SolverLimits,
    started: Instant,
    steps: u64,
    best: Option<(u64, Vec<usize>)>,
    conflicts: ConflictLog,
}

/// Find a minimum-cost feasible assignment of `problem`.
pub fn select(problem: &Problem, limits: &SolverLimits) -> Result<Selection, PinionError> {
    let mut search = Search {
        problem,
        limits,
        started: Instant::now(),
        steps: 0,
        best: None,
        conflicts: ConflictLog::default(),
    };

    let mut root = State {
        chosen: vec![None; problem.packages.len()],
        allowed: vec![None; problem.packages.len()],
        cost: 0,
    };
    let mut feasible = true;
    for request in &problem.requests {
        if let Err(package) = search.narrow(&mut root, request.package, &request.candidates) {
            search.record_conflict(&root, package);
            feasible = false;
        }
    }

    if feasible {
        search.descend(root)?;
    }

    tracing::debug!(
        "selection finished after {} step(s) in {:?}",
        search.steps,
        search.started.elapsed()
    );

    match search.best {
        Some((cost, mut variables)) => {
            variables.sort_unstable();
            Ok(Selection {
                variables,
                cost,
                steps: search.steps,
            })
        }
        None => Err(unsatisfiable(search.conflicts.into_report())),
    }
}

fn unsatisfiable(report: ConflictReport) -> PinionError {
    PinionError::Unsatisfiable {
        packages: report.packages(),
        report: report.to_string(),
    }
}

impl Search<'_> {
    fn descend(&mut self, state: State) -> Result<(), PinionError> {
        self.tick()?;

        let mut bound = state.cost;
        let mut next: Option<(usize, usize)> = None;
        for (package, allowed) in state.allowed.iter().enumerate() {
            let Some(allowed) = allowed else { continue };
            if state.chosen[package].is_some() {
                continue;
            }
            bound += allowed
                .iter()
                .map(|&v| self.problem.variables[v].cost)
                .min()
                .unwrap_or(0);
            if next.map_or(true, |(_, len)| allowed.len() < len) {
                next = Some((package, allowed.len()));
            }
        }

        if let Some((best, _)) = &self.best {
            if bound >= *best {
                return Ok(());
            }
        }

        let Some((package, _)) = next else {
            let variables = state.chosen.iter().flatten().copied().collect();
            tracing::trace!("new incumbent with cost {}", state.cost);
            self.best = Some((state.cost, variables));
            return Ok(());
        };

        let candidates = state.allowed[package].clone().unwrap_or_default();
        for var in candidates {
            let mut child = state.clone();
            match self.choose(&mut child, var) {
                Ok(()) => self.descend(child)?,
                Err(clash) => self.record_conflict(&child, clash),
            }
        }
        Ok(())
    }

    /// Set `var` and narrow every package it depends on.
    fn choose(&self, state: &mut State, var: usize) -> Result<(), usize> {
        let variable = &self.problem.variables[var];
        state.chosen[variable.package] = Some(var);
        state.cost += variable.cost;
        for &id in &self.problem.implications_of[var] {
            let imp = &self.problem.implications[id];
            self.narrow(state, imp.package, &imp.candidates)?;
        }
        Ok(())
    }

    /// Require one of `candidates` for `package`; `Err(package)` on a clash.
    fn narrow(&self, state: &mut State, package: usize, candidates: &[usize]) -> Result<(), usize> {
        if let Some(chosen) = state.chosen[package] {
            return if candidates.contains(&chosen) {
                Ok(())
            } else {
                Err(package)
            };
        }
        let narrowed: Vec<usize> = match &state.allowed[package] {
            Some(current) => current
                .iter()
                .copied()
                .filter(|v| candidates.contains(v))
                .collect(),
            None => self.problem.packages[package]
                .variables
                .iter()
                .copied()
                .filter(|v| candidates.contains(v))
                .collect(),
        };
        if narrowed.is_empty() {
            return Err(package);
        }
        state.allowed[package] = Some(narrowed);
        Ok(())
    }

    fn record_conflict(&mut self, state: &State, package: usize) {
        let problem = self.problem;
        let mut required_by: Vec<String> = problem
            .requests
            .iter()
            .filter(|r| r.package == package)
            .map(|r| format!("request {}", r.constraint))
            .collect();
        for var in state.chosen.iter().flatten() {
            for &id in &problem.implications_of[*var] {
                let imp = &problem.implications[id];
                if imp.package == package {
                    required_by.push(format!(
                        "{} requires {}",
                        problem.variables[*var].label, imp.constraint
                    ));
                }
            }
        }
        self.conflicts
            .record(&problem.packages[package].name, required_by);
    }

    fn tick(&mut self) -> Result<(), PinionError> {
        self.steps += 1;
        let over_steps = self.limits.max_steps.is_some_and(|max| self.steps > max);
        let over_time = self.steps % CLOCK_CHECK_INTERVAL == 0
            && self.started.elapsed() > self.limits.timeout;
        if over_steps || over_time {
            return Err(PinionError::SolverTimeout {
                elapsed_ms: self.started.elapsed().as_millis() as u64,
                steps: self.steps,
            });
        }
        Ok(())
    }
}
