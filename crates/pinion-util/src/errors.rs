use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all pinion operations.
#[derive(Debug, Error, Diagnostic)]
pub enum PinionError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable resolver configuration.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check your config.toml for syntax errors"))]
    Config { message: String },

    /// Invalid or unreadable repository metadata.
    #[error("Repodata error: {message}")]
    Repodata { message: String },

    /// A version constraint string does not match any accepted shape.
    #[error("Invalid constraint `{spec}`: {reason}")]
    #[diagnostic(help(
        "Accepted forms: `name`, `name <op> version`, `name <op> version, <op> version`, \
         `name version`, `name version build` where <op> is one of >=, >, <=, <, !=, =, =="
    ))]
    ConstraintParse { spec: String, reason: String },

    /// No available version of a dependency satisfies its constraints.
    #[error("No version of `{name}` satisfies `{constraint}` (required by {required_by})")]
    DependencyNotFound {
        name: String,
        constraint: String,
        required_by: String,
    },

    /// The selection problem has no feasible solution.
    #[error("Unsatisfiable constraints for package(s): {}", .packages.join(", "))]
    Unsatisfiable {
        packages: Vec<String>,
        #[help]
        report: String,
    },

    /// The selector ran out of its time or step budget.
    #[error("Solver gave up after {elapsed_ms} ms and {steps} steps")]
    #[diagnostic(help("Raise `solver.timeout-ms` or `solver.max-steps` in the config"))]
    SolverTimeout { elapsed_ms: u64, steps: u64 },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
