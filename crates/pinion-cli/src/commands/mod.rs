//! Command dispatch and handler modules.

mod graph;
mod resolve;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve {
            requests,
            repodata,
            config,
            objective,
            no_reduce,
            lock,
            emit_lp,
        } => resolve::exec(requests, repodata, config, objective, no_reduce, lock, emit_lp),
        Command::Graph {
            requests,
            repodata,
            config,
            no_reduce,
            depth,
        } => graph::exec(requests, repodata, config, no_reduce, depth),
    }
}
