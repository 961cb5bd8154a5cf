//! Handler for `pinion resolve`.

use std::path::PathBuf;

use miette::Result;
use pinion_core::config::Objective;
use pinion_ops::ops_resolve::{self, ResolveOptions};

pub fn exec(
    requests: Vec<String>,
    repodata: PathBuf,
    config: Option<PathBuf>,
    objective: Option<Objective>,
    no_reduce: bool,
    lock: Option<PathBuf>,
    emit_lp: Option<PathBuf>,
) -> Result<()> {
    let opts = ResolveOptions {
        requests,
        repodata,
        config,
        objective,
        no_reduce,
        lock,
        emit_lp,
    };
    ops_resolve::resolve(&opts)
}
