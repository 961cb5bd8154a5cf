//! Handler for `pinion graph`.

use std::path::PathBuf;

use miette::Result;
use pinion_ops::ops_graph::{self, GraphOptions};

pub fn exec(
    requests: Vec<String>,
    repodata: PathBuf,
    config: Option<PathBuf>,
    no_reduce: bool,
    depth: Option<usize>,
) -> Result<()> {
    let opts = GraphOptions {
        requests,
        repodata,
        config,
        no_reduce,
        depth,
    };
    ops_graph::graph(&opts)
}
