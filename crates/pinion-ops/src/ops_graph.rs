//! Operation: display the candidate graph.

use std::path::PathBuf;

use pinion_resolver::resolver;

/// Options for `pinion graph`.
#[derive(Debug, Default)]
pub struct GraphOptions {
    pub requests: Vec<String>,
    pub repodata: PathBuf,
    pub config: Option<PathBuf>,
    pub no_reduce: bool,
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
}

/// Print the (reduced) candidate graph below the requested packages.
pub fn graph(opts: &GraphOptions) -> miette::Result<()> {
    print!("{}", render(opts)?);
    Ok(())
}

pub fn render(opts: &GraphOptions) -> miette::Result<String> {
    let mut config = crate::load_config(opts.config.as_deref())?;
    if opts.no_reduce {
        config.solver.reduce = false;
    }
    let repodata = crate::load_repodata(&opts.repodata)?;
    let requests: Vec<&str> = opts.requests.iter().map(String::as_str).collect();

    let prepared = resolver::prepare(&requests, &repodata, &config)?;
    let ctx = &prepared.context;
    eprintln!(
        "{} candidate node(s), {} removed as redundant",
        ctx.graph().len(),
        prepared.nodes_removed
    );
    Ok(ctx.graph().print_tree(&ctx.root_nodes(), opts.depth))
}
