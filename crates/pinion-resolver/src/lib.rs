//! Dependency resolution engine: constraint parsing, candidate graph
//! construction, reduction of dominated versions, and exact 0/1 selection
//! of one version per required package.

pub mod builder;
pub mod conflict;
pub mod constraint;
pub mod context;
pub mod graph;
pub mod lp;
pub mod problem;
pub mod reduce;
pub mod resolver;
pub mod select;
pub mod version;
