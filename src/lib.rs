//! # decorator-search
//!
//! Finds every method in a tree of Java sources and lets you query them by
//! their annotations ("decorators").
//!
//! ## Architecture
//!
//! - **syntax**: Language-neutral declaration model and the `SourceParser` seam
//! - **java**: tree-sitter front end lowering Java sources into that model
//! - **record**: `Decorator` and `FunctionRecord`, the flattened search unit
//! - **normalize**: Annotation reduction into `{name, value}` decorators
//! - **query**: Immutable, chainable `ResultSet`
//! - **pretty**: Terminal rendering of result sets
//! - **scan**: Source file discovery with exact-name ignores
//! - **ingest**: Parallel parse-and-normalize of a whole tree
//! - **expr**: The query language used by the shell and `--eval`
//! - **session**: Interactive shell state (`ds`, `_`, `let` bindings)
//! - **cli** / **config**: Command line definition and resolution

pub mod cli;
pub mod config;
pub mod expr;
pub mod ingest;
pub mod java;
pub mod normalize;
pub mod pretty;
pub mod query;
pub mod record;
pub mod scan;
pub mod session;
pub mod syntax;
