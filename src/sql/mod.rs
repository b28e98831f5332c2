//! SQL script splitting and sequential execution
//!
//! The engine does not execute SQL itself; it prepares scripts for an
//! external relational engine. `splitter` divides a multi-statement
//! script while respecting quoting and comments, and `runner` drives
//! the statements through the [`RelationalEngine`] port one at a time,
//! stopping at the first failure.

pub mod runner;
pub mod splitter;

pub use runner::{RelationalEngine, Row, ScriptOutcome, run_script};
pub use splitter::split_statements;
