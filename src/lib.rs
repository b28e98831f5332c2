//! querypad - embedded document-query engine
//!
//! The query engine of a browser-style query-practice workbench: a
//! hand-written parser for shell-style query strings
//! (`db.users.find({age: {$gt: 25}})`), a dispatcher executing typed
//! operations against an in-memory, persisted collection store, a
//! projection and update-operator interpreter, and a quote/comment-aware
//! statement splitter with a sequential executor for SQL scripts.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `engine`: Operation dispatch, interpreters and the debounced session
//! - `error`: Error types and handling
//! - `formatter`: Output formatting and display
//! - `matcher`: Predicate matching and pipeline ports with reference impls
//! - `parser`: Shell grammar scanning, argument decoding, operation building
//! - `sql`: SQL statement splitting and sequential execution
//! - `store`: Document store and snapshot persistence
//! - `utils`: Shared value helpers
//!
//! # Example
//!
//! ```
//! use querypad::engine::QueryEngine;
//! use querypad::matcher::{BasicMatcher, BasicPipeline};
//! use querypad::store::MemorySnapshots;
//!
//! let mut engine = QueryEngine::new(
//!     Box::new(BasicMatcher::new()),
//!     Box::new(BasicPipeline::new()),
//!     Box::new(MemorySnapshots::new()),
//! );
//!
//! let outcome = engine.execute("db.users.insertOne({name: 'Ann'})");
//! assert!(outcome.success);
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod matcher;
pub mod parser;
pub mod sql;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Outcome, OutcomeData, QueryEngine, Session};
pub use error::{EngineError, Result};
pub use formatter::Formatter;
pub use matcher::{BasicMatcher, BasicPipeline, FilterMatcher, PipelineRunner};
pub use parser::{Operation, parse};
pub use sql::{RelationalEngine, ScriptOutcome, run_script, split_statements};
pub use store::{Document, DocumentStore, FileSnapshots, MemorySnapshots, SnapshotStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
