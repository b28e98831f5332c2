//! Query parser for querypad
//!
//! Turns a raw shell-style query string into a typed [`Operation`].
//! The parser is split into focused modules:
//! - `shell`: character scanner for the `db.<collection>.<method>(<args>)`
//!   grammar
//! - `args`: top-level argument splitting and relaxed-JSON decoding
//! - `operation`: the closed operation enum and its builder
//!
//! # Examples
//!
//! ```
//! use querypad::parser::parse;
//!
//! let op = parse("db.users.find({age: {$gt: 18}})").unwrap();
//! assert_eq!(op.collection(), "users");
//! ```

pub mod args;
pub mod operation;
pub mod shell;

pub use operation::{FindOptions, Operation, UpdateSpec};
pub use shell::{ShellCall, ShellScanner};

use crate::error::Result;

/// Parse an input string into a typed [`Operation`].
///
/// This is the main parsing entry point: grammar recognition, argument
/// decoding and descriptor construction in one step. Errors are terminal;
/// the input is never retried under another grammar.
pub fn parse(input: &str) -> Result<Operation> {
    let call = ShellScanner::parse(input)?;
    Operation::build(&call)
}
