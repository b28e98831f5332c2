//! Error handling module for querypad.
//!
//! The top-level [`EngineError`] wraps per-area kind enums (parsing,
//! execution, storage, SQL script execution, configuration). Fallible
//! functions throughout the crate return the [`Result`] alias defined
//! here; the dispatcher and the script runner convert any error into a
//! failure envelope at the public boundary, so envelope consumers never
//! see a raw `Err`.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{
    ConfigError, EngineError, ExecutionError, ParseError, Result, SqlError, StorageError,
};
