use std::{fmt, io};

/// Crate-wide `Result` type using [`EngineError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for querypad operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum EngineError {
    /// Query parsing errors.
    Parse(ParseError),

    /// Operation execution errors.
    Execution(ExecutionError),

    /// Snapshot storage errors.
    Storage(StorageError),

    /// SQL script execution errors.
    Sql(SqlError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Parsing-specific errors.
#[derive(Debug)]
pub enum ParseError {
    /// Input does not match the shell query grammar. Terminal; the
    /// input is not retried under any other grammar.
    InvalidSyntax,

    /// Grammar matched but the method name is not a supported operation.
    UnknownOperation(String),

    /// An argument segment failed to decode as relaxed JSON.
    Decode {
        /// 1-based position of the offending argument.
        position: usize,
        /// Underlying decoder message.
        message: String,
    },

    /// An argument decoded but has the wrong shape for its role.
    BadArgument {
        /// 1-based position of the offending argument.
        position: usize,
        /// What was expected.
        expected: String,
    },
}

/// Execution-specific errors.
#[derive(Debug)]
pub enum ExecutionError {
    /// Filter predicate evaluation failed.
    MatchFailed(String),

    /// Aggregation pipeline execution failed.
    PipelineFailed(String),

    /// An update document used an operator the engine does not know.
    UnknownUpdateOperator(String),

    /// Invalid operation parameters.
    InvalidParameters(String),
}

/// Snapshot storage errors.
#[derive(Debug)]
pub enum StorageError {
    /// Reading the persisted snapshot failed.
    ReadFailed(String),

    /// Writing the snapshot failed.
    WriteFailed(String),

    /// The persisted snapshot could not be deserialized.
    CorruptSnapshot(String),
}

/// SQL script execution errors.
#[derive(Debug)]
pub enum SqlError {
    /// One statement of a script failed; later statements never ran.
    StatementFailed {
        /// 1-based index of the failed statement.
        index: usize,
        /// Total number of statements in the script.
        total: usize,
        /// Error reported by the relational engine.
        message: String,
    },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Parse(e) => write!(f, "{e}"),
            EngineError::Execution(e) => write!(f, "{e}"),
            EngineError::Storage(e) => write!(f, "Storage error: {e}"),
            EngineError::Sql(e) => write!(f, "{e}"),
            EngineError::Config(e) => write!(f, "Configuration error: {e}"),
            EngineError::Io(e) => write!(f, "I/O error: {e}"),
            EngineError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidSyntax => write!(f, "Invalid query syntax"),
            ParseError::UnknownOperation(name) => write!(f, "Unknown operation: {name}"),
            ParseError::Decode { position, message } => {
                write!(f, "Failed to decode argument {position}: {message}")
            }
            ParseError::BadArgument { position, expected } => {
                write!(f, "Argument {position} must be {expected}")
            }
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::MatchFailed(msg) => write!(f, "Filter evaluation failed: {msg}"),
            ExecutionError::PipelineFailed(msg) => write!(f, "Pipeline execution failed: {msg}"),
            ExecutionError::UnknownUpdateOperator(op) => {
                write!(f, "Unknown update operator: {op}")
            }
            ExecutionError::InvalidParameters(msg) => write!(f, "Invalid parameters: {msg}"),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ReadFailed(msg) => write!(f, "Failed to read snapshot: {msg}"),
            StorageError::WriteFailed(msg) => write!(f, "Failed to write snapshot: {msg}"),
            StorageError::CorruptSnapshot(msg) => write!(f, "Corrupt snapshot: {msg}"),
        }
    }
}

impl fmt::Display for SqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlError::StatementFailed {
                index,
                total,
                message,
            } => {
                write!(f, "Statement {index} of {total}: {message}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for ParseError {}
impl std::error::Error for ExecutionError {}
impl std::error::Error for StorageError {}
impl std::error::Error for SqlError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to EngineError ========================= */

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        EngineError::Io(err)
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::Parse(err)
    }
}

impl From<ExecutionError> for EngineError {
    fn from(err: ExecutionError) -> Self {
        EngineError::Execution(err)
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        EngineError::Storage(err)
    }
}

impl From<SqlError> for EngineError {
    fn from(err: SqlError) -> Self {
        EngineError::Sql(err)
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        EngineError::Config(err)
    }
}

impl From<String> for EngineError {
    fn from(msg: String) -> Self {
        EngineError::Generic(msg)
    }
}

impl From<&str> for EngineError {
    fn from(msg: &str) -> Self {
        EngineError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = EngineError::from(ParseError::InvalidSyntax);
        assert_eq!(err.to_string(), "Invalid query syntax");

        let err = EngineError::from(ParseError::UnknownOperation("unknownOp".to_string()));
        assert_eq!(err.to_string(), "Unknown operation: unknownOp");
    }

    #[test]
    fn test_sql_error_display() {
        let err = SqlError::StatementFailed {
            index: 2,
            total: 3,
            message: "no such table: users".to_string(),
        };
        assert_eq!(err.to_string(), "Statement 2 of 3: no such table: users");
    }

    #[test]
    fn test_decode_error_carries_position() {
        let err = ParseError::Decode {
            position: 2,
            message: "expected value at line 1 column 1".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("argument 2"));
        assert!(text.contains("expected value"));
    }
}
