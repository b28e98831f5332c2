//! Sequential statement executor
//!
//! Runs split statements one at a time, in order, against the injected
//! relational engine. The first failing statement stops execution; the
//! envelope reports which statement failed out of how many, and the
//! remaining statements are never dispatched. No rollback is attempted
//! here: transactional semantics, if any, belong to the engine behind
//! the port. On success the envelope carries the last statement's rows,
//! the total statement count and the cumulative elapsed time across all
//! statements.

use std::time::Instant;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Result, SqlError};
use crate::sql::splitter::split_statements;
use crate::store::Document;

/// One result row, a column → value map.
pub type Row = Document;

/// Port to the relational engine that actually executes SQL.
pub trait RelationalEngine {
    /// Execute one statement, returning its rows or an error.
    fn execute(&mut self, sql: &str) -> Result<Vec<Row>>;
}

/// Result envelope for a whole script run.
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    /// Success status.
    pub success: bool,

    /// Rows from the last executed statement; empty on failure.
    pub rows: Vec<Row>,

    /// Error message, annotated with the failing statement's position.
    pub error: Option<String>,

    /// Total number of statements the script split into.
    pub statement_count: usize,

    /// Cumulative wall-clock time across all executed statements.
    pub execution_time_ms: u64,
}

impl ScriptOutcome {
    /// Render the envelope as JSON.
    pub fn to_json(&self) -> Value {
        let mut object = Document::new();
        object.insert("success".to_string(), json!(self.success));
        object.insert(
            "statementCount".to_string(),
            json!(self.statement_count),
        );
        object.insert(
            "executionTime".to_string(),
            json!(self.execution_time_ms),
        );
        if self.success {
            object.insert("rows".to_string(), json!(self.rows));
        }
        if let Some(error) = &self.error {
            object.insert("error".to_string(), json!(error));
        }
        Value::Object(object)
    }
}

/// Split `script` and execute its statements sequentially.
///
/// Always returns an envelope; statement failures never propagate as
/// errors. An empty script (nothing but whitespace or comments) yields
/// a successful envelope with zero statements.
pub fn run_script(engine: &mut dyn RelationalEngine, script: &str) -> ScriptOutcome {
    let start = Instant::now();
    let statements = split_statements(script);
    let total = statements.len();
    debug!("Running script with {total} statement(s)");

    let mut rows = Vec::new();
    for (index, statement) in statements.iter().enumerate() {
        match engine.execute(statement) {
            Ok(result) => rows = result,
            Err(e) => {
                let error = SqlError::StatementFailed {
                    index: index + 1,
                    total,
                    message: e.to_string(),
                };
                debug!("Script aborted: {error}");
                return ScriptOutcome {
                    success: false,
                    rows: Vec::new(),
                    error: Some(error.to_string()),
                    statement_count: total,
                    execution_time_ms: start.elapsed().as_millis() as u64,
                };
            }
        }
    }

    ScriptOutcome {
        success: true,
        rows,
        error: None,
        statement_count: total,
        execution_time_ms: start.elapsed().as_millis() as u64,
    }
}
