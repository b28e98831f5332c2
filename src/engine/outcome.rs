//! Operation result envelope
//!
//! Every dispatched operation returns an [`Outcome`]: the uniform
//! success/error/timing wrapper. The payload lives in [`OutcomeData`],
//! one variant per operation family, and `to_json` renders the wire
//! envelope consumed by display layers and host applications.

use serde_json::{Value, json};

use crate::store::Document;

/// Result of one dispatched operation.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Success status.
    pub success: bool,

    /// Operation payload; [`OutcomeData::None`] on failure.
    pub data: OutcomeData,

    /// Error message if failed.
    pub error: Option<String>,

    /// Wall-clock time from parse start to envelope assembly.
    pub execution_time_ms: u64,
}

/// Payload returned by an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeData {
    /// Documents returned by find or aggregate.
    Documents(Vec<Document>),

    /// The single document (or none) returned by findOne.
    Document(Option<Document>),

    /// Insert-one result.
    Inserted { id: Value },

    /// Insert-many result.
    InsertedMany { ids: Vec<Value> },

    /// Update result.
    Updated { matched: u64, modified: u64 },

    /// Delete result.
    Deleted { deleted: u64 },

    /// Count result.
    Count(u64),

    /// Drop result: whether the collection existed.
    Dropped(bool),

    /// No payload.
    None,
}

impl Outcome {
    /// Create a successful outcome.
    pub fn success(data: OutcomeData, execution_time_ms: u64) -> Self {
        Self {
            success: true,
            data,
            error: None,
            execution_time_ms,
        }
    }

    /// Create a failed outcome.
    pub fn failure(error: String, execution_time_ms: u64) -> Self {
        Self {
            success: false,
            data: OutcomeData::None,
            error: Some(error),
            execution_time_ms,
        }
    }

    /// Render the envelope as JSON.
    ///
    /// Keys: `success` and `executionTime` always; `error` on failure;
    /// `data`/`count` for reads; `insertedId`/`insertedIds`,
    /// `matchedCount`/`modifiedCount`, `deletedCount` and `dropped` per
    /// operation family.
    pub fn to_json(&self) -> Value {
        let mut object = Document::new();
        object.insert("success".to_string(), json!(self.success));
        object.insert(
            "executionTime".to_string(),
            json!(self.execution_time_ms),
        );

        if let Some(error) = &self.error {
            object.insert("error".to_string(), json!(error));
        }

        match &self.data {
            OutcomeData::Documents(docs) => {
                object.insert("data".to_string(), json!(docs));
                object.insert("count".to_string(), json!(docs.len()));
            }
            OutcomeData::Document(doc) => {
                object.insert("data".to_string(), json!(doc));
            }
            OutcomeData::Inserted { id } => {
                object.insert("insertedId".to_string(), id.clone());
            }
            OutcomeData::InsertedMany { ids } => {
                object.insert("insertedIds".to_string(), json!(ids));
                object.insert("count".to_string(), json!(ids.len()));
            }
            OutcomeData::Updated { matched, modified } => {
                object.insert("matchedCount".to_string(), json!(matched));
                object.insert("modifiedCount".to_string(), json!(modified));
            }
            OutcomeData::Deleted { deleted } => {
                object.insert("deletedCount".to_string(), json!(deleted));
            }
            OutcomeData::Count(count) => {
                object.insert("count".to_string(), json!(count));
            }
            OutcomeData::Dropped(dropped) => {
                object.insert("dropped".to_string(), json!(dropped));
            }
            OutcomeData::None => {}
        }

        Value::Object(object)
    }
}
