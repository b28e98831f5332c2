//! Operation descriptors
//!
//! This module defines the closed set of operations the engine executes
//! and the builder that maps a scanned shell call onto one of them. The
//! descriptor is a tagged enum constructed immediately after argument
//! decoding, so every downstream interpreter path matches exhaustively
//! on a known shape instead of inspecting untyped argument bags.

use serde_json::Value;

use crate::error::{ExecutionError, ParseError, Result};
use crate::parser::args::decode_arguments;
use crate::parser::shell::ShellCall;
use crate::store::Document;

/// A parsed, typed operation. Immutable once built; consumed exactly
/// once by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Find documents matching a filter.
    Find {
        collection: String,
        filter: Value,
        options: FindOptions,
    },

    /// Find the first document matching a filter.
    FindOne {
        collection: String,
        filter: Value,
        options: FindOptions,
    },

    /// Insert a single document.
    InsertOne {
        collection: String,
        document: Document,
    },

    /// Insert multiple documents.
    InsertMany {
        collection: String,
        documents: Vec<Document>,
    },

    /// Apply update operators to the first matching document.
    UpdateOne {
        collection: String,
        filter: Value,
        update: UpdateSpec,
    },

    /// Apply update operators to every matching document.
    UpdateMany {
        collection: String,
        filter: Value,
        update: UpdateSpec,
    },

    /// Delete the first matching document.
    DeleteOne { collection: String, filter: Value },

    /// Delete every matching document.
    DeleteMany { collection: String, filter: Value },

    /// Count documents matching a filter.
    CountDocuments { collection: String, filter: Value },

    /// Run an aggregation pipeline.
    Aggregate {
        collection: String,
        pipeline: Vec<Value>,
    },

    /// Remove the collection.
    Drop { collection: String },
}

/// Options for find operations, decoded from the options segment.
///
/// Unrecognized option keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Sort specification: field → direction (`1` ascending, `-1`
    /// descending), applied before skip and limit.
    pub sort: Option<Document>,

    /// Number of documents to skip after sorting.
    pub skip: Option<u64>,

    /// Maximum number of documents to return.
    pub limit: Option<u64>,

    /// Field projection applied to the returned documents.
    pub projection: Option<Document>,
}

impl FindOptions {
    fn from_segment(value: Option<&Value>, position: usize) -> Result<Self> {
        let Some(value) = value else {
            return Ok(Self::default());
        };
        let object = expect_object(value, position)?;

        let mut options = Self::default();
        if let Some(sort) = object.get("sort") {
            options.sort = Some(expect_object(sort, position)?.clone());
        }
        if let Some(projection) = object.get("projection") {
            options.projection = Some(expect_object(projection, position)?.clone());
        }
        options.skip = unsigned_option(object.get("skip"), "skip", position)?;
        options.limit = unsigned_option(object.get("limit"), "limit", position)?;

        Ok(options)
    }
}

/// The update operators present on one update operation.
///
/// Operators are applied per matched document in a fixed order:
/// `$set`, `$unset`, `$inc`, `$mul`, `$min`, `$max`, `$rename`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    pub set: Option<Document>,
    pub unset: Option<Document>,
    pub inc: Option<Document>,
    pub mul: Option<Document>,
    pub min: Option<Document>,
    pub max: Option<Document>,
    pub rename: Option<Document>,
}

impl UpdateSpec {
    /// Validate and destructure a decoded update document.
    ///
    /// Every key must be a known operator and every operator value an
    /// object; an empty update document is rejected, so a matched
    /// document always receives at least one operator.
    pub fn from_value(value: &Value, position: usize) -> Result<Self> {
        let object = expect_object(value, position)?;
        if object.is_empty() {
            return Err(ExecutionError::InvalidParameters(
                "update document must contain at least one update operator".to_string(),
            )
            .into());
        }

        let mut spec = Self::default();
        for (key, table) in object {
            let table = expect_object(table, position)?.clone();
            match key.as_str() {
                "$set" => spec.set = Some(table),
                "$unset" => spec.unset = Some(table),
                "$inc" => spec.inc = Some(table),
                "$mul" => spec.mul = Some(table),
                "$min" => spec.min = Some(table),
                "$max" => spec.max = Some(table),
                "$rename" => {
                    for (field, target) in &table {
                        if !target.is_string() {
                            return Err(ExecutionError::InvalidParameters(format!(
                                "$rename target for field '{field}' must be a string"
                            ))
                            .into());
                        }
                    }
                    spec.rename = Some(table);
                }
                other => {
                    return Err(
                        ExecutionError::UnknownUpdateOperator(other.to_string()).into(),
                    );
                }
            }
        }

        Ok(spec)
    }
}

impl Operation {
    /// Build a typed operation from a scanned shell call.
    ///
    /// Decodes the call's argument span, then maps the decoded segments
    /// onto the positional roles of the named operation. Unsupported
    /// method names are rejected here, after the grammar matched, so the
    /// error carries the method name.
    pub fn build(call: &ShellCall) -> Result<Self> {
        let segments = decode_arguments(&call.args)?;
        let collection = call.collection.clone();

        match call.operation.as_str() {
            "find" => Ok(Operation::Find {
                collection,
                filter: filter_segment(&segments, 0)?,
                options: FindOptions::from_segment(segments.get(1), 2)?,
            }),
            "findOne" => Ok(Operation::FindOne {
                collection,
                filter: filter_segment(&segments, 0)?,
                options: FindOptions::from_segment(segments.get(1), 2)?,
            }),
            "insertOne" => Ok(Operation::InsertOne {
                collection,
                document: document_segment(&segments, 0)?,
            }),
            "insertMany" => Ok(Operation::InsertMany {
                collection,
                documents: document_array_segment(&segments, 0)?,
            }),
            "updateOne" => Ok(Operation::UpdateOne {
                collection,
                filter: filter_segment(&segments, 0)?,
                update: update_segment(&segments, 1)?,
            }),
            "updateMany" => Ok(Operation::UpdateMany {
                collection,
                filter: filter_segment(&segments, 0)?,
                update: update_segment(&segments, 1)?,
            }),
            "deleteOne" => Ok(Operation::DeleteOne {
                collection,
                filter: filter_segment(&segments, 0)?,
            }),
            "deleteMany" => Ok(Operation::DeleteMany {
                collection,
                filter: filter_segment(&segments, 0)?,
            }),
            "countDocuments" => Ok(Operation::CountDocuments {
                collection,
                filter: filter_segment(&segments, 0)?,
            }),
            "aggregate" => Ok(Operation::Aggregate {
                collection,
                pipeline: pipeline_segment(&segments, 0)?,
            }),
            "drop" => Ok(Operation::Drop { collection }),
            other => Err(ParseError::UnknownOperation(other.to_string()).into()),
        }
    }

    /// The collection this operation targets.
    pub fn collection(&self) -> &str {
        match self {
            Operation::Find { collection, .. }
            | Operation::FindOne { collection, .. }
            | Operation::InsertOne { collection, .. }
            | Operation::InsertMany { collection, .. }
            | Operation::UpdateOne { collection, .. }
            | Operation::UpdateMany { collection, .. }
            | Operation::DeleteOne { collection, .. }
            | Operation::DeleteMany { collection, .. }
            | Operation::CountDocuments { collection, .. }
            | Operation::Aggregate { collection, .. }
            | Operation::Drop { collection } => collection,
        }
    }
}

/* ========================= Segment helpers ========================= */

fn expect_object(value: &Value, position: usize) -> Result<&Document> {
    value.as_object().ok_or_else(|| {
        ParseError::BadArgument {
            position,
            expected: "an object".to_string(),
        }
        .into()
    })
}

/// The filter role: missing segment defaults to the match-all filter.
fn filter_segment(segments: &[Value], index: usize) -> Result<Value> {
    match segments.get(index) {
        Some(value) => {
            expect_object(value, index + 1)?;
            Ok(value.clone())
        }
        None => Ok(Value::Object(Document::new())),
    }
}

fn document_segment(segments: &[Value], index: usize) -> Result<Document> {
    let value = segments.get(index).ok_or_else(|| ParseError::BadArgument {
        position: index + 1,
        expected: "an object".to_string(),
    })?;
    Ok(expect_object(value, index + 1)?.clone())
}

fn document_array_segment(segments: &[Value], index: usize) -> Result<Vec<Document>> {
    let value = segments.get(index).ok_or_else(|| ParseError::BadArgument {
        position: index + 1,
        expected: "an array of objects".to_string(),
    })?;
    let array = value.as_array().ok_or_else(|| ParseError::BadArgument {
        position: index + 1,
        expected: "an array of objects".to_string(),
    })?;

    array
        .iter()
        .map(|item| Ok(expect_object(item, index + 1)?.clone()))
        .collect()
}

fn update_segment(segments: &[Value], index: usize) -> Result<UpdateSpec> {
    let value = segments.get(index).ok_or_else(|| ParseError::BadArgument {
        position: index + 1,
        expected: "an update document".to_string(),
    })?;
    UpdateSpec::from_value(value, index + 1)
}

/// The pipeline role: must decode to an array of stage objects.
fn pipeline_segment(segments: &[Value], index: usize) -> Result<Vec<Value>> {
    let value = segments.get(index).ok_or_else(|| ParseError::BadArgument {
        position: index + 1,
        expected: "a pipeline array".to_string(),
    })?;
    let array = value.as_array().ok_or_else(|| ParseError::BadArgument {
        position: index + 1,
        expected: "a pipeline array".to_string(),
    })?;

    for stage in array {
        expect_object(stage, index + 1)?;
    }

    Ok(array.clone())
}

fn unsigned_option(value: Option<&Value>, name: &str, position: usize) -> Result<Option<u64>> {
    match value {
        None => Ok(None),
        Some(value) => match value.as_u64() {
            Some(n) => Ok(Some(n)),
            None => Err(ParseError::BadArgument {
                position,
                expected: format!("a non-negative integer for '{name}'"),
            }
            .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::shell::ShellScanner;

    fn build(input: &str) -> Result<Operation> {
        Operation::build(&ShellScanner::parse(input)?)
    }

    #[test]
    fn test_build_find_defaults() {
        let op = build("db.users.find()").unwrap();
        if let Operation::Find {
            collection,
            filter,
            options,
        } = op
        {
            assert_eq!(collection, "users");
            assert_eq!(filter, serde_json::json!({}));
            assert_eq!(options, FindOptions::default());
        } else {
            panic!("Expected Find operation");
        }
    }

    #[test]
    fn test_build_find_with_options() {
        let op = build("db.users.find({age: {$gt: 18}}, {sort: {age: -1}, skip: 5, limit: 10})")
            .unwrap();
        if let Operation::Find { options, .. } = op {
            assert_eq!(options.skip, Some(5));
            assert_eq!(options.limit, Some(10));
            let sort = options.sort.unwrap();
            assert_eq!(sort.get("age"), Some(&serde_json::json!(-1)));
        } else {
            panic!("Expected Find operation");
        }
    }

    #[test]
    fn test_build_insert_one() {
        let op = build("db.users.insertOne({name: 'Ann', age: 30})").unwrap();
        if let Operation::InsertOne { document, .. } = op {
            assert_eq!(document.get("name"), Some(&serde_json::json!("Ann")));
        } else {
            panic!("Expected InsertOne operation");
        }
    }

    #[test]
    fn test_build_insert_many() {
        let op = build("db.users.insertMany([{name: 'Ann'}, {name: 'Bob'}])").unwrap();
        if let Operation::InsertMany { documents, .. } = op {
            assert_eq!(documents.len(), 2);
        } else {
            panic!("Expected InsertMany operation");
        }
    }

    #[test]
    fn test_build_update_with_operators() {
        let op = build("db.users.updateOne({name: 'Ann'}, {$set: {age: 31}, $inc: {visits: 1}})")
            .unwrap();
        if let Operation::UpdateOne { update, .. } = op {
            assert!(update.set.is_some());
            assert!(update.inc.is_some());
            assert!(update.unset.is_none());
        } else {
            panic!("Expected UpdateOne operation");
        }
    }

    #[test]
    fn test_build_update_rejects_unknown_operator() {
        let err = build("db.users.updateOne({}, {$push: {tags: 'x'}})").unwrap_err();
        assert_eq!(err.to_string(), "Unknown update operator: $push");
    }

    #[test]
    fn test_build_update_rejects_empty_document() {
        assert!(build("db.users.updateOne({}, {})").is_err());
    }

    #[test]
    fn test_build_update_rejects_bad_rename_target() {
        assert!(build("db.users.updateOne({}, {$rename: {a: 1}})").is_err());
    }

    #[test]
    fn test_build_aggregate_validates_stage_objects() {
        let op = build("db.users.aggregate([{$match: {}}, {$limit: 2}])").unwrap();
        if let Operation::Aggregate { pipeline, .. } = op {
            assert_eq!(pipeline.len(), 2);
        } else {
            panic!("Expected Aggregate operation");
        }

        assert!(build("db.users.aggregate([1, 2])").is_err());
        assert!(build("db.users.aggregate({$match: {}})").is_err());
    }

    #[test]
    fn test_build_unknown_operation() {
        let err = build("db.users.unknownOp()").unwrap_err();
        assert_eq!(err.to_string(), "Unknown operation: unknownOp");
    }

    #[test]
    fn test_build_drop() {
        let op = build("db.users.drop()").unwrap();
        assert!(matches!(op, Operation::Drop { .. }));
        assert_eq!(op.collection(), "users");
    }

    #[test]
    fn test_build_rejects_non_object_filter() {
        assert!(build("db.users.find(5)").is_err());
        assert!(build("db.users.deleteMany([1])").is_err());
    }
}
