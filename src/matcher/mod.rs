//! Predicate matching and pipeline execution ports
//!
//! The engine does not own predicate truth-evaluation or aggregation:
//! both are injected through the traits defined here. The engine calls
//! `matches` once per candidate document and forwards whole pipelines
//! to the runner, treating failures as execution errors to be wrapped
//! at the dispatcher boundary.
//!
//! `BasicMatcher` and `BasicPipeline` are the shipped reference
//! implementations: enough operator coverage for interactive practice
//! sessions and for the engine's own tests. Their internals are not
//! part of the engine's contract; a host application may inject richer
//! implementations without touching the engine.

use serde_json::Value;

use crate::error::{ExecutionError, Result};
use crate::store::Document;
use crate::utils::partial_compare;

/// Evaluates a filter expression against one document.
pub trait FilterMatcher {
    /// Whether `doc` satisfies `filter`.
    fn matches(&self, doc: &Document, filter: &Value) -> Result<bool>;
}

/// Executes an aggregation pipeline over a document sequence.
pub trait PipelineRunner {
    /// Run `stages` over `docs`, returning the resulting documents.
    fn run(&self, docs: &[Document], stages: &[Value]) -> Result<Vec<Document>>;
}

/// Reference filter matcher.
///
/// Supports field equality and the comparison operators `$eq`, `$ne`,
/// `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin` and `$exists`. A filter
/// field whose condition is an object with at least one `$`-prefixed
/// key is treated as an operator set; any other condition is matched by
/// equality. A missing document field compares as JSON null.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicMatcher;

impl BasicMatcher {
    pub fn new() -> Self {
        Self
    }

    fn field_matches(&self, doc: &Document, field: &str, condition: &Value) -> Result<bool> {
        let actual = doc.get(field).cloned().unwrap_or(Value::Null);

        let operators = condition
            .as_object()
            .filter(|object| object.keys().any(|k| k.starts_with('$')));

        let Some(operators) = operators else {
            return Ok(actual == *condition);
        };

        for (op, operand) in operators {
            let holds = match op.as_str() {
                "$eq" => actual == *operand,
                "$ne" => actual != *operand,
                "$gt" => partial_compare(&actual, operand).is_some_and(|o| o.is_gt()),
                "$gte" => partial_compare(&actual, operand).is_some_and(|o| o.is_ge()),
                "$lt" => partial_compare(&actual, operand).is_some_and(|o| o.is_lt()),
                "$lte" => partial_compare(&actual, operand).is_some_and(|o| o.is_le()),
                "$in" => in_list(&actual, operand, op)?,
                "$nin" => !in_list(&actual, operand, op)?,
                "$exists" => {
                    let present = doc.contains_key(field);
                    present == operand.as_bool().unwrap_or(true)
                }
                other => {
                    return Err(ExecutionError::MatchFailed(format!(
                        "unsupported filter operator: {other}"
                    ))
                    .into());
                }
            };

            if !holds {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

fn in_list(actual: &Value, operand: &Value, op: &str) -> Result<bool> {
    let list = operand.as_array().ok_or_else(|| {
        ExecutionError::MatchFailed(format!("{op} requires an array operand"))
    })?;
    Ok(list.contains(actual))
}

impl FilterMatcher for BasicMatcher {
    fn matches(&self, doc: &Document, filter: &Value) -> Result<bool> {
        let filter = filter.as_object().ok_or_else(|| {
            ExecutionError::MatchFailed("filter must be an object".to_string())
        })?;

        for (field, condition) in filter {
            if !self.field_matches(doc, field, condition)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Reference pipeline runner.
///
/// Supports `$match` (delegating to [`BasicMatcher`]), `$skip`, `$limit`
/// and `$count`. Unknown stages fail the whole pipeline; the dispatcher
/// wraps the failure into the result envelope.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicPipeline;

impl BasicPipeline {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineRunner for BasicPipeline {
    fn run(&self, docs: &[Document], stages: &[Value]) -> Result<Vec<Document>> {
        let matcher = BasicMatcher::new();
        let mut current: Vec<Document> = docs.to_vec();

        for stage in stages {
            let stage = stage.as_object().ok_or_else(|| {
                ExecutionError::PipelineFailed("pipeline stage must be an object".to_string())
            })?;
            let (name, spec) = stage.iter().next().ok_or_else(|| {
                ExecutionError::PipelineFailed("pipeline stage must not be empty".to_string())
            })?;

            match name.as_str() {
                "$match" => {
                    let mut matched = Vec::new();
                    for doc in current {
                        if matcher.matches(&doc, spec)? {
                            matched.push(doc);
                        }
                    }
                    current = matched;
                }
                "$skip" => {
                    let n = stage_count(name, spec)?;
                    current = current.into_iter().skip(n).collect();
                }
                "$limit" => {
                    let n = stage_count(name, spec)?;
                    current.truncate(n);
                }
                "$count" => {
                    let field = spec.as_str().ok_or_else(|| {
                        ExecutionError::PipelineFailed(
                            "$count requires a string field name".to_string(),
                        )
                    })?;
                    let mut doc = Document::new();
                    doc.insert(field.to_string(), Value::from(current.len()));
                    current = vec![doc];
                }
                other => {
                    return Err(ExecutionError::PipelineFailed(format!(
                        "unsupported pipeline stage: {other}"
                    ))
                    .into());
                }
            }
        }

        Ok(current)
    }
}

fn stage_count(name: &str, spec: &Value) -> Result<usize> {
    spec.as_u64().map(|n| n as usize).ok_or_else(|| {
        ExecutionError::PipelineFailed(format!("{name} requires a non-negative integer")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn test_equality_match() {
        let matcher = BasicMatcher::new();
        let d = doc(json!({"name": "Ann", "age": 30}));

        assert!(matcher.matches(&d, &json!({"name": "Ann"})).unwrap());
        assert!(!matcher.matches(&d, &json!({"name": "Bob"})).unwrap());
        assert!(matcher.matches(&d, &json!({})).unwrap());
    }

    #[test]
    fn test_comparison_operators() {
        let matcher = BasicMatcher::new();
        let d = doc(json!({"age": 30}));

        assert!(matcher.matches(&d, &json!({"age": {"$gt": 25}})).unwrap());
        assert!(!matcher.matches(&d, &json!({"age": {"$gt": 30}})).unwrap());
        assert!(matcher.matches(&d, &json!({"age": {"$gte": 30}})).unwrap());
        assert!(matcher.matches(&d, &json!({"age": {"$lt": 31}})).unwrap());
        assert!(matcher.matches(&d, &json!({"age": {"$ne": 29}})).unwrap());
    }

    #[test]
    fn test_gt_against_wrong_type_is_false() {
        let matcher = BasicMatcher::new();
        let d = doc(json!({"age": "thirty"}));
        assert!(!matcher.matches(&d, &json!({"age": {"$gt": 25}})).unwrap());
    }

    #[test]
    fn test_in_and_exists() {
        let matcher = BasicMatcher::new();
        let d = doc(json!({"city": "Oslo"}));

        assert!(
            matcher
                .matches(&d, &json!({"city": {"$in": ["Oslo", "Bergen"]}}))
                .unwrap()
        );
        assert!(
            matcher
                .matches(&d, &json!({"city": {"$nin": ["Bergen"]}}))
                .unwrap()
        );
        assert!(matcher.matches(&d, &json!({"city": {"$exists": true}})).unwrap());
        assert!(matcher.matches(&d, &json!({"zip": {"$exists": false}})).unwrap());
    }

    #[test]
    fn test_unsupported_operator_is_an_error() {
        let matcher = BasicMatcher::new();
        let d = doc(json!({"a": 1}));
        assert!(matcher.matches(&d, &json!({"a": {"$regex": "x"}})).is_err());
    }

    #[test]
    fn test_pipeline_match_and_limit() {
        let docs = vec![
            doc(json!({"n": 1})),
            doc(json!({"n": 2})),
            doc(json!({"n": 3})),
        ];
        let stages = vec![json!({"$match": {"n": {"$gt": 1}}}), json!({"$limit": 1})];

        let out = BasicPipeline::new().run(&docs, &stages).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("n"), Some(&json!(2)));
    }

    #[test]
    fn test_pipeline_count() {
        let docs = vec![doc(json!({"n": 1})), doc(json!({"n": 2}))];
        let out = BasicPipeline::new()
            .run(&docs, &[json!({"$count": "total"})])
            .unwrap();
        assert_eq!(out, vec![doc(json!({"total": 2}))]);
    }

    #[test]
    fn test_pipeline_unknown_stage_fails() {
        let docs = vec![doc(json!({"n": 1}))];
        assert!(
            BasicPipeline::new()
                .run(&docs, &[json!({"$group": {"_id": null}})])
                .is_err()
        );
    }
}
