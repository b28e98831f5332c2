//! Write operations
//!
//! insertOne/insertMany, updateOne/updateMany, deleteOne/deleteMany and
//! drop. Selection is evaluated over the whole collection in insertion
//! order; single-document variants act on the first match only.
//! `matchedCount` always reflects the full filter evaluation, while
//! `modifiedCount`/`deletedCount` are computed from the documents
//! actually touched. Update operators apply per document in a fixed
//! order: $set, $unset, $inc, $mul, $min, $max, $rename.

use std::cmp::Ordering;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ExecutionError, Result};
use crate::parser::UpdateSpec;
use crate::store::{Document, object_id};
use crate::utils::{add_numbers, compare_values, mul_numbers};

use super::{Effect, OutcomeData, QueryEngine};

impl QueryEngine {
    /// Insert one document, generating `_id` when absent.
    pub(super) fn execute_insert_one(
        &mut self,
        collection: &str,
        document: Document,
    ) -> Result<Effect> {
        debug!("Executing insertOne on collection '{collection}'");

        let docs = self.store.get_or_create(collection);
        let id = push_document(docs, document);

        Ok(Effect::write(OutcomeData::Inserted { id }, true))
    }

    /// Insert multiple documents in the given order.
    pub(super) fn execute_insert_many(
        &mut self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Effect> {
        debug!(
            "Executing insertMany on collection '{collection}' with {} document(s)",
            documents.len()
        );

        if documents.is_empty() {
            return Err(ExecutionError::InvalidParameters(
                "insertMany requires at least one document".to_string(),
            )
            .into());
        }

        let docs = self.store.get_or_create(collection);
        let ids: Vec<Value> = documents
            .into_iter()
            .map(|document| push_document(docs, document))
            .collect();

        Ok(Effect::write(OutcomeData::InsertedMany { ids }, true))
    }

    /// Apply update operators to matching documents.
    ///
    /// `matchedCount` counts every document the filter matched; with
    /// `many == false` the operators are applied to the first match
    /// only. Zero modified documents skip the persistence write.
    pub(super) fn execute_update(
        &mut self,
        collection: &str,
        filter: &Value,
        update: &UpdateSpec,
        many: bool,
    ) -> Result<Effect> {
        debug!(
            "Executing update{} on collection '{collection}'",
            if many { "Many" } else { "One" }
        );

        let mut matched_indices = self.matched_indices(collection, filter)?;
        let matched = matched_indices.len() as u64;
        if !many {
            matched_indices.truncate(1);
        }

        let docs = self.store.get_or_create(collection);
        for &index in &matched_indices {
            apply_update(&mut docs[index], update)?;
        }
        let modified = matched_indices.len() as u64;

        Ok(Effect::write(
            OutcomeData::Updated { matched, modified },
            modified > 0,
        ))
    }

    /// Delete matching documents: the first match only, or all of them.
    ///
    /// `deletedCount` is computed from the removed set. Zero deletions
    /// skip the persistence write.
    pub(super) fn execute_delete(
        &mut self,
        collection: &str,
        filter: &Value,
        many: bool,
    ) -> Result<Effect> {
        debug!(
            "Executing delete{} on collection '{collection}'",
            if many { "Many" } else { "One" }
        );

        let mut matched_indices = self.matched_indices(collection, filter)?;
        if !many {
            matched_indices.truncate(1);
        }

        let docs = self.store.get_or_create(collection);
        for &index in matched_indices.iter().rev() {
            docs.remove(index);
        }
        let deleted = matched_indices.len() as u64;

        Ok(Effect::write(
            OutcomeData::Deleted { deleted },
            deleted > 0,
        ))
    }

    /// Remove the collection entirely.
    pub(super) fn execute_drop(&mut self, collection: &str) -> Result<Effect> {
        debug!("Executing drop on collection '{collection}'");

        let existed = self.store.drop_collection(collection);
        Ok(Effect::write(OutcomeData::Dropped(existed), existed))
    }

    /// Indices of the documents matching `filter`, in insertion order.
    fn matched_indices(&mut self, collection: &str, filter: &Value) -> Result<Vec<usize>> {
        let docs = self.store.get_or_create(collection);

        let mut indices = Vec::new();
        for (index, doc) in docs.iter().enumerate() {
            if self.matcher.matches(doc, filter)? {
                indices.push(index);
            }
        }

        Ok(indices)
    }
}

/// Append a document to a collection, generating its `_id` if absent,
/// and return the id.
fn push_document(docs: &mut Vec<Document>, mut document: Document) -> Value {
    let id = match document.get("_id") {
        Some(id) => id.clone(),
        None => {
            let id = Value::String(object_id());
            document.insert("_id".to_string(), id.clone());
            id
        }
    };
    docs.push(document);
    id
}

/// Apply every operator present on `update` to `doc`, in the fixed
/// operator order.
fn apply_update(doc: &mut Document, update: &UpdateSpec) -> Result<()> {
    if let Some(table) = &update.set {
        for (field, value) in table {
            doc.insert(field.clone(), value.clone());
        }
    }

    if let Some(table) = &update.unset {
        for field in table.keys() {
            doc.shift_remove(field);
        }
    }

    if let Some(table) = &update.inc {
        for (field, amount) in table {
            let current = doc.get(field).cloned().unwrap_or(json!(0));
            let next = add_numbers(&current, amount).ok_or_else(|| {
                ExecutionError::InvalidParameters(format!(
                    "$inc requires numeric values for field '{field}'"
                ))
            })?;
            doc.insert(field.clone(), next);
        }
    }

    if let Some(table) = &update.mul {
        for (field, factor) in table {
            let current = doc.get(field).cloned().unwrap_or(json!(1));
            let next = mul_numbers(&current, factor).ok_or_else(|| {
                ExecutionError::InvalidParameters(format!(
                    "$mul requires numeric values for field '{field}'"
                ))
            })?;
            doc.insert(field.clone(), next);
        }
    }

    if let Some(table) = &update.min {
        for (field, candidate) in table {
            let improves = doc
                .get(field)
                .is_none_or(|current| compare_values(candidate, current) == Ordering::Less);
            if improves {
                doc.insert(field.clone(), candidate.clone());
            }
        }
    }

    if let Some(table) = &update.max {
        for (field, candidate) in table {
            let improves = doc
                .get(field)
                .is_none_or(|current| compare_values(candidate, current) == Ordering::Greater);
            if improves {
                doc.insert(field.clone(), candidate.clone());
            }
        }
    }

    if let Some(table) = &update.rename {
        for (field, target) in table {
            if let Some(target) = target.as_str() {
                if let Some(value) = doc.shift_remove(field) {
                    doc.insert(target.to_string(), value);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().expect("object literal")
    }

    fn spec(value: Value) -> UpdateSpec {
        UpdateSpec::from_value(&value, 2).expect("valid update spec")
    }

    #[test]
    fn test_apply_set_and_unset() {
        let mut d = doc(json!({"a": 1, "b": 2}));
        apply_update(&mut d, &spec(json!({"$set": {"a": 10, "c": 3}, "$unset": {"b": ""}})))
            .unwrap();
        assert_eq!(d, doc(json!({"a": 10, "c": 3})));
    }

    #[test]
    fn test_apply_inc_missing_field_counts_from_zero() {
        let mut d = doc(json!({}));
        let s = spec(json!({"$inc": {"n": 1}}));

        apply_update(&mut d, &s).unwrap();
        assert_eq!(d["n"], json!(1));

        apply_update(&mut d, &s).unwrap();
        assert_eq!(d["n"], json!(2));
    }

    #[test]
    fn test_apply_mul_missing_field_counts_from_one() {
        let mut d = doc(json!({}));
        apply_update(&mut d, &spec(json!({"$mul": {"n": 5}}))).unwrap();
        assert_eq!(d["n"], json!(5));
    }

    #[test]
    fn test_apply_inc_non_numeric_is_an_error() {
        let mut d = doc(json!({"n": "text"}));
        assert!(apply_update(&mut d, &spec(json!({"$inc": {"n": 1}}))).is_err());
    }

    #[test]
    fn test_apply_min_only_improves() {
        let mut d = doc(json!({"n": 5}));

        apply_update(&mut d, &spec(json!({"$min": {"n": 10}}))).unwrap();
        assert_eq!(d["n"], json!(5));

        apply_update(&mut d, &spec(json!({"$min": {"n": 3}}))).unwrap();
        assert_eq!(d["n"], json!(3));
    }

    #[test]
    fn test_apply_max_on_missing_field_applies() {
        let mut d = doc(json!({}));
        apply_update(&mut d, &spec(json!({"$max": {"n": -1}}))).unwrap();
        assert_eq!(d["n"], json!(-1));
    }

    #[test]
    fn test_apply_rename() {
        let mut d = doc(json!({"old": 7}));
        let s = spec(json!({"$rename": {"old": "new", "missing": "other"}}));

        apply_update(&mut d, &s).unwrap();
        assert_eq!(d, doc(json!({"new": 7})));
    }

    #[test]
    fn test_operator_order_set_before_inc() {
        // $set runs before $inc, so the increment sees the set value.
        let mut d = doc(json!({}));
        apply_update(&mut d, &spec(json!({"$inc": {"n": 1}, "$set": {"n": 10}}))).unwrap();
        assert_eq!(d["n"], json!(11));
    }
}
