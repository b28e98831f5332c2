//! Read operations
//!
//! find, findOne, countDocuments and aggregate. Filter truth-evaluation
//! is delegated to the injected matcher for every document in the
//! target collection, preserving insertion order; find results then go
//! through sort, skip and limit in that fixed order (sort before
//! pagination is observable behavior) and finally through projection.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::parser::FindOptions;
use crate::store::Document;
use crate::utils::compare_values;

use super::projection::project_documents;
use super::{Effect, OutcomeData, QueryEngine};

impl QueryEngine {
    /// Execute find: filter, sort, paginate, project.
    pub(super) fn execute_find(
        &mut self,
        collection: &str,
        filter: &Value,
        options: &FindOptions,
    ) -> Result<Effect> {
        debug!("Executing find on collection '{collection}'");

        let docs = self.find_documents(collection, filter, options)?;
        Ok(Effect::read(OutcomeData::Documents(docs)))
    }

    /// Execute findOne: find with a forced limit of one, returning the
    /// single document or null.
    pub(super) fn execute_find_one(
        &mut self,
        collection: &str,
        filter: &Value,
        options: &FindOptions,
    ) -> Result<Effect> {
        debug!("Executing findOne on collection '{collection}'");

        let mut options = options.clone();
        options.limit = Some(1);
        let docs = self.find_documents(collection, filter, &options)?;
        Ok(Effect::read(OutcomeData::Document(docs.into_iter().next())))
    }

    /// Execute countDocuments: an unpaginated find, returning its length.
    pub(super) fn execute_count(&mut self, collection: &str, filter: &Value) -> Result<Effect> {
        debug!("Executing countDocuments on collection '{collection}'");

        let matched = self.matched_documents(collection, filter)?;
        Ok(Effect::read(OutcomeData::Count(matched.len() as u64)))
    }

    /// Execute aggregate: forward the collection and pipeline to the
    /// injected runner, returning its output unmodified.
    pub(super) fn execute_aggregate(
        &mut self,
        collection: &str,
        stages: &[Value],
    ) -> Result<Effect> {
        debug!(
            "Executing aggregate on collection '{collection}' with {} stage(s)",
            stages.len()
        );

        let docs = self.store.get_or_create(collection).clone();
        let result = self.pipeline.run(&docs, stages)?;
        Ok(Effect::read(OutcomeData::Documents(result)))
    }

    /// Shared find path: match, sort, skip, limit, project.
    fn find_documents(
        &mut self,
        collection: &str,
        filter: &Value,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        let mut matched = self.matched_documents(collection, filter)?;

        if let Some(sort) = &options.sort {
            sort_documents(&mut matched, sort);
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|n| n as usize).unwrap_or(usize::MAX);
        let paged: Vec<Document> = matched.into_iter().skip(skip).take(limit).collect();

        match &options.projection {
            Some(spec) => Ok(project_documents(&paged, spec)),
            None => Ok(paged),
        }
    }

    /// Copy-on-read selection of the documents matching `filter`, in
    /// insertion order.
    fn matched_documents(&mut self, collection: &str, filter: &Value) -> Result<Vec<Document>> {
        let docs = self.store.get_or_create(collection);

        let mut matched = Vec::new();
        for doc in docs.iter() {
            if self.matcher.matches(doc, filter)? {
                matched.push(doc.clone());
            }
        }

        Ok(matched)
    }
}

/// Stable multi-key sort. Keys compare in spec order; a negative
/// direction reverses that key. Missing fields compare as JSON null.
fn sort_documents(docs: &mut [Document], sort: &Document) {
    let null = Value::Null;

    docs.sort_by(|a, b| {
        for (field, direction) in sort {
            let av = a.get(field).unwrap_or(&null);
            let bv = b.get(field).unwrap_or(&null);

            let mut ordering = compare_values(av, bv);
            if direction.as_f64().is_some_and(|d| d < 0.0) {
                ordering = ordering.reverse();
            }
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn test_sort_single_key() {
        let mut docs = vec![
            doc(json!({"n": 3})),
            doc(json!({"n": 1})),
            doc(json!({"n": 2})),
        ];
        sort_documents(&mut docs, &doc(json!({"n": 1})));

        let values: Vec<_> = docs.iter().map(|d| d["n"].clone()).collect();
        assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_sort_descending() {
        let mut docs = vec![doc(json!({"n": 1})), doc(json!({"n": 3}))];
        sort_documents(&mut docs, &doc(json!({"n": -1})));
        assert_eq!(docs[0]["n"], json!(3));
    }

    #[test]
    fn test_sort_multi_key_is_stable() {
        let mut docs = vec![
            doc(json!({"g": 1, "n": "b"})),
            doc(json!({"g": 2, "n": "a"})),
            doc(json!({"g": 1, "n": "a"})),
        ];
        sort_documents(&mut docs, &doc(json!({"g": 1, "n": 1})));

        assert_eq!(docs[0]["n"], json!("a"));
        assert_eq!(docs[0]["g"], json!(1));
        assert_eq!(docs[1]["n"], json!("b"));
        assert_eq!(docs[2]["g"], json!(2));
    }

    #[test]
    fn test_sort_missing_field_first() {
        let mut docs = vec![doc(json!({"n": 1})), doc(json!({"other": true}))];
        sort_documents(&mut docs, &doc(json!({"n": 1})));
        assert!(docs[0].get("n").is_none());
    }
}
