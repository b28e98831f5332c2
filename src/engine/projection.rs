//! Field projection for read results
//!
//! Projection is applied to find/findOne output only, never to the
//! persisted documents. A spec maps field names to inclusion flags
//! (`1`, `true`, `"1"`) or exclusion flags (anything else, typically
//! `0`/`false`). Classification is global: if any value signals
//! inclusion the whole spec is inclusive and exclusion entries are
//! silently ignored, with one exception: `_id` marked with an exclusion
//! flag still suppresses the default `_id` append. This tie-break for
//! mixed specs is load-bearing for existing callers; do not infer
//! per-field intent.

use serde_json::Value;

use crate::store::Document;

/// Whether a flag value signals inclusion.
fn is_inclusion(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s == "1",
        _ => false,
    }
}

/// Apply a projection spec to one document.
///
/// An empty spec returns the document unchanged.
pub fn project_document(doc: &Document, spec: &Document) -> Document {
    if spec.is_empty() {
        return doc.clone();
    }

    let inclusive = spec.values().any(is_inclusion);
    if inclusive {
        let mut projected = Document::new();
        for (field, flag) in spec {
            if field == "_id" {
                continue;
            }
            if is_inclusion(flag) {
                if let Some(value) = doc.get(field) {
                    projected.insert(field.clone(), value.clone());
                }
            }
        }

        let id_excluded = spec.get("_id").is_some_and(|flag| !is_inclusion(flag));
        if !id_excluded {
            if let Some(id) = doc.get("_id") {
                projected.insert("_id".to_string(), id.clone());
            }
        }

        projected
    } else {
        let mut projected = doc.clone();
        for field in spec.keys() {
            projected.shift_remove(field);
        }
        projected
    }
}

/// Apply a projection spec to a result set.
pub fn project_documents(docs: &[Document], spec: &Document) -> Vec<Document> {
    if spec.is_empty() {
        return docs.to_vec();
    }
    docs.iter().map(|doc| project_document(doc, spec)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn test_empty_spec_passes_through() {
        let d = doc(json!({"_id": "x", "a": 1}));
        assert_eq!(project_document(&d, &Document::new()), d);
    }

    #[test]
    fn test_inclusive_projection() {
        let d = doc(json!({"_id": "x", "name": "Ann", "age": 30, "city": "Oslo"}));
        let spec = doc(json!({"name": 1, "age": 1}));

        let projected = project_document(&d, &spec);
        assert_eq!(projected, doc(json!({"name": "Ann", "age": 30, "_id": "x"})));
    }

    #[test]
    fn test_inclusive_skips_missing_fields() {
        let d = doc(json!({"_id": "x", "name": "Ann"}));
        let spec = doc(json!({"name": 1, "missing": 1}));

        let projected = project_document(&d, &spec);
        assert_eq!(projected, doc(json!({"name": "Ann", "_id": "x"})));
    }

    #[test]
    fn test_inclusive_with_id_excluded() {
        let d = doc(json!({"_id": "x", "name": "Ann"}));
        let spec = doc(json!({"name": 1, "_id": 0}));

        let projected = project_document(&d, &spec);
        assert_eq!(projected, doc(json!({"name": "Ann"})));
    }

    #[test]
    fn test_exclusive_projection() {
        let d = doc(json!({"_id": "x", "name": "Ann", "age": 30}));
        let spec = doc(json!({"age": 0}));

        let projected = project_document(&d, &spec);
        assert_eq!(projected, doc(json!({"_id": "x", "name": "Ann"})));
    }

    #[test]
    fn test_mixed_spec_treated_as_inclusive() {
        // Exclusion entries in a spec with any inclusion flag are ignored.
        let d = doc(json!({"_id": "x", "a": 1, "b": 2, "c": 3}));
        let spec = doc(json!({"a": 1, "b": 0}));

        let projected = project_document(&d, &spec);
        assert_eq!(projected, doc(json!({"a": 1, "_id": "x"})));
    }

    #[test]
    fn test_string_and_bool_flags() {
        let d = doc(json!({"_id": "x", "a": 1, "b": 2}));

        let projected = project_document(&d, &doc(json!({"a": "1"})));
        assert_eq!(projected, doc(json!({"a": 1, "_id": "x"})));

        let projected = project_document(&d, &doc(json!({"a": true})));
        assert_eq!(projected, doc(json!({"a": 1, "_id": "x"})));

        let projected = project_document(&d, &doc(json!({"b": false})));
        assert_eq!(projected, doc(json!({"_id": "x", "a": 1})));
    }

    #[test]
    fn test_projection_idempotence() {
        let d = doc(json!({"_id": "x", "a": 1, "b": 2}));
        let spec = doc(json!({"a": 1}));

        let once = project_document(&d, &spec);
        let twice = project_document(&once, &spec);
        assert_eq!(once, twice);
    }
}
