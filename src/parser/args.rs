//! Argument segment splitting and relaxed-JSON decoding
//!
//! The raw argument span captured by the shell scanner is split into
//! top-level comma-separated segments by a single left-to-right scan: a
//! depth counter tracks `{`/`[` nesting, a quote flag suppresses depth
//! and comma handling inside string literals, and a comma at depth zero
//! outside a string ends the current segment. Arbitrarily nested filters
//! and pipelines split correctly, as do string values containing commas
//! or braces.
//!
//! Each segment is then decoded as JSON after two normalization steps:
//! a blanket substitution of `'` with `"` (single-quoted shell literals
//! become JSON strings), and quoting of bare object keys (`{age: 1}`
//! becomes `{"age": 1}`), which shell syntax uses pervasively.
//!
//! Known limitation, preserved deliberately: the blanket quote
//! substitution corrupts any string value that legitimately contains an
//! apostrophe (e.g. `{name:'O'Brien'}` fails to decode). Callers rely on
//! the current behavior, so the decoder does not special-case it.

use serde_json::Value;

use crate::error::{ParseError, Result};

/// Split a raw argument span into top-level comma-separated segments.
///
/// Returns an empty vector for a blank span. Segments are trimmed but
/// not decoded.
pub fn split_arguments(span: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = span.chars();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '{' | '[' => {
                    depth += 1;
                    current.push(ch);
                }
                '}' | ']' => {
                    depth = depth.saturating_sub(1);
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    segments.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }

    let last = current.trim();
    if !last.is_empty() || !segments.is_empty() {
        segments.push(last.to_string());
    }

    segments
}

/// Decode one segment as relaxed JSON.
///
/// `position` is the 1-based argument position, reported in the decode
/// error when the segment is not valid JSON after normalization.
pub fn decode_segment(segment: &str, position: usize) -> Result<Value> {
    let normalized = quote_bare_keys(&segment.replace('\'', "\""));
    serde_json::from_str(&normalized).map_err(|e| {
        ParseError::Decode {
            position,
            message: e.to_string(),
        }
        .into()
    })
}

/// Split and decode a whole argument span.
pub fn decode_arguments(span: &str) -> Result<Vec<Value>> {
    split_arguments(span)
        .iter()
        .enumerate()
        .map(|(i, segment)| decode_segment(segment, i + 1))
        .collect()
}

/// Wrap bare object keys in double quotes.
///
/// Runs after quote substitution, so every string literal is
/// double-quoted and the scan only has one quote style to track. An
/// identifier (`$`, `_`, letters, digits) immediately followed by an
/// optional run of whitespace and a `:` is a key and gets quoted;
/// everything inside string literals is left untouched.
fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;
    let mut in_string = false;

    while i < chars.len() {
        let ch = chars[i];

        if in_string {
            out.push(ch);
            if ch == '\\' && i + 1 < chars.len() {
                i += 1;
                out.push(chars[i]);
            } else if ch == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            i += 1;
            continue;
        }

        if ch == '$' || ch == '_' || ch.is_alphabetic() {
            let start = i;
            while i < chars.len()
                && (chars[i] == '$' || chars[i] == '_' || chars[i].is_alphanumeric())
            {
                i += 1;
            }

            let mut lookahead = i;
            while lookahead < chars.len() && chars[lookahead].is_whitespace() {
                lookahead += 1;
            }

            let is_key = lookahead < chars.len() && chars[lookahead] == ':';
            if is_key {
                out.push('"');
            }
            out.extend(&chars[start..i]);
            if is_key {
                out.push('"');
            }
            continue;
        }

        out.push(ch);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_empty_span() {
        assert!(split_arguments("").is_empty());
        assert!(split_arguments("   ").is_empty());
    }

    #[test]
    fn test_split_single_segment() {
        assert_eq!(split_arguments("{a: 1}"), vec!["{a: 1}"]);
    }

    #[test]
    fn test_split_two_segments() {
        assert_eq!(
            split_arguments("{a: 1}, {sort: {a: -1}}"),
            vec!["{a: 1}", "{sort: {a: -1}}"]
        );
    }

    #[test]
    fn test_split_ignores_nested_commas() {
        assert_eq!(
            split_arguments("{a: [1, 2, 3], b: {c: 4, d: 5}}, {e: 6}"),
            vec!["{a: [1, 2, 3], b: {c: 4, d: 5}}", "{e: 6}"]
        );
    }

    #[test]
    fn test_split_ignores_commas_in_strings() {
        assert_eq!(
            split_arguments(r#"{name: "Smith, John"}, {limit: 1}"#),
            vec![r#"{name: "Smith, John"}"#, "{limit: 1}"]
        );
    }

    #[test]
    fn test_split_ignores_braces_in_strings() {
        assert_eq!(
            split_arguments(r#"{text: "a } brace"}, {b: 2}"#),
            vec![r#"{text: "a } brace"}"#, "{b: 2}"]
        );
    }

    #[test]
    fn test_split_handles_escaped_quotes() {
        assert_eq!(
            split_arguments(r#"{text: "she said \"hi, there\""}, {b: 2}"#),
            vec![r#"{text: "she said \"hi, there\""}"#, "{b: 2}"]
        );
    }

    #[test]
    fn test_decode_double_quoted() {
        let value = decode_segment(r#"{"name": "Ann"}"#, 1).unwrap();
        assert_eq!(value, json!({"name": "Ann"}));
    }

    #[test]
    fn test_decode_single_quoted() {
        let value = decode_segment("{'name': 'Ann'}", 1).unwrap();
        assert_eq!(value, json!({"name": "Ann"}));
    }

    #[test]
    fn test_decode_bare_keys() {
        let value = decode_segment("{age: {$gt: 25}}", 1).unwrap();
        assert_eq!(value, json!({"age": {"$gt": 25}}));
    }

    #[test]
    fn test_decode_mixed_styles() {
        let value = decode_segment("{name: 'Ann', active: true, tags: ['a', 'b']}", 1).unwrap();
        assert_eq!(
            value,
            json!({"name": "Ann", "active": true, "tags": ["a", "b"]})
        );
    }

    #[test]
    fn test_decode_key_like_text_in_strings_untouched() {
        let value = decode_segment(r#"{note: "ratio: high"}"#, 1).unwrap();
        assert_eq!(value, json!({"note": "ratio: high"}));
    }

    #[test]
    fn test_decode_apostrophe_limitation() {
        // The blanket quote substitution corrupts embedded apostrophes.
        assert!(decode_segment("{'name': 'O'Brien'}", 1).is_err());
    }

    #[test]
    fn test_decode_error_reports_position() {
        let err = decode_segment("{", 2).unwrap_err();
        assert!(err.to_string().contains("argument 2"));
    }

    #[test]
    fn test_decode_arguments_round_trip() {
        let values = decode_arguments("{'a': 1}, [{b: 2}], 3").unwrap();
        assert_eq!(values, vec![json!({"a": 1}), json!([{"b": 2}]), json!(3)]);

        // Idempotent decode: re-serializing and re-decoding reproduces
        // the same structural value.
        for value in &values {
            let text = serde_json::to_string(value).unwrap();
            assert_eq!(&decode_segment(&text, 1).unwrap(), value);
        }
    }
}
