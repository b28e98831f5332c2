//! Utility functions and helpers
//!
//! Shared value helpers used by the sort comparator, the update
//! operators and the basic matcher. JSON values are ordered under a
//! total order so that multi-key sorting and `$min`/`$max` behave
//! deterministically across mixed-type collections.

use std::cmp::Ordering;

use serde_json::Value;

/// Rank used to order values of different JSON types.
///
/// Null sorts lowest, then numbers, strings, booleans, arrays and
/// objects. Within a rank, values are compared by their natural order.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Compare two JSON values under a total order.
///
/// Values of different types are ordered by [`type_rank`]. Arrays and
/// objects of the same rank compare as equal, which keeps stable sorts
/// stable rather than inventing an order for them.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let (ra, rb) = (type_rank(a), type_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Compare two values only when an ordering is meaningful.
///
/// Returns `None` for mixed types and for anything that is not a number
/// or a string. Relational filter operators use this so that
/// `{age: {$gt: 25}}` is simply false against a string field instead of
/// ordering across types.
pub fn partial_compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Add two JSON numbers, staying integral when both operands are.
pub fn add_numbers(a: &Value, b: &Value) -> Option<Value> {
    arith(a, b, |x, y| x.checked_add(y), |x, y| x + y)
}

/// Multiply two JSON numbers, staying integral when both operands are.
pub fn mul_numbers(a: &Value, b: &Value) -> Option<Value> {
    arith(a, b, |x, y| x.checked_mul(y), |x, y| x * y)
}

fn arith(
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Option<Value> {
    let (a, b) = match (a, b) {
        (Value::Number(a), Value::Number(b)) => (a, b),
        _ => return None,
    };

    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(n) = int_op(x, y) {
            return Some(Value::from(n));
        }
    }

    let result = float_op(a.as_f64()?, b.as_f64()?);
    serde_json::Number::from_f64(result).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compare_numbers() {
        assert_eq!(compare_values(&json!(1), &json!(2)), Ordering::Less);
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
        assert_eq!(compare_values(&json!(3), &json!(3.0)), Ordering::Equal);
    }

    #[test]
    fn test_compare_mixed_types_by_rank() {
        // null < number < string < bool
        assert_eq!(compare_values(&json!(null), &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!(9), &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!("z"), &json!(false)), Ordering::Less);
    }

    #[test]
    fn test_partial_compare_rejects_mixed() {
        assert!(partial_compare(&json!(1), &json!("1")).is_none());
        assert!(partial_compare(&json!(true), &json!(false)).is_none());
        assert_eq!(
            partial_compare(&json!("a"), &json!("b")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_add_numbers_stays_integral() {
        assert_eq!(add_numbers(&json!(1), &json!(2)), Some(json!(3)));
        assert_eq!(add_numbers(&json!(1.5), &json!(1)), Some(json!(2.5)));
        assert_eq!(add_numbers(&json!("x"), &json!(1)), None);
    }

    #[test]
    fn test_mul_numbers() {
        assert_eq!(mul_numbers(&json!(3), &json!(4)), Some(json!(12)));
        assert_eq!(mul_numbers(&json!(2.0), &json!(0.5)), Some(json!(1.0)));
    }
}
