//! Comparison primitives shared by every relation in a domain.
//!
//! Three semantics cover the catalog: exact equality for discrete results,
//! tolerance equality for floating results, and structural equality for
//! tree-shaped (JSON) results. Comparing values of mismatched shape is a
//! mismatch, never an error.

use serde_json::Value as JsonValue;

/// Sequence comparison mode for [`structural_eq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqOrder {
    /// Sequence entries compare by position.
    Positional,
    /// Sequence entries compare as multisets; a relation opts in explicitly.
    Unordered,
}

/// Tolerance equality: `|a - b| <= epsilon`.
///
/// NaN compares equal only to NaN; infinities compare equal only to
/// infinities of the same sign. A finite value never equals a non-finite one.
#[must_use]
pub fn tolerance_eq(a: f64, b: f64, epsilon: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= epsilon
}

/// Structural equality over JSON trees.
///
/// Object entries compare by key, independent of order. Array entries compare
/// by position under [`SeqOrder::Positional`] and as multisets under
/// [`SeqOrder::Unordered`]. Numbers compare with `epsilon` tolerance so a
/// reserialized float survives rounding.
#[must_use]
pub fn structural_eq(a: &JsonValue, b: &JsonValue, order: SeqOrder, epsilon: f64) -> bool {
    match (a, b) {
        (JsonValue::Null, JsonValue::Null) => true,
        (JsonValue::Bool(x), JsonValue::Bool(y)) => x == y,
        (JsonValue::String(x), JsonValue::String(y)) => x == y,
        (JsonValue::Number(x), JsonValue::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => tolerance_eq(fx, fy, epsilon),
            _ => x == y,
        },
        (JsonValue::Array(xs), JsonValue::Array(ys)) => match order {
            SeqOrder::Positional => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|(x, y)| structural_eq(x, y, order, epsilon))
            }
            SeqOrder::Unordered => multiset_eq(xs, ys, epsilon),
        },
        (JsonValue::Object(xs), JsonValue::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(key, x)| {
                    ys.get(key)
                        .is_some_and(|y| structural_eq(x, y, order, epsilon))
                })
        }
        // Shape mismatch (e.g. map vs. array) is a mismatch.
        _ => false,
    }
}

/// Multiset equality: every element of `xs` matches a distinct element of
/// `ys`. Quadratic, which is fine at generated-case sizes.
fn multiset_eq(xs: &[JsonValue], ys: &[JsonValue], epsilon: f64) -> bool {
    if xs.len() != ys.len() {
        return false;
    }
    let mut claimed = vec![false; ys.len()];
    for x in xs {
        let matched = ys.iter().enumerate().find(|(i, y)| {
            !claimed[*i] && structural_eq(x, y, SeqOrder::Unordered, epsilon)
        });
        match matched {
            Some((i, _)) => claimed[i] = true,
            None => return false,
        }
    }
    true
}

/// Element count of a JSON value: object entries, array items, 1 for leaves.
#[must_use]
pub fn json_size(value: &JsonValue) -> usize {
    match value {
        JsonValue::Object(map) => map.len(),
        JsonValue::Array(items) => items.len(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tolerance_eq_reflexive_for_finite() {
        for x in [-1.5, 0.0, 3.25, 1e300] {
            assert!(tolerance_eq(x, x, 0.0));
        }
    }

    #[test]
    fn tolerance_eq_separates_beyond_epsilon() {
        assert!(tolerance_eq(1.0, 1.0 + 5e-7, 1e-6));
        assert!(!tolerance_eq(1.0, 1.0 + 2e-6, 1e-6));
    }

    #[test]
    fn tolerance_eq_nan_and_infinity() {
        assert!(tolerance_eq(f64::NAN, f64::NAN, 1e-6));
        assert!(!tolerance_eq(f64::NAN, 0.0, 1e-6));
        assert!(tolerance_eq(f64::INFINITY, f64::INFINITY, 1e-6));
        assert!(!tolerance_eq(f64::INFINITY, f64::NEG_INFINITY, 1e-6));
        assert!(!tolerance_eq(f64::INFINITY, 1e308, 1e-6));
    }

    #[test]
    fn object_key_order_never_matters() {
        let a = json!({"x": 1, "y": [1, 2]});
        let b = json!({"y": [1, 2], "x": 1});
        assert!(structural_eq(&a, &b, SeqOrder::Positional, 0.0));
    }

    #[test]
    fn array_order_matters_unless_unordered() {
        let a = json!([1, 2, 3]);
        let b = json!([3, 2, 1]);
        assert!(!structural_eq(&a, &b, SeqOrder::Positional, 0.0));
        assert!(structural_eq(&a, &b, SeqOrder::Unordered, 0.0));
    }

    #[test]
    fn multiset_respects_multiplicity() {
        let a = json!([1, 1, 2]);
        let b = json!([1, 2, 2]);
        assert!(!structural_eq(&a, &b, SeqOrder::Unordered, 0.0));
    }

    #[test]
    fn shape_mismatch_is_false_not_error() {
        assert!(!structural_eq(
            &json!({"a": 1}),
            &json!([1]),
            SeqOrder::Positional,
            0.0
        ));
        assert!(!structural_eq(&json!(null), &json!(0), SeqOrder::Positional, 0.0));
    }

    #[test]
    fn nested_unordered_applies_recursively() {
        let a = json!({"xs": [{"k": 1}, {"k": 2}]});
        let b = json!({"xs": [{"k": 2}, {"k": 1}]});
        assert!(structural_eq(&a, &b, SeqOrder::Unordered, 0.0));
        assert!(!structural_eq(&a, &b, SeqOrder::Positional, 0.0));
    }

    #[test]
    fn json_size_counts_entries() {
        assert_eq!(json_size(&json!({"a": 1, "b": 2})), 2);
        assert_eq!(json_size(&json!([1, 2, 3])), 3);
        assert_eq!(json_size(&json!("leaf")), 1);
        assert_eq!(json_size(&json!({})), 0);
    }
}
