// crates/comply-core/src/runtime/operator.rs
// ============================================================================
// Module: Comply Operator Evaluation
// Description: Operator evaluation for criterion predicates.
// Purpose: Convert resolved field values into boolean criterion outcomes.
// Dependencies: crate::core::rule, bigdecimal, serde_json
// ============================================================================

//! ## Overview
//! Operator evaluation compares one resolved field value against one
//! expected value. Missing fields, type mismatches, and unrecognized
//! operators evaluate to `false` to preserve fail-closed behavior; the one
//! deliberate exception is negated operators, where an absent field cannot
//! equal or be contained in anything and therefore satisfies the negation.
//! Numeric equality and ordering are decimal-aware and deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::Number;
use serde_json::Value;

use crate::core::rule::Operator;

// ============================================================================
// SECTION: Operator Evaluation
// ============================================================================

/// Evaluates one operator against a resolved field value.
///
/// `field` is `None` when path resolution found no value. Presence
/// operators treat null and the empty string the same as an absent field.
#[must_use]
pub fn evaluate_operator(field: Option<&Value>, operator: Operator, expected: &Value) -> bool {
    match operator {
        Operator::Equals => field.is_some_and(|value| json_equals(value, expected)),
        Operator::NotEquals => !field.is_some_and(|value| json_equals(value, expected)),
        Operator::Contains => field.is_some_and(|value| match value {
            Value::Array(items) => items.contains(expected),
            _ => false,
        }),
        Operator::GreaterThan => compare_numeric(field, expected).is_some_and(|ord| ord.is_gt()),
        Operator::LessThan => compare_numeric(field, expected).is_some_and(|ord| ord.is_lt()),
        Operator::In => match expected {
            Value::Array(items) => field.is_some_and(|value| items.contains(value)),
            _ => false,
        },
        Operator::NotIn => match expected {
            Value::Array(items) => !field.is_some_and(|value| items.contains(value)),
            _ => false,
        },
        Operator::Exists => field.is_some_and(is_present),
        Operator::NotExists => !field.is_some_and(is_present),
        Operator::Unrecognized => false,
    }
}

// ============================================================================
// SECTION: Comparison Helpers
// ============================================================================

/// Compares JSON values for equality, with decimal-aware numeric handling.
fn json_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left_num), Value::Number(right_num)) => {
            match (decimal_from_number(left_num), decimal_from_number(right_num)) {
                (Some(left_dec), Some(right_dec)) => left_dec == right_dec,
                _ => false,
            }
        }
        _ => left == right,
    }
}

/// Orders two values numerically, coercing numeric strings.
fn compare_numeric(field: Option<&Value>, expected: &Value) -> Option<std::cmp::Ordering> {
    let left = numeric_value(field?)?;
    let right = numeric_value(expected)?;
    Some(left.cmp(&right))
}

/// Coerces a JSON value into a decimal for ordering comparisons.
///
/// Numbers convert directly, numeric strings are parsed, and booleans map
/// to one and zero. Everything else has no numeric interpretation.
fn numeric_value(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(number) => decimal_from_number(number),
        Value::String(text) => BigDecimal::from_str(text.trim()).ok(),
        Value::Bool(true) => Some(BigDecimal::from(1)),
        Value::Bool(false) => Some(BigDecimal::from(0)),
        _ => None,
    }
}

/// Parses a JSON number into `BigDecimal` with a stable string representation.
fn decimal_from_number(number: &Number) -> Option<BigDecimal> {
    let rendered = number.to_string();
    BigDecimal::from_str(&rendered).ok()
}

/// Returns whether a resolved value counts as present.
///
/// Null and the empty string count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    }
}
