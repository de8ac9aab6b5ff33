// crates/comply-core/tests/proptest_operator.rs
// ============================================================================
// Module: Operator Property-Based Tests
// Description: Property tests for operator correctness and stability.
// Purpose: Detect panics and invariants across wide input ranges.
// ============================================================================

//! Property-based tests for operator evaluation invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use comply_core::Operator;
use comply_core::runtime::evaluate_operator;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

fn json_value_strategy(max_depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        any::<f64>()
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(|v| { serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number) }),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(max_depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0 .. 4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0 .. 4).prop_map(|map| {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key, value);
                }
                Value::Object(object)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn numeric_equality_matches_integer_equality(a in any::<i64>(), b in any::<i64>()) {
        let field = json!(a);
        let expected = json!(b);
        let equals = evaluate_operator(Some(&field), Operator::Equals, &expected);
        prop_assert_eq!(equals, a == b);
    }

    #[test]
    fn not_equals_is_the_negation_of_equals(a in any::<i64>(), b in any::<i64>()) {
        let field = json!(a);
        let expected = json!(b);
        let equals = evaluate_operator(Some(&field), Operator::Equals, &expected);
        let not_equals = evaluate_operator(Some(&field), Operator::NotEquals, &expected);
        prop_assert_eq!(not_equals, !equals);
    }

    #[test]
    fn numeric_ordering_matches_integer_ordering(a in any::<i64>(), b in any::<i64>()) {
        let field = json!(a);
        let expected = json!(b);
        let gt = evaluate_operator(Some(&field), Operator::GreaterThan, &expected);
        let lt = evaluate_operator(Some(&field), Operator::LessThan, &expected);
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => {
                prop_assert!(gt);
                prop_assert!(!lt);
            }
            std::cmp::Ordering::Less => {
                prop_assert!(!gt);
                prop_assert!(lt);
            }
            std::cmp::Ordering::Equal => {
                prop_assert!(!gt);
                prop_assert!(!lt);
            }
        }
    }

    #[test]
    fn exists_and_not_exists_are_complementary(value in json_value_strategy(2)) {
        let exists = evaluate_operator(Some(&value), Operator::Exists, &Value::Null);
        let not_exists = evaluate_operator(Some(&value), Operator::NotExists, &Value::Null);
        prop_assert_eq!(exists, !not_exists);
    }

    #[test]
    fn in_and_not_in_are_complementary_for_arrays(
        field in json_value_strategy(1),
        items in prop::collection::vec(json_value_strategy(1), 0 .. 4),
    ) {
        let expected = Value::Array(items);
        let within = evaluate_operator(Some(&field), Operator::In, &expected);
        let without = evaluate_operator(Some(&field), Operator::NotIn, &expected);
        prop_assert_eq!(within, !without);
    }

    #[test]
    fn operators_never_panic_on_random_json(
        field in json_value_strategy(2),
        expected in json_value_strategy(2),
    ) {
        let operators = vec![
            Operator::Equals,
            Operator::NotEquals,
            Operator::Contains,
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::In,
            Operator::NotIn,
            Operator::Exists,
            Operator::NotExists,
            Operator::Unrecognized,
        ];
        for operator in operators {
            let _ = evaluate_operator(Some(&field), operator, &expected);
            let _ = evaluate_operator(None, operator, &expected);
        }
    }
}
