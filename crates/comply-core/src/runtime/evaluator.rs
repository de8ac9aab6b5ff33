// crates/comply-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Comply Rule Evaluation
// Description: Criterion combination and per-rule classification gates.
// Purpose: Classify one rule's outcome for one asset snapshot.
// Dependencies: crate::core, crate::runtime::{fieldpath, operator}, serde_json
// ============================================================================

//! ## Overview
//! A rule classifies an asset through four ordered gates: conditions
//! (applicability), compliance, non-compliance, and partial compliance.
//! The first gate that matches terminates evaluation. Criterion lists
//! combine with AND only and an empty list is vacuously true; OR-combination
//! and nesting are outside the predicate language.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::record::RuleOutcome;
use crate::core::rule::Criterion;
use crate::core::rule::ValidationRule;
use crate::core::status::ComplianceStatus;
use crate::runtime::fieldpath::field_value;
use crate::runtime::operator::evaluate_operator;

// ============================================================================
// SECTION: Criteria Evaluation
// ============================================================================

/// Evaluates a criterion list against an asset snapshot with AND semantics.
///
/// An empty list is vacuously true: a missing gate always passes and a
/// missing criterion set is trivially satisfied.
#[must_use]
pub fn evaluate_criteria(criteria: &[Criterion], asset: &Value) -> bool {
    criteria.iter().all(|criterion| {
        let field = field_value(asset, &criterion.field);
        evaluate_operator(field, criterion.operator, &criterion.value)
    })
}

// ============================================================================
// SECTION: Rule Classification
// ============================================================================

/// Classifies one rule's outcome for one asset snapshot.
///
/// Gates are checked strictly in order and the first match wins:
/// unmet conditions, compliance criteria, non-compliance criteria (only
/// when non-empty), partial-compliance criteria (only when non-empty),
/// and finally a requires-review fallback.
#[must_use]
pub fn evaluate_rule(rule: &ValidationRule, asset: &Value) -> RuleOutcome {
    let logic = &rule.logic;

    if !evaluate_criteria(&logic.conditions, asset) {
        return outcome(rule, false, ComplianceStatus::NotApplicable, "Rule conditions not met");
    }

    if evaluate_criteria(&logic.compliance_criteria, asset) {
        return outcome(rule, true, ComplianceStatus::Compliant, "All compliance criteria met");
    }

    if !logic.non_compliance_criteria.is_empty()
        && evaluate_criteria(&logic.non_compliance_criteria, asset)
    {
        return outcome(
            rule,
            true,
            ComplianceStatus::NonCompliant,
            "Non-compliance criteria detected",
        );
    }

    if !logic.partial_compliance_criteria.is_empty()
        && evaluate_criteria(&logic.partial_compliance_criteria, asset)
    {
        return outcome(
            rule,
            true,
            ComplianceStatus::PartiallyCompliant,
            "Partial compliance criteria met",
        );
    }

    outcome(
        rule,
        true,
        ComplianceStatus::RequiresReview,
        "Unable to determine compliance automatically",
    )
}

/// Builds one rule outcome with the fixed classification message.
fn outcome(
    rule: &ValidationRule,
    applicable: bool,
    status: ComplianceStatus,
    message: &str,
) -> RuleOutcome {
    RuleOutcome {
        rule_id: rule.rule_id.clone(),
        rule_name: rule.rule_name.clone(),
        applicable,
        status,
        message: message.to_string(),
    }
}
