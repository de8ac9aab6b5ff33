// crates/comply-core/src/runtime/reducer.rs
// ============================================================================
// Module: Comply Status Reduction
// Description: Fixed-precedence reduction of statuses into one overall status.
// Purpose: Keep the precedence rules in exactly one in-process representation.
// Dependencies: crate::core::{record, status}
// ============================================================================

//! ## Overview
//! Two reducers share one precedence spine: non-compliance always wins,
//! an all-compliant set is compliant, partial compliance wins over the
//! fallback. The outcome reducer operates on per-rule results and falls
//! back to requires-review; the mapping reducer operates on stored mapping
//! statuses for the list view and falls back through requires-review to
//! not-assessed. The check order is significant and must not be rearranged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::record::RuleOutcome;
use crate::core::status::ComplianceStatus;

// ============================================================================
// SECTION: Outcome Reduction
// ============================================================================

/// Reduces per-rule outcomes into one overall status.
///
/// Only applicable outcomes participate. With none, the overall status is
/// not-applicable. Otherwise: any non-compliant outcome dominates, then an
/// all-compliant set, then any partially compliant outcome, and finally
/// requires-review.
#[must_use]
pub fn reduce_outcomes(outcomes: &[RuleOutcome]) -> ComplianceStatus {
    let applicable: Vec<&RuleOutcome> =
        outcomes.iter().filter(|outcome| outcome.applicable).collect();

    if applicable.is_empty() {
        return ComplianceStatus::NotApplicable;
    }

    if applicable.iter().any(|outcome| outcome.status == ComplianceStatus::NonCompliant) {
        return ComplianceStatus::NonCompliant;
    }

    if applicable.iter().all(|outcome| outcome.status == ComplianceStatus::Compliant) {
        return ComplianceStatus::Compliant;
    }

    if applicable.iter().any(|outcome| outcome.status == ComplianceStatus::PartiallyCompliant) {
        return ComplianceStatus::PartiallyCompliant;
    }

    ComplianceStatus::RequiresReview
}

// ============================================================================
// SECTION: Mapping Reduction
// ============================================================================

/// Reduces stored mapping statuses into one per-asset overall status.
///
/// Same precedence spine as [`reduce_outcomes`], applied to current-state
/// mapping rows for the list view: any non-compliant mapping dominates,
/// then an all-compliant set, then any partially compliant mapping, then
/// any mapping awaiting review, and finally not-assessed (also the result
/// for an empty set).
#[must_use]
pub fn reduce_mapping_statuses(statuses: &[ComplianceStatus]) -> ComplianceStatus {
    if statuses.is_empty() {
        return ComplianceStatus::NotAssessed;
    }

    if statuses.iter().any(|status| *status == ComplianceStatus::NonCompliant) {
        return ComplianceStatus::NonCompliant;
    }

    if statuses.iter().all(|status| *status == ComplianceStatus::Compliant) {
        return ComplianceStatus::Compliant;
    }

    if statuses.iter().any(|status| *status == ComplianceStatus::PartiallyCompliant) {
        return ComplianceStatus::PartiallyCompliant;
    }

    if statuses.iter().any(|status| *status == ComplianceStatus::RequiresReview) {
        return ComplianceStatus::RequiresReview;
    }

    ComplianceStatus::NotAssessed
}
