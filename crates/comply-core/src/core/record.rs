// crates/comply-core/src/core/record.rs
// ============================================================================
// Module: Comply Assessment Records
// Description: Requirements, current-state mappings, and assessment history.
// Purpose: Capture compliance state evolution for audit and reporting.
// Dependencies: crate::core::{identifiers, status, time}, serde
// ============================================================================

//! ## Overview
//! Two record families track compliance state: the mapping row holds the
//! current status for one asset/requirement pair and is updated in place,
//! while assessment rows are append-only history capturing each run's
//! status transition together with the full per-rule outcome list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AssessorId;
use crate::core::identifiers::AssetId;
use crate::core::identifiers::FrameworkId;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::RuleId;
use crate::core::status::AssessmentType;
use crate::core::status::AssetType;
use crate::core::status::ComplianceStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Requirements
// ============================================================================

/// Compliance requirement belonging to a framework.
///
/// # Invariants
/// - `requirement_id` is unique within the requirement directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRequirement {
    /// Requirement identifier.
    pub requirement_id: RequirementId,
    /// Framework the requirement belongs to.
    pub framework_id: FrameworkId,
    /// Short requirement code, e.g. a control number.
    pub code: String,
    /// Human-readable requirement title.
    pub title: String,
    /// Optional requirement description.
    pub description: Option<String>,
}

// ============================================================================
// SECTION: Rule Outcomes
// ============================================================================

/// Outcome of evaluating one rule against one asset snapshot.
///
/// # Invariants
/// - `status` is `not_applicable` exactly when `applicable` is false.
/// - `message` is one of the fixed evaluator messages, not rule-authored text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Identifier of the evaluated rule.
    pub rule_id: RuleId,
    /// Name of the evaluated rule.
    pub rule_name: String,
    /// Whether the rule's conditions gate was met.
    pub applicable: bool,
    /// Status derived for this rule.
    pub status: ComplianceStatus,
    /// Fixed human-readable classification message.
    pub message: String,
}

// ============================================================================
// SECTION: Mappings
// ============================================================================

/// Current compliance status for one asset/requirement pair.
///
/// # Invariants
/// - At most one mapping exists per (asset type, asset id, requirement id).
/// - Updated in place on re-assessment; never appended.
/// - `evidence_urls` and `notes` survive automatic re-assessment untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRequirementMapping {
    /// Asset type of the mapped asset.
    pub asset_type: AssetType,
    /// Asset identifier.
    pub asset_id: AssetId,
    /// Requirement identifier.
    pub requirement_id: RequirementId,
    /// Current compliance status.
    pub status: ComplianceStatus,
    /// Timestamp of the most recent assessment.
    pub last_assessed_at: Timestamp,
    /// Assessor of the most recent assessment, when known.
    pub assessed_by: Option<AssessorId>,
    /// Evidence URLs attached by assessors.
    pub evidence_urls: Vec<String>,
    /// Free-text assessor notes.
    pub notes: Option<String>,
    /// Whether the most recent assessment was produced by the engine.
    pub auto_assessed: bool,
}

// ============================================================================
// SECTION: Assessment History
// ============================================================================

/// Immutable record of one assessment run.
///
/// # Invariants
/// - Append-only; one record per run regardless of status change.
/// - `rule_results` is the full outcome list, including inapplicable rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    /// Asset type of the assessed asset.
    pub asset_type: AssetType,
    /// Asset identifier.
    pub asset_id: AssetId,
    /// Requirement identifier.
    pub requirement_id: RequirementId,
    /// Origin of the assessment run.
    pub assessment_type: AssessmentType,
    /// Status held by the mapping before this run.
    pub previous_status: ComplianceStatus,
    /// Status derived by this run.
    pub new_status: ComplianceStatus,
    /// Full per-rule outcome list for this run.
    pub rule_results: Vec<RuleOutcome>,
    /// Assessor reference, when known.
    pub assessed_by: Option<AssessorId>,
    /// Timestamp of the run.
    pub assessed_at: Timestamp,
    /// Optional notes attached to the run.
    pub notes: Option<String>,
}
