// crates/comply-core/src/core/report.rs
// ============================================================================
// Module: Comply Report Shapes
// Description: Result DTOs returned by the assessment engine.
// Purpose: Give hosts stable, serializable views over assessment state.
// Dependencies: crate::core::{identifiers, record, rule, status}, serde
// ============================================================================

//! ## Overview
//! Report shapes are derived views, never persisted. Hosts serialize them
//! directly; timestamps are rendered as RFC 3339 strings so callers need no
//! knowledge of the internal time representation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AssessorId;
use crate::core::identifiers::AssetId;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::RuleId;
use crate::core::record::RuleOutcome;
use crate::core::rule::ValidationLogic;
use crate::core::status::AssessmentType;
use crate::core::status::AssetType;
use crate::core::status::ComplianceStatus;

// ============================================================================
// SECTION: Assessment Results
// ============================================================================

/// Result of assessing one asset against one requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Asset type of the assessed asset.
    pub asset_type: AssetType,
    /// Asset identifier.
    pub asset_id: AssetId,
    /// Requirement identifier.
    pub requirement_id: RequirementId,
    /// Requirement title for display.
    pub requirement_title: String,
    /// Overall status derived for the pair.
    pub status: ComplianceStatus,
    /// Per-rule outcome list for the run.
    pub rule_results: Vec<RuleOutcome>,
    /// Remediation recommendations for failing rules.
    pub recommendations: Vec<String>,
    /// Assessment time as an RFC 3339 string.
    pub assessed_at: String,
    /// Origin of the assessment run.
    pub assessment_type: AssessmentType,
}

/// Aggregate compliance status for one asset across all its requirements.
///
/// # Invariants
/// - Per-status counts sum to `total_requirements`.
/// - `overall_compliance_percentage` is in 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetComplianceStatus {
    /// Asset type of the asset.
    pub asset_type: AssetType,
    /// Asset identifier.
    pub asset_id: AssetId,
    /// Number of mapped requirements.
    pub total_requirements: usize,
    /// Count of compliant mappings.
    pub compliant_count: usize,
    /// Count of non-compliant mappings.
    pub non_compliant_count: usize,
    /// Count of partially compliant mappings.
    pub partially_compliant_count: usize,
    /// Count of not-yet-assessed mappings.
    pub not_assessed_count: usize,
    /// Count of mappings requiring manual review.
    pub requires_review_count: usize,
    /// Count of not-applicable mappings.
    pub not_applicable_count: usize,
    /// Rounded share of compliant mappings, 0 when no mapping exists.
    pub overall_compliance_percentage: u8,
    /// Per-requirement detail rows.
    pub requirements: Vec<AssessmentResult>,
}

// ============================================================================
// SECTION: Compliance Gaps
// ============================================================================

/// One non-compliant or partially compliant mapping with remediation hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceGap {
    /// Requirement identifier.
    pub requirement_id: RequirementId,
    /// Requirement title for display.
    pub requirement_title: String,
    /// Short requirement code.
    pub requirement_code: String,
    /// Current mapping status.
    pub current_status: ComplianceStatus,
    /// Human-readable gap description.
    pub gap_description: String,
    /// Remediation recommendations for failing rules.
    pub recommendations: Vec<String>,
    /// Reserved; always empty in this release.
    pub missing_fields: Vec<String>,
    /// Failing rule outcomes from the latest assessment.
    pub failed_rules: Vec<RuleOutcome>,
}

// ============================================================================
// SECTION: Bulk Assessment
// ============================================================================

/// Aggregated outcome of a bulk assessment run.
///
/// # Invariants
/// - `successful + failed == total_assessed`.
/// - `errors` holds one entry per failed asset; successes are never listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAssessmentResult {
    /// Number of assets attempted.
    pub total_assessed: usize,
    /// Number of assets fully assessed.
    pub successful: usize,
    /// Number of assets that failed.
    pub failed: usize,
    /// Per-asset failure descriptions.
    pub errors: Vec<String>,
    /// Concatenated per-requirement results across successful assets.
    pub results: Vec<AssessmentResult>,
}

// ============================================================================
// SECTION: Rule Views
// ============================================================================

/// Display view of a stored validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRuleView {
    /// Rule identifier.
    pub rule_id: RuleId,
    /// Requirement the rule checks.
    pub requirement_id: RequirementId,
    /// Requirement title, when the requirement still exists.
    pub requirement_title: Option<String>,
    /// Requirement code, when the requirement still exists.
    pub requirement_code: Option<String>,
    /// Asset type the rule applies to.
    pub asset_type: AssetType,
    /// Human-readable rule name.
    pub rule_name: String,
    /// Optional rule description.
    pub rule_description: Option<String>,
    /// Layered validation logic document.
    pub logic: ValidationLogic,
    /// Evaluation priority.
    pub priority: i32,
    /// Whether the rule participates in assessments.
    pub active: bool,
    /// Assessor that created the rule.
    pub created_by: AssessorId,
    /// Creation time as an RFC 3339 string.
    pub created_at: String,
    /// Last-update time as an RFC 3339 string.
    pub updated_at: String,
}

// ============================================================================
// SECTION: Compliance List
// ============================================================================

/// Pagination request for list views.
///
/// # Invariants
/// - `page` is 1-based; page 0 is treated as page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    /// Number of rows per page.
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

/// One asset row in the compliance list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetComplianceRow {
    /// Asset identifier.
    pub asset_id: AssetId,
    /// Asset type of the asset.
    pub asset_type: AssetType,
    /// Display name resolved from the asset snapshot.
    pub asset_name: String,
    /// Unique identifier label resolved from the asset snapshot.
    pub asset_identifier: String,
    /// Description resolved from the asset snapshot.
    pub description: String,
    /// Criticality label resolved from the asset snapshot.
    pub criticality: String,
    /// Business unit resolved from the asset snapshot.
    pub business_unit: String,
    /// Number of mapped requirements.
    pub total_requirements: usize,
    /// Count of compliant mappings.
    pub compliant_count: usize,
    /// Count of non-compliant mappings.
    pub non_compliant_count: usize,
    /// Count of partially compliant mappings.
    pub partially_compliant_count: usize,
    /// Count of not-yet-assessed mappings.
    pub not_assessed_count: usize,
    /// Count of mappings requiring manual review.
    pub requires_review_count: usize,
    /// Count of not-applicable mappings.
    pub not_applicable_count: usize,
    /// Rounded share of compliant mappings.
    pub compliance_percentage: u8,
    /// Most recent assessment time as an RFC 3339 string.
    pub last_assessment_date: String,
    /// Overall status reduced from the mapping statuses.
    pub overall_status: ComplianceStatus,
}

/// Summary block attached to one compliance list page.
///
/// # Invariants
/// - `total_assets` counts all matching assets; the per-status counts and
///   average cover the returned page only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceListSummary {
    /// Total number of matching assets across all pages.
    pub total_assets: usize,
    /// Compliant assets on this page.
    pub compliant_assets: usize,
    /// Non-compliant assets on this page.
    pub non_compliant_assets: usize,
    /// Partially compliant assets on this page.
    pub partially_compliant_assets: usize,
    /// Rounded average compliance percentage over this page.
    pub average_compliance_percentage: u8,
}

/// Paginated compliance list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetComplianceList {
    /// Total number of matching assets across all pages.
    pub total: usize,
    /// 1-based page number returned.
    pub page: usize,
    /// Page size used.
    pub page_size: usize,
    /// Total number of pages.
    pub total_pages: usize,
    /// Asset rows for this page.
    pub assets: Vec<AssetComplianceRow>,
    /// Summary block for this page.
    pub summary: ComplianceListSummary,
}
