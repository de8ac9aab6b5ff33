// crates/comply-core/src/lib.rs
// ============================================================================
// Module: Comply Core
// Description: Domain model, rule evaluation runtime, and interface contracts.
// Purpose: Provide the backend-agnostic compliance assessment engine.
// Dependencies: bigdecimal, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Comply Core implements rule-based compliance assessment for tracked
//! assets. Stored validation rules describe layered criteria over untyped
//! asset snapshots; the runtime evaluates them, reduces per-rule outcomes
//! into one compliance status, and records the transition as a current-state
//! mapping plus an immutable assessment history entry.
//!
//! The crate is deliberately free of storage, network, and wall-clock
//! concerns. Hosts supply those through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::core::identifiers::AssessorId;
pub use crate::core::identifiers::AssetId;
pub use crate::core::identifiers::FrameworkId;
pub use crate::core::identifiers::RequirementId;
pub use crate::core::identifiers::RuleId;
pub use crate::core::record::AssetRequirementMapping;
pub use crate::core::record::ComplianceAssessment;
pub use crate::core::record::ComplianceRequirement;
pub use crate::core::record::RuleOutcome;
pub use crate::core::report::AssessmentResult;
pub use crate::core::report::AssetComplianceList;
pub use crate::core::report::AssetComplianceRow;
pub use crate::core::report::AssetComplianceStatus;
pub use crate::core::report::BulkAssessmentResult;
pub use crate::core::report::ComplianceGap;
pub use crate::core::report::ComplianceListSummary;
pub use crate::core::report::PageRequest;
pub use crate::core::report::ValidationRuleView;
pub use crate::core::rule::Criterion;
pub use crate::core::rule::Operator;
pub use crate::core::rule::RuleDraft;
pub use crate::core::rule::RulePatch;
pub use crate::core::rule::ValidationLogic;
pub use crate::core::rule::ValidationRule;
pub use crate::core::status::AssessmentType;
pub use crate::core::status::AssetType;
pub use crate::core::status::ComplianceStatus;
pub use crate::core::status::ParseAssetTypeError;
pub use crate::core::status::ParseComplianceStatusError;
pub use crate::core::time::Timestamp;
pub use crate::interfaces::AssessmentStore;
pub use crate::interfaces::AssetDirectory;
pub use crate::interfaces::Clock;
pub use crate::interfaces::ComplianceListFilter;
pub use crate::interfaces::DirectoryError;
pub use crate::interfaces::RequirementDirectory;
pub use crate::interfaces::RuleFilter;
pub use crate::interfaces::RuleStore;
pub use crate::interfaces::StoreError;
