// crates/comply-core/src/interfaces/mod.rs
// ============================================================================
// Module: Comply Interfaces
// Description: Backend-agnostic interfaces for assets, rules, and assessments.
// Purpose: Define the contract surfaces used by the Comply runtime.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the assessment engine reaches external systems
//! without embedding backend-specific details. Implementations must be
//! deterministic and fail closed on missing or invalid data. Asset
//! snapshots are read-only property bags owned by external services; the
//! engine never mutates them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::AssetId;
use crate::core::identifiers::FrameworkId;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::RuleId;
use crate::core::record::AssetRequirementMapping;
use crate::core::record::ComplianceAssessment;
use crate::core::record::ComplianceRequirement;
use crate::core::rule::ValidationRule;
use crate::core::status::AssetType;
use crate::core::status::ComplianceStatus;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Asset Directory
// ============================================================================

/// Asset directory errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// No asset exists under the given type and identifier.
    #[error("{asset_type} asset not found: {asset_id}")]
    NotFound {
        /// Asset type that was queried.
        asset_type: AssetType,
        /// Asset identifier that was queried.
        asset_id: AssetId,
    },
    /// Directory I/O error.
    #[error("asset directory io error: {0}")]
    Io(String),
    /// Directory data is invalid.
    #[error("asset directory invalid data: {0}")]
    Invalid(String),
}

/// Read-only directory resolving asset snapshots by type and identifier.
pub trait AssetDirectory {
    /// Fetches one asset snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when no such asset exists, or
    /// another [`DirectoryError`] when the backing source fails.
    fn fetch(&self, asset_type: AssetType, asset_id: &AssetId) -> Result<Value, DirectoryError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time source installed by the host.
///
/// The engine stamps mappings and history rows with values from this
/// interface and never reads wall-clock time itself.
pub trait Clock {
    /// Returns the current timestamp.
    fn now(&self) -> Timestamp;
}

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Store errors shared by the rule, requirement, and assessment stores.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages avoid embedding raw rule documents or asset snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Write conflicts with an existing row.
    #[error("store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Rule Store
// ============================================================================

/// Optional filters for rule listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    /// Restrict to rules of one requirement.
    pub requirement_id: Option<RequirementId>,
    /// Restrict to rules of one asset type.
    pub asset_type: Option<AssetType>,
}

/// Persistence for validation rules.
pub trait RuleStore {
    /// Returns active rules for one requirement and asset type, ordered by
    /// priority descending with stable store order as the tie-break.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn active_rules(
        &self,
        requirement_id: &RequirementId,
        asset_type: AssetType,
    ) -> Result<Vec<ValidationRule>, StoreError>;

    /// Inserts a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the rule identifier already
    /// exists, or another [`StoreError`] when the write fails.
    fn insert_rule(&self, rule: &ValidationRule) -> Result<(), StoreError>;

    /// Lists rules matching the filter, ordered by priority descending and
    /// creation time descending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_rules(&self, filter: &RuleFilter) -> Result<Vec<ValidationRule>, StoreError>;

    /// Loads one rule by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn rule(&self, rule_id: &RuleId) -> Result<Option<ValidationRule>, StoreError>;

    /// Replaces a stored rule.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn update_rule(&self, rule: &ValidationRule) -> Result<(), StoreError>;

    /// Deletes one rule; returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn delete_rule(&self, rule_id: &RuleId) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Requirement Directory
// ============================================================================

/// Read access to compliance requirements.
pub trait RequirementDirectory {
    /// Loads one requirement by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn requirement(
        &self,
        requirement_id: &RequirementId,
    ) -> Result<Option<ComplianceRequirement>, StoreError>;

    /// Returns all requirements belonging to any of the given frameworks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn requirements_for_frameworks(
        &self,
        framework_ids: &[FrameworkId],
    ) -> Result<Vec<ComplianceRequirement>, StoreError>;
}

// ============================================================================
// SECTION: Assessment Store
// ============================================================================

/// Optional filters for the compliance list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceListFilter {
    /// Restrict to mappings of one asset type.
    pub asset_type: Option<AssetType>,
    /// Restrict to mappings holding one status.
    pub status: Option<ComplianceStatus>,
}

/// Persistence for mappings and assessment history.
pub trait AssessmentStore {
    /// Loads the mapping for one asset/requirement pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn mapping(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Option<AssetRequirementMapping>, StoreError>;

    /// Returns all mappings for one asset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn mappings_for_asset(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
    ) -> Result<Vec<AssetRequirementMapping>, StoreError>;

    /// Returns all mappings matching the list filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn mappings_matching(
        &self,
        filter: &ComplianceListFilter,
    ) -> Result<Vec<AssetRequirementMapping>, StoreError>;

    /// Returns the most recent assessment for one asset/requirement pair,
    /// ordered by assessment time descending with insertion order as the
    /// tie-break.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn latest_assessment(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Option<ComplianceAssessment>, StoreError>;

    /// Atomically upserts the mapping and appends the assessment record.
    ///
    /// Both writes commit together or not at all; a failure must leave
    /// neither row behind.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the commit fails.
    fn record_outcome(
        &self,
        mapping: &AssetRequirementMapping,
        assessment: &ComplianceAssessment,
    ) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Reference Forwarding
// ============================================================================

impl<T: AssetDirectory + ?Sized> AssetDirectory for &T {
    fn fetch(&self, asset_type: AssetType, asset_id: &AssetId) -> Result<Value, DirectoryError> {
        (**self).fetch(asset_type, asset_id)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<T: RuleStore + ?Sized> RuleStore for &T {
    fn active_rules(
        &self,
        requirement_id: &RequirementId,
        asset_type: AssetType,
    ) -> Result<Vec<ValidationRule>, StoreError> {
        (**self).active_rules(requirement_id, asset_type)
    }

    fn insert_rule(&self, rule: &ValidationRule) -> Result<(), StoreError> {
        (**self).insert_rule(rule)
    }

    fn list_rules(&self, filter: &RuleFilter) -> Result<Vec<ValidationRule>, StoreError> {
        (**self).list_rules(filter)
    }

    fn rule(&self, rule_id: &RuleId) -> Result<Option<ValidationRule>, StoreError> {
        (**self).rule(rule_id)
    }

    fn update_rule(&self, rule: &ValidationRule) -> Result<(), StoreError> {
        (**self).update_rule(rule)
    }

    fn delete_rule(&self, rule_id: &RuleId) -> Result<bool, StoreError> {
        (**self).delete_rule(rule_id)
    }
}

impl<T: RequirementDirectory + ?Sized> RequirementDirectory for &T {
    fn requirement(
        &self,
        requirement_id: &RequirementId,
    ) -> Result<Option<ComplianceRequirement>, StoreError> {
        (**self).requirement(requirement_id)
    }

    fn requirements_for_frameworks(
        &self,
        framework_ids: &[FrameworkId],
    ) -> Result<Vec<ComplianceRequirement>, StoreError> {
        (**self).requirements_for_frameworks(framework_ids)
    }
}

impl<T: AssessmentStore + ?Sized> AssessmentStore for &T {
    fn mapping(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Option<AssetRequirementMapping>, StoreError> {
        (**self).mapping(asset_type, asset_id, requirement_id)
    }

    fn mappings_for_asset(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
    ) -> Result<Vec<AssetRequirementMapping>, StoreError> {
        (**self).mappings_for_asset(asset_type, asset_id)
    }

    fn mappings_matching(
        &self,
        filter: &ComplianceListFilter,
    ) -> Result<Vec<AssetRequirementMapping>, StoreError> {
        (**self).mappings_matching(filter)
    }

    fn latest_assessment(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Option<ComplianceAssessment>, StoreError> {
        (**self).latest_assessment(asset_type, asset_id, requirement_id)
    }

    fn record_outcome(
        &self,
        mapping: &AssetRequirementMapping,
        assessment: &ComplianceAssessment,
    ) -> Result<(), StoreError> {
        (**self).record_outcome(mapping, assessment)
    }
}
