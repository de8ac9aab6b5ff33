// crates/comply-core/src/runtime/engine.rs
// ============================================================================
// Module: Comply Assessment Engine
// Description: Orchestration of rule evaluation, recording, and reporting.
// Purpose: Drive load-evaluate-reduce-record flows over the interface traits.
// Dependencies: crate::core, crate::interfaces, crate::runtime, serde_json
// ============================================================================

//! ## Overview
//! The engine wires the asset directory, rule store, requirement directory,
//! assessment store, and clock into the public assessment operations. Every
//! operation is a stateless, synchronous computation over externally-owned
//! data: no caching, no retries, no internal threads. The mapping upsert
//! and the history append commit through one atomic store call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::AssessorId;
use crate::core::identifiers::AssetId;
use crate::core::identifiers::FrameworkId;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::RuleId;
use crate::core::record::AssetRequirementMapping;
use crate::core::record::ComplianceAssessment;
use crate::core::record::ComplianceRequirement;
use crate::core::record::RuleOutcome;
use crate::core::report::AssessmentResult;
use crate::core::report::AssetComplianceList;
use crate::core::report::AssetComplianceRow;
use crate::core::report::AssetComplianceStatus;
use crate::core::report::BulkAssessmentResult;
use crate::core::report::ComplianceGap;
use crate::core::report::ComplianceListSummary;
use crate::core::report::PageRequest;
use crate::core::report::ValidationRuleView;
use crate::core::rule::RuleDraft;
use crate::core::rule::RulePatch;
use crate::core::rule::ValidationRule;
use crate::core::status::AssessmentType;
use crate::core::status::AssetType;
use crate::core::status::ComplianceStatus;
use crate::core::time::Timestamp;
use crate::interfaces::AssessmentStore;
use crate::interfaces::AssetDirectory;
use crate::interfaces::Clock;
use crate::interfaces::ComplianceListFilter;
use crate::interfaces::DirectoryError;
use crate::interfaces::RequirementDirectory;
use crate::interfaces::RuleFilter;
use crate::interfaces::RuleStore;
use crate::interfaces::StoreError;
use crate::runtime::evaluator::evaluate_rule;
use crate::runtime::reducer::reduce_mapping_statuses;
use crate::runtime::reducer::reduce_outcomes;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Asset snapshot field carrying the linked compliance framework identifiers.
const LINKED_FRAMEWORKS_FIELD: &str = "compliance_requirements";

/// Title placeholder for requirements that no longer resolve.
const UNKNOWN_REQUIREMENT_TITLE: &str = "Unknown";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Assessment engine errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Not-found failures are never retried by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Asset lookup failed.
    #[error("asset lookup failed: {0}")]
    Asset(#[from] DirectoryError),
    /// Referenced requirement does not exist.
    #[error("requirement not found: {0}")]
    RequirementNotFound(RequirementId),
    /// Referenced validation rule does not exist.
    #[error("validation rule not found: {0}")]
    RuleNotFound(RuleId),
    /// Backing store failed.
    #[error("assessment store failed: {0}")]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Compliance assessment engine over backend-agnostic collaborators.
///
/// # Invariants
/// - Operations never mutate asset snapshots.
/// - The mapping upsert and history append commit atomically.
#[derive(Debug, Clone)]
pub struct AssessmentEngine<A, C, Q, R, S> {
    /// Read-only asset directory.
    assets: A,
    /// Host-supplied time source.
    clock: C,
    /// Requirement directory.
    requirements: Q,
    /// Validation rule store.
    rules: R,
    /// Mapping and history store.
    store: S,
}

impl<A, C, Q, R, S> AssessmentEngine<A, C, Q, R, S>
where
    A: AssetDirectory,
    C: Clock,
    Q: RequirementDirectory,
    R: RuleStore,
    S: AssessmentStore,
{
    /// Creates an engine over the given collaborators.
    pub const fn new(assets: A, clock: C, requirements: Q, rules: R, store: S) -> Self {
        Self {
            assets,
            clock,
            requirements,
            rules,
            store,
        }
    }

    // ------------------------------------------------------------------
    // Assessment
    // ------------------------------------------------------------------

    /// Assesses one asset against one requirement and records the outcome.
    ///
    /// Loads the asset and requirement, evaluates the active rules in
    /// priority order, reduces the outcomes into one status, then commits
    /// the mapping upsert and the immutable history row in one store call.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the asset or requirement cannot be
    /// found or a store operation fails. Nothing is written on failure.
    pub fn assess_asset_requirement(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
        assessed_by: Option<&AssessorId>,
    ) -> Result<AssessmentResult, EngineError> {
        let asset = self.assets.fetch(asset_type, asset_id)?;
        let requirement = self
            .requirements
            .requirement(requirement_id)?
            .ok_or_else(|| EngineError::RequirementNotFound(requirement_id.clone()))?;

        let rules = self.rules.active_rules(requirement_id, asset_type)?;
        let outcomes: Vec<RuleOutcome> =
            rules.iter().map(|rule| evaluate_rule(rule, &asset)).collect();
        let status = reduce_outcomes(&outcomes);

        let now = self.clock.now();
        let existing = self.store.mapping(asset_type, asset_id, requirement_id)?;
        let previous_status =
            existing.as_ref().map_or(ComplianceStatus::NotAssessed, |mapping| mapping.status);

        let mapping = match existing {
            Some(mut mapping) => {
                mapping.status = status;
                mapping.last_assessed_at = now;
                mapping.assessed_by = assessed_by.cloned();
                mapping.auto_assessed = true;
                mapping
            }
            None => AssetRequirementMapping {
                asset_type,
                asset_id: asset_id.clone(),
                requirement_id: requirement_id.clone(),
                status,
                last_assessed_at: now,
                assessed_by: assessed_by.cloned(),
                evidence_urls: Vec::new(),
                notes: None,
                auto_assessed: true,
            },
        };

        let assessment = ComplianceAssessment {
            asset_type,
            asset_id: asset_id.clone(),
            requirement_id: requirement_id.clone(),
            assessment_type: AssessmentType::Automatic,
            previous_status,
            new_status: status,
            rule_results: outcomes.clone(),
            assessed_by: assessed_by.cloned(),
            assessed_at: now,
            notes: None,
        };

        self.store.record_outcome(&mapping, &assessment)?;

        let recommendations = recommendations_for(&outcomes);
        Ok(AssessmentResult {
            asset_type,
            asset_id: asset_id.clone(),
            requirement_id: requirement_id.clone(),
            requirement_title: requirement.title,
            status,
            rule_results: outcomes,
            recommendations,
            assessed_at: now.to_rfc3339(),
            assessment_type: AssessmentType::Automatic,
        })
    }

    /// Assesses one asset against every requirement of its linked frameworks.
    ///
    /// Framework identifiers are read from the asset snapshot's
    /// `compliance_requirements` field. Requirements are assessed one at a
    /// time in directory order; an asset without linked frameworks yields
    /// an empty result list.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the asset cannot be found or any
    /// per-requirement assessment fails.
    pub fn assess_asset(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        assessed_by: Option<&AssessorId>,
    ) -> Result<Vec<AssessmentResult>, EngineError> {
        let asset = self.assets.fetch(asset_type, asset_id)?;
        let framework_ids = linked_framework_ids(&asset);
        if framework_ids.is_empty() {
            return Ok(Vec::new());
        }

        let requirements = self.requirements.requirements_for_frameworks(&framework_ids)?;
        let mut results = Vec::with_capacity(requirements.len());
        for requirement in &requirements {
            results.push(self.assess_asset_requirement(
                asset_type,
                asset_id,
                &requirement.requirement_id,
                assessed_by,
            )?);
        }
        Ok(results)
    }

    /// Assesses several assets sequentially, collecting per-asset failures.
    ///
    /// A failing asset never aborts the batch: its error is stringified
    /// into the error list and the remaining assets are still processed.
    #[must_use]
    pub fn bulk_assess(
        &self,
        asset_type: AssetType,
        asset_ids: &[AssetId],
        assessed_by: Option<&AssessorId>,
    ) -> BulkAssessmentResult {
        let mut results = Vec::new();
        let mut errors = Vec::new();
        for asset_id in asset_ids {
            match self.assess_asset(asset_type, asset_id, assessed_by) {
                Ok(asset_results) => results.extend(asset_results),
                Err(error) => {
                    errors.push(format!("Failed to assess {asset_type} asset {asset_id}: {error}"));
                }
            }
        }
        BulkAssessmentResult {
            total_assessed: asset_ids.len(),
            successful: asset_ids.len().saturating_sub(errors.len()),
            failed: errors.len(),
            errors,
            results,
        }
    }

    // ------------------------------------------------------------------
    // Reporting
    // ------------------------------------------------------------------

    /// Returns the aggregate compliance status for one asset.
    ///
    /// Counts mappings per status, derives the rounded compliant share,
    /// and surfaces each mapping's latest recorded rule outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when a store query fails.
    pub fn asset_compliance_status(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
    ) -> Result<AssetComplianceStatus, EngineError> {
        let mappings = self.store.mappings_for_asset(asset_type, asset_id)?;
        let total = mappings.len();
        let compliant = count_status(&mappings, ComplianceStatus::Compliant);

        let mut requirements = Vec::with_capacity(total);
        for mapping in &mappings {
            let latest =
                self.store.latest_assessment(asset_type, asset_id, &mapping.requirement_id)?;
            let title = self
                .requirements
                .requirement(&mapping.requirement_id)?
                .map_or_else(|| UNKNOWN_REQUIREMENT_TITLE.to_string(), |found| found.title);
            requirements.push(AssessmentResult {
                asset_type,
                asset_id: asset_id.clone(),
                requirement_id: mapping.requirement_id.clone(),
                requirement_title: title,
                status: mapping.status,
                rule_results: latest
                    .as_ref()
                    .map(|assessment| assessment.rule_results.clone())
                    .unwrap_or_default(),
                recommendations: Vec::new(),
                assessed_at: mapping.last_assessed_at.to_rfc3339(),
                assessment_type: latest
                    .map_or(AssessmentType::Automatic, |assessment| assessment.assessment_type),
            });
        }

        Ok(AssetComplianceStatus {
            asset_type,
            asset_id: asset_id.clone(),
            total_requirements: total,
            compliant_count: compliant,
            non_compliant_count: count_status(&mappings, ComplianceStatus::NonCompliant),
            partially_compliant_count: count_status(
                &mappings,
                ComplianceStatus::PartiallyCompliant,
            ),
            not_assessed_count: count_status(&mappings, ComplianceStatus::NotAssessed),
            requires_review_count: count_status(&mappings, ComplianceStatus::RequiresReview),
            not_applicable_count: count_status(&mappings, ComplianceStatus::NotApplicable),
            overall_compliance_percentage: rounded_percentage(compliant, total),
            requirements,
        })
    }

    /// Returns one gap entry per non-compliant or partially compliant mapping.
    ///
    /// Failing rule outcomes are extracted from the latest history row and
    /// recommendations are regenerated from them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when a store query fails.
    pub fn compliance_gaps(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
    ) -> Result<Vec<ComplianceGap>, EngineError> {
        let mappings = self.store.mappings_for_asset(asset_type, asset_id)?;
        let mut gaps = Vec::new();
        for mapping in mappings.into_iter().filter(|mapping| {
            matches!(
                mapping.status,
                ComplianceStatus::NonCompliant | ComplianceStatus::PartiallyCompliant
            )
        }) {
            let latest =
                self.store.latest_assessment(asset_type, asset_id, &mapping.requirement_id)?;
            let failed_rules: Vec<RuleOutcome> = latest
                .map(|assessment| assessment.rule_results)
                .unwrap_or_default()
                .into_iter()
                .filter(|outcome| {
                    matches!(
                        outcome.status,
                        ComplianceStatus::NonCompliant | ComplianceStatus::PartiallyCompliant
                    )
                })
                .collect();

            let requirement = self.requirements.requirement(&mapping.requirement_id)?;
            let (title, code) = requirement.map_or_else(
                || (UNKNOWN_REQUIREMENT_TITLE.to_string(), String::new()),
                |found| (found.title, found.code),
            );

            gaps.push(ComplianceGap {
                requirement_id: mapping.requirement_id.clone(),
                requirement_title: title.clone(),
                requirement_code: code,
                current_status: mapping.status,
                gap_description: format!("Asset does not meet requirements for {title}"),
                recommendations: recommendations_for(&failed_rules),
                missing_fields: Vec::new(),
                failed_rules,
            });
        }
        Ok(gaps)
    }

    /// Returns the paginated per-asset compliance list.
    ///
    /// Mapping rows are grouped by asset, reduced to one overall status per
    /// asset with the in-process mapping reducer, joined with display
    /// fields from the asset directory, and paginated. The summary's
    /// per-status counts and average cover the returned page.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when a store query fails.
    pub fn asset_compliance_list(
        &self,
        filter: &ComplianceListFilter,
        page: PageRequest,
    ) -> Result<AssetComplianceList, EngineError> {
        let mappings = self.store.mappings_matching(filter)?;

        let mut groups: BTreeMap<(AssetType, AssetId), Vec<AssetRequirementMapping>> =
            BTreeMap::new();
        for mapping in mappings {
            groups
                .entry((mapping.asset_type, mapping.asset_id.clone()))
                .or_default()
                .push(mapping);
        }

        let total = groups.len();
        let page_size = page.page_size.max(1);
        let page_number = page.page.max(1);
        let total_pages = total.div_ceil(page_size);
        let offset = page_number.saturating_sub(1).saturating_mul(page_size);

        let mut assets = Vec::new();
        for ((asset_type, asset_id), group) in groups.into_iter().skip(offset).take(page_size) {
            assets.push(self.compliance_row(asset_type, &asset_id, &group));
        }

        let summary = page_summary(total, &assets);
        Ok(AssetComplianceList {
            total,
            page: page_number,
            page_size,
            total_pages,
            assets,
            summary,
        })
    }

    /// Builds one compliance list row from an asset's mapping group.
    fn compliance_row(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        group: &[AssetRequirementMapping],
    ) -> AssetComplianceRow {
        let statuses: Vec<ComplianceStatus> =
            group.iter().map(|mapping| mapping.status).collect();
        let total = group.len();
        let compliant = count_status(group, ComplianceStatus::Compliant);
        let last_assessed = group.iter().map(|mapping| mapping.last_assessed_at).max();

        // A vanished asset still renders with placeholder display fields.
        let snapshot = self.assets.fetch(asset_type, asset_id).ok();
        let snapshot = snapshot.as_ref();

        AssetComplianceRow {
            asset_id: asset_id.clone(),
            asset_type,
            asset_name: display_field(
                snapshot,
                &["name", "asset_description", "software_name"],
                "Unknown",
            ),
            asset_identifier: display_field(snapshot, &["unique_identifier"], "N/A"),
            description: display_field(snapshot, &["description", "asset_description"], ""),
            criticality: display_field(snapshot, &["criticality_level"], ""),
            business_unit: display_field(snapshot, &["business_unit", "department"], ""),
            total_requirements: total,
            compliant_count: compliant,
            non_compliant_count: count_status(group, ComplianceStatus::NonCompliant),
            partially_compliant_count: count_status(group, ComplianceStatus::PartiallyCompliant),
            not_assessed_count: count_status(group, ComplianceStatus::NotAssessed),
            requires_review_count: count_status(group, ComplianceStatus::RequiresReview),
            not_applicable_count: count_status(group, ComplianceStatus::NotApplicable),
            compliance_percentage: rounded_percentage(compliant, total),
            last_assessment_date: last_assessed.map(Timestamp::to_rfc3339).unwrap_or_default(),
            overall_status: reduce_mapping_statuses(&statuses),
        }
    }

    // ------------------------------------------------------------------
    // Rule Administration
    // ------------------------------------------------------------------

    /// Creates a validation rule after verifying its requirement exists.
    ///
    /// Priority defaults to 0 and the active flag to true when omitted.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RequirementNotFound`] when the referenced
    /// requirement is absent, [`StoreError::Conflict`] (wrapped) when the
    /// rule identifier already exists, or another [`EngineError`] when the
    /// store fails.
    pub fn create_validation_rule(
        &self,
        draft: RuleDraft,
        created_by: &AssessorId,
    ) -> Result<ValidationRuleView, EngineError> {
        let requirement = self
            .requirements
            .requirement(&draft.requirement_id)?
            .ok_or_else(|| EngineError::RequirementNotFound(draft.requirement_id.clone()))?;

        let now = self.clock.now();
        let rule = ValidationRule {
            rule_id: draft.rule_id,
            requirement_id: draft.requirement_id,
            asset_type: draft.asset_type,
            rule_name: draft.rule_name,
            rule_description: draft.rule_description,
            logic: draft.logic,
            priority: draft.priority.unwrap_or(0),
            active: draft.active.unwrap_or(true),
            created_by: created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rules.insert_rule(&rule)?;
        Ok(rule_view(rule, Some(&requirement)))
    }

    /// Lists validation rules matching the filter as display views.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when a store query fails.
    pub fn list_validation_rules(
        &self,
        filter: &RuleFilter,
    ) -> Result<Vec<ValidationRuleView>, EngineError> {
        let rules = self.rules.list_rules(filter)?;
        let mut views = Vec::with_capacity(rules.len());
        for rule in rules {
            let requirement = self.requirements.requirement(&rule.requirement_id)?;
            views.push(rule_view(rule, requirement.as_ref()));
        }
        Ok(views)
    }

    /// Loads one validation rule as a display view.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuleNotFound`] when the rule is absent.
    pub fn find_validation_rule(&self, rule_id: &RuleId) -> Result<ValidationRuleView, EngineError> {
        let rule = self
            .rules
            .rule(rule_id)?
            .ok_or_else(|| EngineError::RuleNotFound(rule_id.clone()))?;
        let requirement = self.requirements.requirement(&rule.requirement_id)?;
        Ok(rule_view(rule, requirement.as_ref()))
    }

    /// Applies a partial update to a validation rule.
    ///
    /// Only fields present in the patch are applied; everything else keeps
    /// its stored value. The update timestamp always advances.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuleNotFound`] when the rule is absent or
    /// another [`EngineError`] when the store fails.
    pub fn update_validation_rule(
        &self,
        rule_id: &RuleId,
        patch: RulePatch,
    ) -> Result<ValidationRuleView, EngineError> {
        let mut rule = self
            .rules
            .rule(rule_id)?
            .ok_or_else(|| EngineError::RuleNotFound(rule_id.clone()))?;

        if let Some(rule_name) = patch.rule_name {
            rule.rule_name = rule_name;
        }
        if let Some(rule_description) = patch.rule_description {
            rule.rule_description = rule_description;
        }
        if let Some(logic) = patch.logic {
            rule.logic = logic;
        }
        if let Some(priority) = patch.priority {
            rule.priority = priority;
        }
        if let Some(active) = patch.active {
            rule.active = active;
        }
        rule.updated_at = self.clock.now();

        self.rules.update_rule(&rule)?;
        let requirement = self.requirements.requirement(&rule.requirement_id)?;
        Ok(rule_view(rule, requirement.as_ref()))
    }

    /// Deletes one validation rule.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RuleNotFound`] when no rule was removed.
    pub fn delete_validation_rule(&self, rule_id: &RuleId) -> Result<(), EngineError> {
        if self.rules.delete_rule(rule_id)? {
            Ok(())
        } else {
            Err(EngineError::RuleNotFound(rule_id.clone()))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts the linked framework identifiers from an asset snapshot.
fn linked_framework_ids(asset: &Value) -> Vec<FrameworkId> {
    match asset.get(LINKED_FRAMEWORKS_FIELD) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(FrameworkId::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Builds remediation recommendations for failing rule outcomes.
fn recommendations_for(outcomes: &[RuleOutcome]) -> Vec<String> {
    let mut recommendations = Vec::new();
    for outcome in outcomes {
        match outcome.status {
            ComplianceStatus::NonCompliant => recommendations.push(format!(
                "Fix issue identified by rule: {} - {}",
                outcome.rule_name, outcome.message
            )),
            ComplianceStatus::PartiallyCompliant => recommendations.push(format!(
                "Improve compliance for rule: {} - {}",
                outcome.rule_name, outcome.message
            )),
            _ => {}
        }
    }
    recommendations
}

/// Builds a rule display view, joining requirement title and code.
fn rule_view(
    rule: ValidationRule,
    requirement: Option<&ComplianceRequirement>,
) -> ValidationRuleView {
    ValidationRuleView {
        rule_id: rule.rule_id,
        requirement_id: rule.requirement_id,
        requirement_title: requirement.map(|found| found.title.clone()),
        requirement_code: requirement.map(|found| found.code.clone()),
        asset_type: rule.asset_type,
        rule_name: rule.rule_name,
        rule_description: rule.rule_description,
        logic: rule.logic,
        priority: rule.priority,
        active: rule.active,
        created_by: rule.created_by,
        created_at: rule.created_at.to_rfc3339(),
        updated_at: rule.updated_at.to_rfc3339(),
    }
}

/// Counts mappings holding one status.
fn count_status(mappings: &[AssetRequirementMapping], status: ComplianceStatus) -> usize {
    mappings.iter().filter(|mapping| mapping.status == status).count()
}

/// Rounds a compliant share to a whole percentage, half away from zero.
fn rounded_percentage(compliant: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (compliant * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}

/// Resolves the first non-empty string field among the given keys.
fn display_field(snapshot: Option<&Value>, keys: &[&str], fallback: &str) -> String {
    if let Some(asset) = snapshot {
        for key in keys {
            if let Some(Value::String(text)) = asset.get(key)
                && !text.is_empty()
            {
                return text.clone();
            }
        }
    }
    fallback.to_string()
}

/// Builds the page summary for the compliance list view.
fn page_summary(total: usize, rows: &[AssetComplianceRow]) -> ComplianceListSummary {
    let average = if rows.is_empty() {
        0
    } else {
        let sum: usize = rows.iter().map(|row| usize::from(row.compliance_percentage)).sum();
        let rounded = (sum * 2 + rows.len()) / (rows.len() * 2);
        u8::try_from(rounded).unwrap_or(100)
    };
    ComplianceListSummary {
        total_assets: total,
        compliant_assets: rows
            .iter()
            .filter(|row| row.overall_status == ComplianceStatus::Compliant)
            .count(),
        non_compliant_assets: rows
            .iter()
            .filter(|row| row.overall_status == ComplianceStatus::NonCompliant)
            .count(),
        partially_compliant_assets: rows
            .iter()
            .filter(|row| row.overall_status == ComplianceStatus::PartiallyCompliant)
            .count(),
        average_compliance_percentage: average,
    }
}
