// crates/comply-core/src/runtime/memory.rs
// ============================================================================
// Module: Comply In-Memory Backends
// Description: In-memory implementations of the interface traits.
// Purpose: Provide deterministic backends for tests and embedding hosts.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! These backends keep everything behind mutexes in plain collections.
//! They implement the same ordering and atomicity contracts as durable
//! stores: active rules sort by priority descending with insertion order
//! as the tie-break, and `record_outcome` applies both writes under one
//! lock. A poisoned lock surfaces as a store error rather than a panic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use serde_json::Value;

use crate::core::identifiers::AssetId;
use crate::core::identifiers::FrameworkId;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::RuleId;
use crate::core::record::AssetRequirementMapping;
use crate::core::record::ComplianceAssessment;
use crate::core::record::ComplianceRequirement;
use crate::core::rule::ValidationRule;
use crate::core::status::AssetType;
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

// ============================================================================
// SECTION: Lock Helpers
// ============================================================================

/// Locks a mutex, converting poisoning into a store error.
fn lock_store<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Store("poisoned lock".to_string()))
}

// ============================================================================
// SECTION: Asset Directory
// ============================================================================

/// In-memory asset directory holding snapshots per type and identifier.
#[derive(Debug, Default)]
pub struct InMemoryAssetDirectory {
    /// Snapshots keyed by asset type and identifier.
    assets: Mutex<BTreeMap<(AssetType, AssetId), Value>>,
}

impl InMemoryAssetDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one asset snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError`] when the directory lock is poisoned.
    pub fn insert(
        &self,
        asset_type: AssetType,
        asset_id: AssetId,
        snapshot: Value,
    ) -> Result<(), DirectoryError> {
        let mut assets = self
            .assets
            .lock()
            .map_err(|_| DirectoryError::Io("poisoned lock".to_string()))?;
        assets.insert((asset_type, asset_id), snapshot);
        Ok(())
    }
}

impl AssetDirectory for InMemoryAssetDirectory {
    fn fetch(&self, asset_type: AssetType, asset_id: &AssetId) -> Result<Value, DirectoryError> {
        let assets = self
            .assets
            .lock()
            .map_err(|_| DirectoryError::Io("poisoned lock".to_string()))?;
        assets
            .get(&(asset_type, asset_id.clone()))
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound {
                asset_type,
                asset_id: asset_id.clone(),
            })
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Deterministic clock returning a settable timestamp.
#[derive(Debug, Default)]
pub struct FixedClock {
    /// Current unix-millisecond value.
    millis: AtomicI64,
}

impl FixedClock {
    /// Creates a clock pinned to the given timestamp.
    #[must_use]
    pub fn at(timestamp: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(timestamp.unix_millis()),
        }
    }

    /// Replaces the current timestamp.
    pub fn set(&self, timestamp: Timestamp) {
        self.millis.store(timestamp.unix_millis(), Ordering::SeqCst);
    }

    /// Advances the clock by the given number of milliseconds.
    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_unix_millis(self.millis.load(Ordering::SeqCst))
    }
}

// ============================================================================
// SECTION: Rule Store
// ============================================================================

/// In-memory rule store preserving insertion order for tie-breaks.
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    /// Stored rules in insertion order.
    rules: Mutex<Vec<ValidationRule>>,
}

impl InMemoryRuleStore {
    /// Creates an empty rule store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleStore for InMemoryRuleStore {
    fn active_rules(
        &self,
        requirement_id: &RequirementId,
        asset_type: AssetType,
    ) -> Result<Vec<ValidationRule>, StoreError> {
        let rules = lock_store(&self.rules)?;
        let mut matching: Vec<ValidationRule> = rules
            .iter()
            .filter(|rule| {
                rule.active
                    && rule.requirement_id == *requirement_id
                    && rule.asset_type == asset_type
            })
            .cloned()
            .collect();
        matching.sort_by_key(|rule| std::cmp::Reverse(rule.priority));
        Ok(matching)
    }

    fn insert_rule(&self, rule: &ValidationRule) -> Result<(), StoreError> {
        let mut rules = lock_store(&self.rules)?;
        if rules.iter().any(|stored| stored.rule_id == rule.rule_id) {
            return Err(StoreError::Conflict(format!(
                "validation rule already exists: {}",
                rule.rule_id
            )));
        }
        rules.push(rule.clone());
        Ok(())
    }

    fn list_rules(&self, filter: &RuleFilter) -> Result<Vec<ValidationRule>, StoreError> {
        let rules = lock_store(&self.rules)?;
        let mut matching: Vec<ValidationRule> = rules
            .iter()
            .filter(|rule| {
                filter
                    .requirement_id
                    .as_ref()
                    .is_none_or(|requirement_id| rule.requirement_id == *requirement_id)
                    && filter.asset_type.is_none_or(|asset_type| rule.asset_type == asset_type)
            })
            .cloned()
            .collect();
        matching.sort_by_key(|rule| (std::cmp::Reverse(rule.priority), std::cmp::Reverse(rule.created_at)));
        Ok(matching)
    }

    fn rule(&self, rule_id: &RuleId) -> Result<Option<ValidationRule>, StoreError> {
        let rules = lock_store(&self.rules)?;
        Ok(rules.iter().find(|rule| rule.rule_id == *rule_id).cloned())
    }

    fn update_rule(&self, rule: &ValidationRule) -> Result<(), StoreError> {
        let mut rules = lock_store(&self.rules)?;
        let Some(stored) = rules.iter_mut().find(|stored| stored.rule_id == rule.rule_id) else {
            return Err(StoreError::Invalid(format!("no such validation rule: {}", rule.rule_id)));
        };
        *stored = rule.clone();
        Ok(())
    }

    fn delete_rule(&self, rule_id: &RuleId) -> Result<bool, StoreError> {
        let mut rules = lock_store(&self.rules)?;
        let before = rules.len();
        rules.retain(|rule| rule.rule_id != *rule_id);
        Ok(rules.len() < before)
    }
}

// ============================================================================
// SECTION: Requirement Directory
// ============================================================================

/// In-memory requirement directory.
#[derive(Debug, Default)]
pub struct InMemoryRequirementDirectory {
    /// Requirements keyed by identifier.
    requirements: Mutex<BTreeMap<RequirementId, ComplianceRequirement>>,
}

impl InMemoryRequirementDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one requirement.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the directory lock is poisoned.
    pub fn insert(&self, requirement: ComplianceRequirement) -> Result<(), StoreError> {
        let mut requirements = lock_store(&self.requirements)?;
        requirements.insert(requirement.requirement_id.clone(), requirement);
        Ok(())
    }
}

impl RequirementDirectory for InMemoryRequirementDirectory {
    fn requirement(
        &self,
        requirement_id: &RequirementId,
    ) -> Result<Option<ComplianceRequirement>, StoreError> {
        let requirements = lock_store(&self.requirements)?;
        Ok(requirements.get(requirement_id).cloned())
    }

    fn requirements_for_frameworks(
        &self,
        framework_ids: &[FrameworkId],
    ) -> Result<Vec<ComplianceRequirement>, StoreError> {
        let requirements = lock_store(&self.requirements)?;
        Ok(requirements
            .values()
            .filter(|requirement| framework_ids.contains(&requirement.framework_id))
            .cloned()
            .collect())
    }
}

// ============================================================================
// SECTION: Assessment Store
// ============================================================================

/// Mutable state shared by the in-memory assessment store.
#[derive(Debug, Default)]
struct AssessmentState {
    /// Current-state mappings keyed by the asset/requirement triple.
    mappings: BTreeMap<(AssetType, AssetId, RequirementId), AssetRequirementMapping>,
    /// Append-only assessment history in insertion order.
    assessments: Vec<ComplianceAssessment>,
}

/// In-memory mapping and history store.
///
/// # Invariants
/// - `record_outcome` applies both writes under one lock.
/// - History is append-only; mappings are upserted in place.
#[derive(Debug, Default)]
pub struct InMemoryAssessmentStore {
    /// Shared mutable state.
    state: Mutex<AssessmentState>,
}

impl InMemoryAssessmentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all assessment records for one asset/requirement pair in
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn assessments_for(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Vec<ComplianceAssessment>, StoreError> {
        let state = lock_store(&self.state)?;
        Ok(state
            .assessments
            .iter()
            .filter(|assessment| {
                assessment.asset_type == asset_type
                    && assessment.asset_id == *asset_id
                    && assessment.requirement_id == *requirement_id
            })
            .cloned()
            .collect())
    }

    /// Returns the total number of stored mappings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn mapping_count(&self) -> Result<usize, StoreError> {
        let state = lock_store(&self.state)?;
        Ok(state.mappings.len())
    }
}

impl AssessmentStore for InMemoryAssessmentStore {
    fn mapping(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Option<AssetRequirementMapping>, StoreError> {
        let state = lock_store(&self.state)?;
        Ok(state
            .mappings
            .get(&(asset_type, asset_id.clone(), requirement_id.clone()))
            .cloned())
    }

    fn mappings_for_asset(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
    ) -> Result<Vec<AssetRequirementMapping>, StoreError> {
        let state = lock_store(&self.state)?;
        Ok(state
            .mappings
            .values()
            .filter(|mapping| {
                mapping.asset_type == asset_type && mapping.asset_id == *asset_id
            })
            .cloned()
            .collect())
    }

    fn mappings_matching(
        &self,
        filter: &ComplianceListFilter,
    ) -> Result<Vec<AssetRequirementMapping>, StoreError> {
        let state = lock_store(&self.state)?;
        Ok(state
            .mappings
            .values()
            .filter(|mapping| {
                filter.asset_type.is_none_or(|asset_type| mapping.asset_type == asset_type)
                    && filter.status.is_none_or(|status| mapping.status == status)
            })
            .cloned()
            .collect())
    }

    fn latest_assessment(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Option<ComplianceAssessment>, StoreError> {
        let state = lock_store(&self.state)?;
        Ok(state
            .assessments
            .iter()
            .enumerate()
            .filter(|(_, assessment)| {
                assessment.asset_type == asset_type
                    && assessment.asset_id == *asset_id
                    && assessment.requirement_id == *requirement_id
            })
            .max_by_key(|(index, assessment)| (assessment.assessed_at, *index))
            .map(|(_, assessment)| assessment.clone()))
    }

    fn record_outcome(
        &self,
        mapping: &AssetRequirementMapping,
        assessment: &ComplianceAssessment,
    ) -> Result<(), StoreError> {
        let mut state = lock_store(&self.state)?;
        state.mappings.insert(
            (mapping.asset_type, mapping.asset_id.clone(), mapping.requirement_id.clone()),
            mapping.clone(),
        );
        state.assessments.push(assessment.clone());
        Ok(())
    }
}
