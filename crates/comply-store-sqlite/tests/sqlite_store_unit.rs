// crates/comply-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Store Integrity Unit Tests
// Description: Targeted integrity tests for the SQLite compliance store.
// Purpose: Validate path safety, schema versioning, transactional outcome
//          recording, ordering guarantees, and conflict detection.
// ============================================================================

//! ## Overview
//! Unit-level tests for `SQLite` store integrity invariants:
//! - Path safety checks (component/directory rejection)
//! - Schema version validation on reopen
//! - Atomic mapping-upsert + history-append commits
//! - Priority-descending rule order and active-flag filtering
//! - Conflict detection for duplicate rule identifiers

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

use std::path::Path;

use comply_core::AssessmentStore;
use comply_core::AssessmentType;
use comply_core::AssessorId;
use comply_core::AssetId;
use comply_core::AssetRequirementMapping;
use comply_core::AssetType;
use comply_core::ComplianceAssessment;
use comply_core::ComplianceListFilter;
use comply_core::ComplianceRequirement;
use comply_core::ComplianceStatus;
use comply_core::FrameworkId;
use comply_core::RequirementDirectory;
use comply_core::RequirementId;
use comply_core::RuleFilter;
use comply_core::RuleId;
use comply_core::RuleStore;
use comply_core::StoreError;
use comply_core::Timestamp;
use comply_core::ValidationLogic;
use comply_core::ValidationRule;
use comply_store_sqlite::SqliteComplianceStore;
use comply_store_sqlite::SqliteStoreConfig;
use comply_store_sqlite::SqliteStoreError;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn store_for(path: &Path) -> Result<SqliteComplianceStore, SqliteStoreError> {
    SqliteComplianceStore::new(&SqliteStoreConfig::for_path(path.to_path_buf()))
}

fn sample_rule(rule_id: &str, priority: i32, active: bool) -> ValidationRule {
    ValidationRule {
        rule_id: RuleId::new(rule_id),
        requirement_id: RequirementId::new("req-1"),
        asset_type: AssetType::Information,
        rule_name: format!("rule {rule_id}"),
        rule_description: None,
        logic: ValidationLogic::default(),
        priority,
        active,
        created_by: AssessorId::new("admin"),
        created_at: Timestamp::from_unix_millis(1_000),
        updated_at: Timestamp::from_unix_millis(1_000),
    }
}

fn sample_mapping(status: ComplianceStatus, assessed_at: i64) -> AssetRequirementMapping {
    AssetRequirementMapping {
        asset_type: AssetType::Information,
        asset_id: AssetId::new("asset-1"),
        requirement_id: RequirementId::new("req-1"),
        status,
        last_assessed_at: Timestamp::from_unix_millis(assessed_at),
        assessed_by: None,
        evidence_urls: Vec::new(),
        notes: None,
        auto_assessed: true,
    }
}

fn sample_assessment(
    previous: ComplianceStatus,
    new: ComplianceStatus,
    assessed_at: i64,
) -> ComplianceAssessment {
    ComplianceAssessment {
        asset_type: AssetType::Information,
        asset_id: AssetId::new("asset-1"),
        requirement_id: RequirementId::new("req-1"),
        assessment_type: AssessmentType::Automatic,
        previous_status: previous,
        new_status: new,
        rule_results: Vec::new(),
        assessed_by: None,
        assessed_at: Timestamp::from_unix_millis(assessed_at),
        notes: None,
    }
}

// ============================================================================
// SECTION: Path and Schema Validation
// ============================================================================

#[test]
fn rejects_directory_paths() -> TestResult {
    let dir = TempDir::new()?;
    let result = store_for(dir.path());
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
    Ok(())
}

#[test]
fn rejects_oversized_path_components() {
    let long_component = "a".repeat(300);
    let result = store_for(Path::new(&long_component));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn reopen_preserves_schema_and_data() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("comply.db");
    {
        let store = store_for(&path)?;
        store.put_requirement(&ComplianceRequirement {
            requirement_id: RequirementId::new("req-1"),
            framework_id: FrameworkId::new("fw-1"),
            code: "A.1".to_string(),
            title: "Reopen".to_string(),
            description: None,
        })?;
    }
    let store = store_for(&path)?;
    let requirement = store.requirement(&RequirementId::new("req-1"))?;
    assert_eq!(requirement.map(|found| found.title), Some("Reopen".to_string()));
    Ok(())
}

#[test]
fn rejects_unsupported_schema_versions() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("comply.db");
    drop(store_for(&path)?);

    let connection = Connection::open(&path)?;
    connection.execute("UPDATE store_meta SET version = ?1", params![99_i64])?;
    drop(connection);

    let result = store_for(&path);
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
    Ok(())
}

// ============================================================================
// SECTION: Rule Store
// ============================================================================

#[test]
fn active_rules_order_by_priority_and_skip_inactive() -> TestResult {
    let dir = TempDir::new()?;
    let store = store_for(&dir.path().join("comply.db"))?;
    store.insert_rule(&sample_rule("rule-low", 1, true))?;
    store.insert_rule(&sample_rule("rule-off", 100, false))?;
    store.insert_rule(&sample_rule("rule-high", 10, true))?;

    let rules = store.active_rules(&RequirementId::new("req-1"), AssetType::Information)?;
    let ids: Vec<&str> = rules.iter().map(|rule| rule.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["rule-high", "rule-low"]);
    Ok(())
}

#[test]
fn duplicate_rule_ids_conflict() -> TestResult {
    let dir = TempDir::new()?;
    let store = store_for(&dir.path().join("comply.db"))?;
    store.insert_rule(&sample_rule("rule-1", 0, true))?;
    let result = store.insert_rule(&sample_rule("rule-1", 5, true));
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    Ok(())
}

#[test]
fn rule_round_trips_logic_and_flags() -> TestResult {
    let dir = TempDir::new()?;
    let store = store_for(&dir.path().join("comply.db"))?;
    let mut rule = sample_rule("rule-1", 7, true);
    rule.logic = serde_json::from_value(serde_json::json!({
        "conditions": [{"field": "criticality_level", "operator": "equals", "value": "high"}],
        "compliance_criteria": [{"field": "owner", "operator": "exists"}],
    }))?;
    rule.rule_description = Some("ownership must be assigned".to_string());
    store.insert_rule(&rule)?;

    let loaded = store.rule(&RuleId::new("rule-1"))?.ok_or("rule missing")?;
    assert_eq!(loaded, rule);
    Ok(())
}

#[test]
fn update_and_delete_report_missing_rules() -> TestResult {
    let dir = TempDir::new()?;
    let store = store_for(&dir.path().join("comply.db"))?;
    let rule = sample_rule("rule-1", 0, true);
    let result = store.update_rule(&rule);
    assert!(matches!(result, Err(StoreError::Invalid(_))));

    store.insert_rule(&rule)?;
    let mut updated = rule;
    updated.rule_name = "renamed".to_string();
    store.update_rule(&updated)?;
    let loaded = store.rule(&RuleId::new("rule-1"))?.ok_or("rule missing")?;
    assert_eq!(loaded.rule_name, "renamed");

    assert!(store.delete_rule(&RuleId::new("rule-1"))?);
    assert!(!store.delete_rule(&RuleId::new("rule-1"))?);
    Ok(())
}

#[test]
fn list_rules_applies_filters() -> TestResult {
    let dir = TempDir::new()?;
    let store = store_for(&dir.path().join("comply.db"))?;
    store.insert_rule(&sample_rule("rule-info", 1, true))?;
    let mut physical = sample_rule("rule-phys", 2, true);
    physical.asset_type = AssetType::Physical;
    store.insert_rule(&physical)?;

    let all = store.list_rules(&RuleFilter::default())?;
    assert_eq!(all.len(), 2);

    let filtered = store.list_rules(&RuleFilter {
        asset_type: Some(AssetType::Physical),
        ..RuleFilter::default()
    })?;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].rule_id, RuleId::new("rule-phys"));
    Ok(())
}

// ============================================================================
// SECTION: Requirement Directory
// ============================================================================

#[test]
fn requirements_resolve_by_framework_list() -> TestResult {
    let dir = TempDir::new()?;
    let store = store_for(&dir.path().join("comply.db"))?;
    for (requirement_id, framework_id) in
        [("req-1", "fw-1"), ("req-2", "fw-1"), ("req-3", "fw-2"), ("req-4", "fw-3")]
    {
        store.put_requirement(&ComplianceRequirement {
            requirement_id: RequirementId::new(requirement_id),
            framework_id: FrameworkId::new(framework_id),
            code: requirement_id.to_uppercase(),
            title: format!("title {requirement_id}"),
            description: None,
        })?;
    }

    let none = store.requirements_for_frameworks(&[])?;
    assert!(none.is_empty());

    let matching = store
        .requirements_for_frameworks(&[FrameworkId::new("fw-1"), FrameworkId::new("fw-3")])?;
    let ids: Vec<&str> =
        matching.iter().map(|requirement| requirement.requirement_id.as_str()).collect();
    assert_eq!(ids, vec!["req-1", "req-2", "req-4"]);
    Ok(())
}

// ============================================================================
// SECTION: Outcome Recording
// ============================================================================

#[test]
fn record_outcome_upserts_mapping_and_appends_history() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("comply.db");
    let store = store_for(&path)?;

    store.record_outcome(
        &sample_mapping(ComplianceStatus::Compliant, 1_000),
        &sample_assessment(ComplianceStatus::NotAssessed, ComplianceStatus::Compliant, 1_000),
    )?;
    store.record_outcome(
        &sample_mapping(ComplianceStatus::NonCompliant, 2_000),
        &sample_assessment(ComplianceStatus::Compliant, ComplianceStatus::NonCompliant, 2_000),
    )?;

    let mappings = store.mappings_matching(&ComplianceListFilter::default())?;
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].status, ComplianceStatus::NonCompliant);

    let connection = Connection::open(&path)?;
    let history_rows: i64 = connection.query_row(
        "SELECT COUNT(*) FROM compliance_assessments",
        params![],
        |row| row.get(0),
    )?;
    assert_eq!(history_rows, 2);

    let latest = store
        .latest_assessment(
            AssetType::Information,
            &AssetId::new("asset-1"),
            &RequirementId::new("req-1"),
        )?
        .ok_or("latest assessment missing")?;
    assert_eq!(latest.new_status, ComplianceStatus::NonCompliant);
    assert_eq!(latest.previous_status, ComplianceStatus::Compliant);
    Ok(())
}

#[test]
fn record_outcome_is_atomic_when_history_insert_fails() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("comply.db");
    let store = store_for(&path)?;

    // Break the history table behind the store's back; the mapping upsert
    // must roll back together with the failed append.
    let connection = Connection::open(&path)?;
    connection.execute_batch("ALTER TABLE compliance_assessments RENAME TO broken;")?;
    drop(connection);

    let result = store.record_outcome(
        &sample_mapping(ComplianceStatus::Compliant, 1_000),
        &sample_assessment(ComplianceStatus::NotAssessed, ComplianceStatus::Compliant, 1_000),
    );
    assert!(result.is_err());

    let mapping = store.mapping(
        AssetType::Information,
        &AssetId::new("asset-1"),
        &RequirementId::new("req-1"),
    )?;
    assert!(mapping.is_none());
    Ok(())
}

#[test]
fn latest_assessment_breaks_timestamp_ties_by_insertion() -> TestResult {
    let dir = TempDir::new()?;
    let store = store_for(&dir.path().join("comply.db"))?;

    store.record_outcome(
        &sample_mapping(ComplianceStatus::Compliant, 1_000),
        &sample_assessment(ComplianceStatus::NotAssessed, ComplianceStatus::Compliant, 1_000),
    )?;
    store.record_outcome(
        &sample_mapping(ComplianceStatus::RequiresReview, 1_000),
        &sample_assessment(ComplianceStatus::Compliant, ComplianceStatus::RequiresReview, 1_000),
    )?;

    let latest = store
        .latest_assessment(
            AssetType::Information,
            &AssetId::new("asset-1"),
            &RequirementId::new("req-1"),
        )?
        .ok_or("latest assessment missing")?;
    assert_eq!(latest.new_status, ComplianceStatus::RequiresReview);
    Ok(())
}

#[test]
fn mappings_matching_filters_by_type_and_status() -> TestResult {
    let dir = TempDir::new()?;
    let store = store_for(&dir.path().join("comply.db"))?;

    store.record_outcome(
        &sample_mapping(ComplianceStatus::Compliant, 1_000),
        &sample_assessment(ComplianceStatus::NotAssessed, ComplianceStatus::Compliant, 1_000),
    )?;
    let mut physical = sample_mapping(ComplianceStatus::NonCompliant, 1_500);
    physical.asset_type = AssetType::Physical;
    physical.asset_id = AssetId::new("srv-1");
    let mut physical_history =
        sample_assessment(ComplianceStatus::NotAssessed, ComplianceStatus::NonCompliant, 1_500);
    physical_history.asset_type = AssetType::Physical;
    physical_history.asset_id = AssetId::new("srv-1");
    store.record_outcome(&physical, &physical_history)?;

    let non_compliant = store.mappings_matching(&ComplianceListFilter {
        asset_type: None,
        status: Some(ComplianceStatus::NonCompliant),
    })?;
    assert_eq!(non_compliant.len(), 1);
    assert_eq!(non_compliant[0].asset_id, AssetId::new("srv-1"));

    let information = store.mappings_matching(&ComplianceListFilter {
        asset_type: Some(AssetType::Information),
        status: None,
    })?;
    assert_eq!(information.len(), 1);
    assert_eq!(information[0].status, ComplianceStatus::Compliant);
    Ok(())
}
