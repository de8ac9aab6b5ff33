// crates/comply-core/tests/assessment_flow_unit.rs
// ============================================================================
// Module: Assessment Flow Unit Tests
// Description: Engine orchestration tests over in-memory backends.
// Purpose: Validate recording semantics, aggregation, bulk runs, and CRUD.
// ============================================================================

//! ## Overview
//! End-to-end engine flows: mapping upsert + history append semantics,
//! status aggregation and percentage rounding, gap reporting, bulk
//! collect-and-continue behavior, rule administration, and the paginated
//! compliance list.

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

use comply_core::AssessmentType;
use comply_core::AssessorId;
use comply_core::AssetId;
use comply_core::AssetRequirementMapping;
use comply_core::AssetType;
use comply_core::ComplianceAssessment;
use comply_core::ComplianceListFilter;
use comply_core::ComplianceRequirement;
use comply_core::ComplianceStatus;
use comply_core::Criterion;
use comply_core::FrameworkId;
use comply_core::Operator;
use comply_core::PageRequest;
use comply_core::RequirementId;
use comply_core::RuleDraft;
use comply_core::RuleFilter;
use comply_core::RuleId;
use comply_core::RulePatch;
use comply_core::Timestamp;
use comply_core::ValidationLogic;
use comply_core::interfaces::AssessmentStore;
use comply_core::runtime::AssessmentEngine;
use comply_core::runtime::EngineError;
use comply_core::runtime::FixedClock;
use comply_core::runtime::InMemoryAssessmentStore;
use comply_core::runtime::InMemoryAssetDirectory;
use comply_core::runtime::InMemoryRequirementDirectory;
use comply_core::runtime::InMemoryRuleStore;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Harness
// ============================================================================

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// In-memory collaborators wired into one engine per test.
struct Harness {
    assets: InMemoryAssetDirectory,
    clock: FixedClock,
    requirements: InMemoryRequirementDirectory,
    rules: InMemoryRuleStore,
    store: InMemoryAssessmentStore,
}

type HarnessEngine<'h> = AssessmentEngine<
    &'h InMemoryAssetDirectory,
    &'h FixedClock,
    &'h InMemoryRequirementDirectory,
    &'h InMemoryRuleStore,
    &'h InMemoryAssessmentStore,
>;

impl Harness {
    fn new() -> Self {
        Self {
            assets: InMemoryAssetDirectory::new(),
            clock: FixedClock::at(Timestamp::from_unix_millis(1_700_000_000_000)),
            requirements: InMemoryRequirementDirectory::new(),
            rules: InMemoryRuleStore::new(),
            store: InMemoryAssessmentStore::new(),
        }
    }

    fn engine(&self) -> HarnessEngine<'_> {
        AssessmentEngine::new(
            &self.assets,
            &self.clock,
            &self.requirements,
            &self.rules,
            &self.store,
        )
    }

    fn seed_requirement(&self, requirement_id: &str, framework_id: &str, title: &str) -> TestResult {
        self.requirements.insert(ComplianceRequirement {
            requirement_id: RequirementId::new(requirement_id),
            framework_id: FrameworkId::new(framework_id),
            code: format!("C-{requirement_id}"),
            title: title.to_string(),
            description: None,
        })?;
        Ok(())
    }

    fn seed_asset(&self, asset_type: AssetType, asset_id: &str, snapshot: Value) -> TestResult {
        self.assets.insert(asset_type, AssetId::new(asset_id), snapshot)?;
        Ok(())
    }

    fn seed_rule(
        &self,
        rule_id: &str,
        requirement_id: &str,
        asset_type: AssetType,
        logic: ValidationLogic,
        priority: i32,
    ) -> TestResult {
        let engine = self.engine();
        engine.create_validation_rule(
            RuleDraft {
                rule_id: RuleId::new(rule_id),
                requirement_id: RequirementId::new(requirement_id),
                asset_type,
                rule_name: format!("rule {rule_id}"),
                rule_description: None,
                logic,
                priority: Some(priority),
                active: None,
            },
            &AssessorId::new("seeder"),
        )?;
        Ok(())
    }
}

fn criterion(field: &str, operator: Operator, value: Value) -> Criterion {
    Criterion {
        field: field.to_string(),
        operator,
        value,
    }
}

fn compliance_when(field: &str, value: Value) -> ValidationLogic {
    ValidationLogic {
        compliance_criteria: vec![criterion(field, Operator::Equals, value)],
        ..ValidationLogic::default()
    }
}

fn non_compliance_when(field: &str, value: Value) -> ValidationLogic {
    ValidationLogic {
        compliance_criteria: vec![criterion(field, Operator::NotExists, Value::Null)],
        non_compliance_criteria: vec![criterion(field, Operator::Equals, value)],
        ..ValidationLogic::default()
    }
}

// ============================================================================
// SECTION: Assessment Recording
// ============================================================================

#[test]
fn compliant_assessment_records_mapping_and_history() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Data classification")?;
    harness.seed_asset(
        AssetType::Information,
        "asset-1",
        json!({"criticality_level": "low", "compliance_requirements": ["fw-1"]}),
    )?;
    harness.seed_rule(
        "rule-1",
        "req-1",
        AssetType::Information,
        compliance_when("criticality_level", json!("low")),
        0,
    )?;

    let engine = harness.engine();
    let result = engine.assess_asset_requirement(
        AssetType::Information,
        &AssetId::new("asset-1"),
        &RequirementId::new("req-1"),
        Some(&AssessorId::new("auditor")),
    )?;

    assert_eq!(result.status, ComplianceStatus::Compliant);
    assert_eq!(result.requirement_title, "Data classification");
    assert_eq!(result.assessment_type, AssessmentType::Automatic);
    assert_eq!(result.rule_results.len(), 1);
    assert!(result.rule_results[0].applicable);
    assert_eq!(result.rule_results[0].status, ComplianceStatus::Compliant);
    assert!(result.recommendations.is_empty());

    let mapping = harness
        .store
        .mapping(AssetType::Information, &AssetId::new("asset-1"), &RequirementId::new("req-1"))?
        .ok_or("mapping missing")?;
    assert_eq!(mapping.status, ComplianceStatus::Compliant);
    assert!(mapping.auto_assessed);
    assert_eq!(mapping.assessed_by, Some(AssessorId::new("auditor")));

    let gaps =
        engine.compliance_gaps(AssetType::Information, &AssetId::new("asset-1"))?;
    assert!(gaps.is_empty());
    Ok(())
}

#[test]
fn reassessment_upserts_mapping_and_appends_history() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Backups")?;
    harness.seed_asset(AssetType::Physical, "srv-1", json!({"backup": "daily"}))?;
    harness.seed_rule(
        "rule-1",
        "req-1",
        AssetType::Physical,
        compliance_when("backup", json!("daily")),
        0,
    )?;

    let engine = harness.engine();
    let asset_id = AssetId::new("srv-1");
    let requirement_id = RequirementId::new("req-1");

    engine.assess_asset_requirement(AssetType::Physical, &asset_id, &requirement_id, None)?;
    harness.clock.advance_millis(60_000);
    engine.assess_asset_requirement(AssetType::Physical, &asset_id, &requirement_id, None)?;

    assert_eq!(harness.store.mapping_count()?, 1);
    let history: Vec<ComplianceAssessment> =
        harness.store.assessments_for(AssetType::Physical, &asset_id, &requirement_id)?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].previous_status, ComplianceStatus::NotAssessed);
    assert_eq!(history[0].new_status, ComplianceStatus::Compliant);
    assert_eq!(history[1].previous_status, ComplianceStatus::Compliant);
    assert_eq!(history[1].new_status, ComplianceStatus::Compliant);
    Ok(())
}

#[test]
fn missing_requirement_writes_nothing() -> TestResult {
    let harness = Harness::new();
    harness.seed_asset(AssetType::Software, "pkg-1", json!({"version": "1.0"}))?;

    let engine = harness.engine();
    let error = engine
        .assess_asset_requirement(
            AssetType::Software,
            &AssetId::new("pkg-1"),
            &RequirementId::new("nonexistent-requirement-id"),
            None,
        )
        .err()
        .ok_or("expected missing requirement error")?;
    assert!(matches!(error, EngineError::RequirementNotFound(_)));

    assert_eq!(harness.store.mapping_count()?, 0);
    let history = harness.store.assessments_for(
        AssetType::Software,
        &AssetId::new("pkg-1"),
        &RequirementId::new("nonexistent-requirement-id"),
    )?;
    assert!(history.is_empty());
    Ok(())
}

#[test]
fn missing_asset_surfaces_not_found() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Anything")?;

    let engine = harness.engine();
    let error = engine
        .assess_asset_requirement(
            AssetType::Supplier,
            &AssetId::new("ghost"),
            &RequirementId::new("req-1"),
            None,
        )
        .err()
        .ok_or("expected asset lookup error")?;
    assert!(matches!(error, EngineError::Asset(_)));
    Ok(())
}

#[test]
fn reassessment_preserves_evidence_and_notes() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Evidence handling")?;
    harness.seed_asset(AssetType::Information, "asset-1", json!({"ok": true}))?;
    harness.seed_rule(
        "rule-1",
        "req-1",
        AssetType::Information,
        compliance_when("ok", json!(true)),
        0,
    )?;

    // Seed a mapping carrying assessor evidence before the automatic run.
    let seeded = AssetRequirementMapping {
        asset_type: AssetType::Information,
        asset_id: AssetId::new("asset-1"),
        requirement_id: RequirementId::new("req-1"),
        status: ComplianceStatus::RequiresReview,
        last_assessed_at: Timestamp::from_unix_millis(0),
        assessed_by: None,
        evidence_urls: vec!["https://evidence.example/scan-1".to_string()],
        notes: Some("manual review pending".to_string()),
        auto_assessed: false,
    };
    let seeded_history = ComplianceAssessment {
        asset_type: AssetType::Information,
        asset_id: AssetId::new("asset-1"),
        requirement_id: RequirementId::new("req-1"),
        assessment_type: AssessmentType::Manual,
        previous_status: ComplianceStatus::NotAssessed,
        new_status: ComplianceStatus::RequiresReview,
        rule_results: Vec::new(),
        assessed_by: None,
        assessed_at: Timestamp::from_unix_millis(0),
        notes: None,
    };
    harness.store.record_outcome(&seeded, &seeded_history)?;

    let engine = harness.engine();
    engine.assess_asset_requirement(
        AssetType::Information,
        &AssetId::new("asset-1"),
        &RequirementId::new("req-1"),
        None,
    )?;

    let mapping = harness
        .store
        .mapping(AssetType::Information, &AssetId::new("asset-1"), &RequirementId::new("req-1"))?
        .ok_or("mapping missing")?;
    assert_eq!(mapping.status, ComplianceStatus::Compliant);
    assert_eq!(mapping.evidence_urls, vec!["https://evidence.example/scan-1".to_string()]);
    assert_eq!(mapping.notes.as_deref(), Some("manual review pending"));
    assert!(mapping.auto_assessed);
    Ok(())
}

#[test]
fn rules_evaluate_in_priority_order() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Ordering")?;
    harness.seed_asset(AssetType::Application, "app-1", json!({}))?;
    harness.seed_rule(
        "rule-low",
        "req-1",
        AssetType::Application,
        ValidationLogic::default(),
        1,
    )?;
    harness.seed_rule(
        "rule-high",
        "req-1",
        AssetType::Application,
        ValidationLogic::default(),
        10,
    )?;

    let engine = harness.engine();
    let result = engine.assess_asset_requirement(
        AssetType::Application,
        &AssetId::new("app-1"),
        &RequirementId::new("req-1"),
        None,
    )?;
    assert_eq!(result.rule_results.len(), 2);
    assert_eq!(result.rule_results[0].rule_id, RuleId::new("rule-high"));
    assert_eq!(result.rule_results[1].rule_id, RuleId::new("rule-low"));
    Ok(())
}

// ============================================================================
// SECTION: Asset-Level Assessment
// ============================================================================

#[test]
fn assess_asset_without_frameworks_is_empty() -> TestResult {
    let harness = Harness::new();
    harness.seed_asset(AssetType::Physical, "srv-1", json!({"name": "rack server"}))?;

    let engine = harness.engine();
    let results = engine.assess_asset(AssetType::Physical, &AssetId::new("srv-1"), None)?;
    assert!(results.is_empty());
    Ok(())
}

#[test]
fn assess_asset_covers_every_linked_requirement() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "First")?;
    harness.seed_requirement("req-2", "fw-1", "Second")?;
    harness.seed_requirement("req-3", "fw-other", "Elsewhere")?;
    harness.seed_asset(
        AssetType::Information,
        "asset-1",
        json!({"ok": true, "compliance_requirements": ["fw-1"]}),
    )?;

    let engine = harness.engine();
    let results = engine.assess_asset(AssetType::Information, &AssetId::new("asset-1"), None)?;
    assert_eq!(results.len(), 2);
    // No active rules exist, so every pair reduces to not-applicable.
    assert!(results.iter().all(|result| result.status == ComplianceStatus::NotApplicable));
    Ok(())
}

#[test]
fn bulk_assess_collects_failures_and_continues() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Bulk")?;
    harness.seed_asset(
        AssetType::Physical,
        "ok-id",
        json!({"ok": true, "compliance_requirements": ["fw-1"]}),
    )?;
    harness.seed_rule(
        "rule-1",
        "req-1",
        AssetType::Physical,
        compliance_when("ok", json!(true)),
        0,
    )?;

    let engine = harness.engine();
    let outcome = engine.bulk_assess(
        AssetType::Physical,
        &[AssetId::new("ok-id"), AssetId::new("missing-id")],
        None,
    );

    assert_eq!(outcome.total_assessed, 2);
    assert_eq!(outcome.successful, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("missing-id"));
    assert_eq!(outcome.results.len(), 1);
    Ok(())
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

#[test]
fn compliance_percentage_rounds_half_up() -> TestResult {
    let harness = Harness::new();
    harness.seed_asset(
        AssetType::Information,
        "asset-1",
        json!({"ok": true, "compliance_requirements": ["fw-1"]}),
    )?;
    for index in 1..=7 {
        let requirement_id = format!("req-{index}");
        harness.seed_requirement(&requirement_id, "fw-1", "Requirement")?;
        let logic = if index <= 3 {
            compliance_when("ok", json!(true))
        } else {
            non_compliance_when("ok", json!(true))
        };
        harness.seed_rule(
            &format!("rule-{index}"),
            &requirement_id,
            AssetType::Information,
            logic,
            0,
        )?;
    }

    let engine = harness.engine();
    engine.assess_asset(AssetType::Information, &AssetId::new("asset-1"), None)?;

    let status =
        engine.asset_compliance_status(AssetType::Information, &AssetId::new("asset-1"))?;
    assert_eq!(status.total_requirements, 7);
    assert_eq!(status.compliant_count, 3);
    assert_eq!(status.non_compliant_count, 4);
    assert_eq!(status.overall_compliance_percentage, 43);
    assert_eq!(status.requirements.len(), 7);
    Ok(())
}

#[test]
fn empty_status_report_has_zero_percentage() -> TestResult {
    let harness = Harness::new();
    let engine = harness.engine();
    let status = engine.asset_compliance_status(AssetType::Supplier, &AssetId::new("none"))?;
    assert_eq!(status.total_requirements, 0);
    assert_eq!(status.overall_compliance_percentage, 0);
    assert!(status.requirements.is_empty());
    Ok(())
}

#[test]
fn gaps_surface_failing_rules_and_recommendations() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Encryption at rest")?;
    harness.seed_asset(
        AssetType::Information,
        "asset-1",
        json!({"encrypted": false, "compliance_requirements": ["fw-1"]}),
    )?;
    harness.seed_rule(
        "rule-1",
        "req-1",
        AssetType::Information,
        ValidationLogic {
            compliance_criteria: vec![criterion("encrypted", Operator::Equals, json!(true))],
            non_compliance_criteria: vec![criterion("encrypted", Operator::Equals, json!(false))],
            ..ValidationLogic::default()
        },
        0,
    )?;

    let engine = harness.engine();
    engine.assess_asset(AssetType::Information, &AssetId::new("asset-1"), None)?;

    let gaps = engine.compliance_gaps(AssetType::Information, &AssetId::new("asset-1"))?;
    assert_eq!(gaps.len(), 1);
    let gap = &gaps[0];
    assert_eq!(gap.current_status, ComplianceStatus::NonCompliant);
    assert_eq!(gap.requirement_title, "Encryption at rest");
    assert_eq!(gap.gap_description, "Asset does not meet requirements for Encryption at rest");
    assert!(gap.missing_fields.is_empty());
    assert_eq!(gap.failed_rules.len(), 1);
    assert_eq!(gap.recommendations.len(), 1);
    assert!(gap.recommendations[0].starts_with("Fix issue identified by rule:"));
    Ok(())
}

#[test]
fn compliance_list_groups_filters_and_paginates() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Listing")?;
    for index in 1..=3 {
        let asset_id = format!("srv-{index}");
        harness.seed_asset(
            AssetType::Physical,
            &asset_id,
            json!({
                "name": format!("server {index}"),
                "unique_identifier": format!("SRV-{index}"),
                "criticality_level": "high",
                "department": "it",
                "ok": index != 2,
                "compliance_requirements": ["fw-1"],
            }),
        )?;
    }
    harness.seed_rule(
        "rule-1",
        "req-1",
        AssetType::Physical,
        ValidationLogic {
            compliance_criteria: vec![criterion("ok", Operator::Equals, json!(true))],
            non_compliance_criteria: vec![criterion("ok", Operator::Equals, json!(false))],
            ..ValidationLogic::default()
        },
        0,
    )?;

    let engine = harness.engine();
    for index in 1..=3 {
        engine.assess_asset(AssetType::Physical, &AssetId::new(format!("srv-{index}")), None)?;
    }

    let list = engine.asset_compliance_list(
        &ComplianceListFilter::default(),
        PageRequest {
            page: 1,
            page_size: 2,
        },
    )?;
    assert_eq!(list.total, 3);
    assert_eq!(list.total_pages, 2);
    assert_eq!(list.assets.len(), 2);
    assert_eq!(list.summary.total_assets, 3);
    assert_eq!(list.assets[0].asset_name, "server 1");
    assert_eq!(list.assets[0].asset_identifier, "SRV-1");
    assert_eq!(list.assets[0].business_unit, "it");
    assert_eq!(list.assets[0].overall_status, ComplianceStatus::Compliant);
    assert_eq!(list.assets[1].overall_status, ComplianceStatus::NonCompliant);

    let filtered = engine.asset_compliance_list(
        &ComplianceListFilter {
            asset_type: Some(AssetType::Physical),
            status: Some(ComplianceStatus::NonCompliant),
        },
        PageRequest::default(),
    )?;
    assert_eq!(filtered.total, 1);
    assert_eq!(filtered.assets[0].asset_id, AssetId::new("srv-2"));
    assert_eq!(filtered.assets[0].compliance_percentage, 0);
    Ok(())
}

// ============================================================================
// SECTION: Rule Administration
// ============================================================================

#[test]
fn create_rejects_unknown_requirement_and_duplicate_id() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "CRUD")?;

    let engine = harness.engine();
    let draft = RuleDraft {
        rule_id: RuleId::new("rule-1"),
        requirement_id: RequirementId::new("req-missing"),
        asset_type: AssetType::Software,
        rule_name: "orphan".to_string(),
        rule_description: None,
        logic: ValidationLogic::default(),
        priority: None,
        active: None,
    };
    let error = engine
        .create_validation_rule(draft.clone(), &AssessorId::new("admin"))
        .err()
        .ok_or("expected missing requirement")?;
    assert!(matches!(error, EngineError::RequirementNotFound(_)));

    let good = RuleDraft {
        requirement_id: RequirementId::new("req-1"),
        ..draft
    };
    let view = engine.create_validation_rule(good.clone(), &AssessorId::new("admin"))?;
    assert_eq!(view.priority, 0);
    assert!(view.active);
    assert_eq!(view.requirement_title.as_deref(), Some("CRUD"));

    let error = engine
        .create_validation_rule(good, &AssessorId::new("admin"))
        .err()
        .ok_or("expected conflict")?;
    assert!(matches!(error, EngineError::Store(_)));
    Ok(())
}

#[test]
fn update_applies_only_provided_fields() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Patching")?;
    harness.seed_rule("rule-1", "req-1", AssetType::Software, ValidationLogic::default(), 5)?;

    let engine = harness.engine();
    harness.clock.advance_millis(1_000);
    let view = engine.update_validation_rule(
        &RuleId::new("rule-1"),
        RulePatch {
            rule_name: Some("renamed".to_string()),
            active: Some(false),
            ..RulePatch::default()
        },
    )?;
    assert_eq!(view.rule_name, "renamed");
    assert!(!view.active);
    assert_eq!(view.priority, 5);
    assert_ne!(view.created_at, view.updated_at);

    let error = engine
        .update_validation_rule(&RuleId::new("rule-ghost"), RulePatch::default())
        .err()
        .ok_or("expected missing rule")?;
    assert!(matches!(error, EngineError::RuleNotFound(_)));
    Ok(())
}

#[test]
fn inactive_rules_are_excluded_from_assessment() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Active flag")?;
    harness.seed_asset(AssetType::Software, "pkg-1", json!({"ok": true}))?;
    harness.seed_rule(
        "rule-1",
        "req-1",
        AssetType::Software,
        compliance_when("ok", json!(true)),
        0,
    )?;

    let engine = harness.engine();
    engine.update_validation_rule(
        &RuleId::new("rule-1"),
        RulePatch {
            active: Some(false),
            ..RulePatch::default()
        },
    )?;
    let result = engine.assess_asset_requirement(
        AssetType::Software,
        &AssetId::new("pkg-1"),
        &RequirementId::new("req-1"),
        None,
    )?;
    assert!(result.rule_results.is_empty());
    assert_eq!(result.status, ComplianceStatus::NotApplicable);
    Ok(())
}

#[test]
fn list_filters_by_requirement_and_asset_type() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "One")?;
    harness.seed_requirement("req-2", "fw-1", "Two")?;
    harness.seed_rule("rule-a", "req-1", AssetType::Software, ValidationLogic::default(), 1)?;
    harness.seed_rule("rule-b", "req-1", AssetType::Physical, ValidationLogic::default(), 2)?;
    harness.seed_rule("rule-c", "req-2", AssetType::Software, ValidationLogic::default(), 3)?;

    let engine = harness.engine();
    let all = engine.list_validation_rules(&RuleFilter::default())?;
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].rule_id, RuleId::new("rule-c"));

    let software_only = engine.list_validation_rules(&RuleFilter {
        asset_type: Some(AssetType::Software),
        ..RuleFilter::default()
    })?;
    assert_eq!(software_only.len(), 2);

    let req_one = engine.list_validation_rules(&RuleFilter {
        requirement_id: Some(RequirementId::new("req-1")),
        ..RuleFilter::default()
    })?;
    assert_eq!(req_one.len(), 2);
    assert_eq!(req_one[0].rule_id, RuleId::new("rule-b"));
    Ok(())
}

#[test]
fn delete_reports_missing_rules() -> TestResult {
    let harness = Harness::new();
    harness.seed_requirement("req-1", "fw-1", "Deletion")?;
    harness.seed_rule("rule-1", "req-1", AssetType::Supplier, ValidationLogic::default(), 0)?;

    let engine = harness.engine();
    engine.delete_validation_rule(&RuleId::new("rule-1"))?;
    let error = engine
        .delete_validation_rule(&RuleId::new("rule-1"))
        .err()
        .ok_or("expected missing rule")?;
    assert!(matches!(error, EngineError::RuleNotFound(_)));
    Ok(())
}
