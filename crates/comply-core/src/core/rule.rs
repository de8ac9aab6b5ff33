// crates/comply-core/src/core/rule.rs
// ============================================================================
// Module: Comply Validation Rules
// Description: Stored, data-driven predicate bundles and their criteria.
// Purpose: Describe how one requirement is checked against one asset type.
// Dependencies: crate::core::{identifiers, status, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! Validation rules are authored data, not code: each rule carries four
//! criterion lists that gate applicability and classify compliance. Rule
//! documents loaded from storage are untrusted; unknown operator labels
//! deserialize to [`Operator::Unrecognized`] and fail closed at evaluation
//! instead of aborting an assessment run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::AssessorId;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::RuleId;
use crate::core::status::AssetType;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Comparison operator applied by one criterion.
///
/// # Invariants
/// - Variants are stable for serialization and rule authoring.
/// - Labels persisted under removed or misspelled operators deserialize to
///   [`Self::Unrecognized`] and evaluate to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Field value equals the expected value (numeric comparison by value).
    Equals,
    /// Field value differs from the expected value.
    NotEquals,
    /// Field value is an array containing the expected value.
    Contains,
    /// Field value is numerically greater than the expected value.
    GreaterThan,
    /// Field value is numerically less than the expected value.
    LessThan,
    /// Expected value is an array containing the field value.
    In,
    /// Expected value is an array not containing the field value.
    NotIn,
    /// Field value is present, non-null, and not the empty string.
    Exists,
    /// Field value is absent, null, or the empty string.
    NotExists,
    /// Fallback for operator labels this build does not know.
    Unrecognized,
}

impl Operator {
    /// Returns the stable wire label for the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl<'de> Deserialize<'de> for Operator {
    /// Deserializes an operator label, mapping unknown labels to
    /// [`Operator::Unrecognized`] so stored rules never fail to load.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(match label.as_str() {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "contains" => Self::Contains,
            "greater_than" => Self::GreaterThan,
            "less_than" => Self::LessThan,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "exists" => Self::Exists,
            "not_exists" => Self::NotExists,
            _ => Self::Unrecognized,
        })
    }
}

// ============================================================================
// SECTION: Criteria
// ============================================================================

/// One field/operator/value predicate evaluated against an asset snapshot.
///
/// # Invariants
/// - `field` is a dot-separated path resolved with safe navigation.
/// - `value` defaults to JSON null for presence-only operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Dot-separated field path into the asset snapshot.
    pub field: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Expected value compared against the resolved field.
    #[serde(default)]
    pub value: Value,
}

/// Layered criterion lists describing one rule's validation logic.
///
/// # Invariants
/// - Lists combine with AND only; an empty list is vacuously true.
/// - Evaluation order is conditions, compliance, non-compliance, partial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationLogic {
    /// Applicability gate; the rule does not apply when unmet.
    #[serde(default)]
    pub conditions: Vec<Criterion>,
    /// Criteria that classify the asset as compliant.
    #[serde(default)]
    pub compliance_criteria: Vec<Criterion>,
    /// Criteria that classify the asset as non-compliant.
    #[serde(default)]
    pub non_compliance_criteria: Vec<Criterion>,
    /// Criteria that classify the asset as partially compliant.
    #[serde(default)]
    pub partial_compliance_criteria: Vec<Criterion>,
}

// ============================================================================
// SECTION: Validation Rules
// ============================================================================

/// Stored validation rule attached to one requirement and asset type.
///
/// # Invariants
/// - `rule_id` is unique within the rule store.
/// - Higher `priority` rules are evaluated first; ties keep store order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Rule identifier.
    pub rule_id: RuleId,
    /// Requirement this rule checks.
    pub requirement_id: RequirementId,
    /// Asset type this rule applies to.
    pub asset_type: AssetType,
    /// Human-readable rule name.
    pub rule_name: String,
    /// Optional rule description.
    pub rule_description: Option<String>,
    /// Layered validation logic document.
    pub logic: ValidationLogic,
    /// Evaluation priority; higher values run first.
    pub priority: i32,
    /// Whether the rule participates in assessments.
    pub active: bool,
    /// Assessor that created the rule.
    pub created_by: AssessorId,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last-update timestamp.
    pub updated_at: Timestamp,
}

/// Input for creating a validation rule.
///
/// # Invariants
/// - `rule_id` is caller-assigned; duplicates are rejected by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDraft {
    /// Identifier for the new rule.
    pub rule_id: RuleId,
    /// Requirement the rule checks.
    pub requirement_id: RequirementId,
    /// Asset type the rule applies to.
    pub asset_type: AssetType,
    /// Human-readable rule name.
    pub rule_name: String,
    /// Optional rule description.
    #[serde(default)]
    pub rule_description: Option<String>,
    /// Layered validation logic document.
    pub logic: ValidationLogic,
    /// Evaluation priority; defaults to 0 when omitted.
    #[serde(default)]
    pub priority: Option<i32>,
    /// Active flag; defaults to true when omitted.
    #[serde(default)]
    pub active: Option<bool>,
}

/// Partial update for a validation rule; only provided fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulePatch {
    /// Replacement rule name.
    #[serde(default)]
    pub rule_name: Option<String>,
    /// Replacement rule description.
    #[serde(default)]
    pub rule_description: Option<Option<String>>,
    /// Replacement validation logic document.
    #[serde(default)]
    pub logic: Option<ValidationLogic>,
    /// Replacement priority.
    #[serde(default)]
    pub priority: Option<i32>,
    /// Replacement active flag.
    #[serde(default)]
    pub active: Option<bool>,
}
