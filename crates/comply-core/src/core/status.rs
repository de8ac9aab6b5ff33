// crates/comply-core/src/core/status.rs
// ============================================================================
// Module: Comply Status Model
// Description: Asset types, compliance statuses, and assessment kinds.
// Purpose: Provide the closed enumerations shared by rules, records, and reports.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Closed enumerations with stable snake_case wire forms. Parsing from
//! strings happens only at host boundaries (CLI arguments, query filters);
//! unrecognized labels fail with typed errors rather than being guessed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Asset Types
// ============================================================================

/// Kind of tracked asset a rule or mapping applies to.
///
/// # Invariants
/// - Variants are stable for serialization and store matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// Physical device or facility asset.
    Physical,
    /// Information or data asset.
    Information,
    /// Business application asset.
    Application,
    /// Software package asset.
    Software,
    /// Third-party supplier asset.
    Supplier,
}

impl AssetType {
    /// Returns the stable wire label for the asset type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Information => "information",
            Self::Application => "application",
            Self::Software => "software",
            Self::Supplier => "supplier",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when an asset type label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown asset type: {label}")]
pub struct ParseAssetTypeError {
    /// Label that failed to parse.
    pub label: String,
}

impl FromStr for AssetType {
    type Err = ParseAssetTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "physical" => Ok(Self::Physical),
            "information" => Ok(Self::Information),
            "application" => Ok(Self::Application),
            "software" => Ok(Self::Software),
            "supplier" => Ok(Self::Supplier),
            other => Err(ParseAssetTypeError {
                label: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Compliance Status
// ============================================================================

/// Compliance status for one asset/requirement pair or rule outcome.
///
/// # Invariants
/// - Variants are stable for serialization and store matching.
/// - Reduction precedence is defined by the runtime reducer, not by variant order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// No assessment has been recorded yet.
    NotAssessed,
    /// All applicable criteria are met.
    Compliant,
    /// At least one non-compliance signal was detected.
    NonCompliant,
    /// Partial compliance criteria were met.
    PartiallyCompliant,
    /// No rule applied to the asset.
    NotApplicable,
    /// Automatic evaluation could not classify the asset.
    RequiresReview,
}

impl ComplianceStatus {
    /// Returns the stable wire label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAssessed => "not_assessed",
            Self::Compliant => "compliant",
            Self::NonCompliant => "non_compliant",
            Self::PartiallyCompliant => "partially_compliant",
            Self::NotApplicable => "not_applicable",
            Self::RequiresReview => "requires_review",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a compliance status label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown compliance status: {label}")]
pub struct ParseComplianceStatusError {
    /// Label that failed to parse.
    pub label: String,
}

impl FromStr for ComplianceStatus {
    type Err = ParseComplianceStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "not_assessed" => Ok(Self::NotAssessed),
            "compliant" => Ok(Self::Compliant),
            "non_compliant" => Ok(Self::NonCompliant),
            "partially_compliant" => Ok(Self::PartiallyCompliant),
            "not_applicable" => Ok(Self::NotApplicable),
            "requires_review" => Ok(Self::RequiresReview),
            other => Err(ParseComplianceStatusError {
                label: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// SECTION: Assessment Types
// ============================================================================

/// Origin of an assessment run.
///
/// # Invariants
/// - Variants are stable for serialization and store matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    /// Produced by the rule evaluation engine.
    Automatic,
    /// Recorded by a human assessor.
    Manual,
    /// Produced by a scheduled assessment run.
    Scheduled,
}

impl AssessmentType {
    /// Returns the stable wire label for the assessment type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
