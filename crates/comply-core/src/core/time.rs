// crates/comply-core/src/core/time.rs
// ============================================================================
// Module: Comply Time Model
// Description: Canonical timestamp representation for mappings and history.
// Purpose: Provide deterministic, replayable time values across Comply records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Comply records carry explicit unix-millisecond timestamps supplied by the
//! host through the clock interface. The core engine never reads wall-clock
//! time directly, which keeps assessments deterministic under test clocks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Comply mappings and assessment history.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn unix_millis(self) -> i64 {
        self.0
    }

    /// Renders the timestamp as an RFC 3339 string.
    ///
    /// Out-of-range values fall back to the unix epoch rendering rather than
    /// failing; report fields must always carry a well-formed time string.
    #[must_use]
    pub fn to_rfc3339(self) -> String {
        let nanos = i128::from(self.0) * 1_000_000;
        let datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        datetime
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
    }
}
