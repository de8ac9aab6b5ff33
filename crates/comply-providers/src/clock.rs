// crates/comply-providers/src/clock.rs
// ============================================================================
// Module: System Clock
// Description: Wall-clock time source for production hosts.
// Purpose: Supply unix-millisecond timestamps to the assessment engine.
// Dependencies: comply-core
// ============================================================================

//! ## Overview
//! The engine core never reads wall-clock time; production hosts install
//! this clock. Clock skew before the unix epoch saturates to zero rather
//! than failing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use comply_core::Clock;
use comply_core::Timestamp;

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Wall-clock time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        let millis = i64::try_from(now.as_millis()).unwrap_or(i64::MAX);
        Timestamp::from_unix_millis(millis)
    }
}
