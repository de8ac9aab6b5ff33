// crates/comply-core/src/runtime/fieldpath.rs
// ============================================================================
// Module: Comply Field Path Resolution
// Description: Safe-navigation dot-path lookup over asset snapshots.
// Purpose: Resolve criterion field paths without panics or type errors.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Criterion field paths are dot-separated strings resolved against untyped
//! asset snapshots. Resolution short-circuits to "absent" as soon as any
//! intermediate value is missing, null, or not a container; it never fails.
//! A present-but-null leaf is reported as present, which matters for
//! equality semantics against an expected null.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Resolves a dot-separated field path against an asset snapshot.
///
/// Objects are traversed by key; arrays are traversed by decimal index.
/// Returns `None` when any step cannot be taken.
#[must_use]
pub fn field_value<'asset>(asset: &'asset Value, field_path: &str) -> Option<&'asset Value> {
    let mut current = asset;
    for segment in field_path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}
