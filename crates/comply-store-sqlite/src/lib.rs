// crates/comply-store-sqlite/src/lib.rs
// ============================================================================
// Module: Comply SQLite Store
// Description: Durable compliance store backed by SQLite.
// Purpose: Persist rules, requirements, mappings, and assessment history.
// Dependencies: comply-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Durable implementations of the Comply store interfaces over one `SQLite`
//! database file. The mapping upsert and history append commit in a single
//! transaction; loads validate the stored schema version and fail closed on
//! unparseable rows.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod store;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use store::SqliteComplianceStore;
pub use store::SqliteJournalMode;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
