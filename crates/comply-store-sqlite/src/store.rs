// crates/comply-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Compliance Store
// Description: Durable store for rules, requirements, mappings, and history.
// Purpose: Persist compliance state with transactional outcome recording.
// Dependencies: comply-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements the Comply store interfaces over one `SQLite`
//! database file. Schema versions are validated on open and mismatches fail
//! closed. The mapping upsert and the history append run inside a single
//! transaction so a crash can never leave one write without the other.
//! Database contents are untrusted; rows that fail to parse surface as
//! corruption errors instead of panicking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

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
use comply_core::RuleOutcome;
use comply_core::RuleStore;
use comply_core::StoreError;
use comply_core::Timestamp;
use comply_core::ValidationLogic;
use comply_core::ValidationRule;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Column list shared by every validation rule query.
const RULE_COLUMNS: &str = "rule_id, requirement_id, asset_type, rule_name, rule_description, \
                            logic_json, priority, active, created_by, created_at, updated_at";

/// Column list shared by every mapping query.
const MAPPING_COLUMNS: &str = "asset_type, asset_id, requirement_id, status, last_assessed_at, \
                               assessed_by, evidence_urls_json, notes, auto_assessed";

/// Column list shared by every assessment query.
const ASSESSMENT_COLUMNS: &str = "asset_type, asset_id, requirement_id, assessment_type, \
                                  previous_status, new_status, rule_results_json, assessed_by, \
                                  assessed_at, notes";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` compliance store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config with default pragmas for the given path.
    #[must_use]
    pub fn for_path(path: PathBuf) -> Self {
        Self {
            path,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw rule documents or outcome payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or unparseable row.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Write conflicts with an existing row.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
        }
    }
}

/// Converts a `rusqlite` error into a store error.
fn db_error(error: &rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(error.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed compliance store.
///
/// # Invariants
/// - Connection access is serialized through a mutex.
/// - `record_outcome` commits both writes in one transaction.
#[derive(Clone)]
pub struct SqliteComplianceStore {
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteComplianceStore {
    /// Opens or creates the store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid, the database
    /// cannot be opened, or the stored schema version is unsupported.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("poisoned connection lock".to_string()))
    }

    /// Inserts or replaces one requirement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn put_requirement(
        &self,
        requirement: &ComplianceRequirement,
    ) -> Result<(), SqliteStoreError> {
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT INTO requirements (requirement_id, framework_id, code, title, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (requirement_id) DO UPDATE SET
                     framework_id = excluded.framework_id,
                     code = excluded.code,
                     title = excluded.title,
                     description = excluded.description",
                params![
                    requirement.requirement_id.as_str(),
                    requirement.framework_id.as_str(),
                    requirement.code,
                    requirement.title,
                    requirement.description,
                ],
            )
            .map_err(|err| db_error(&err))?;
        Ok(())
    }

    /// Lists all stored requirements ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn list_requirements(&self) -> Result<Vec<ComplianceRequirement>, SqliteStoreError> {
        let connection = self.lock()?;
        let mut statement = connection
            .prepare(
                "SELECT requirement_id, framework_id, code, title, description
                 FROM requirements ORDER BY requirement_id ASC",
            )
            .map_err(|err| db_error(&err))?;
        let rows = statement
            .query_map(params![], |row| {
                Ok(ComplianceRequirement {
                    requirement_id: RequirementId::new(row.get::<_, String>(0)?),
                    framework_id: FrameworkId::new(row.get::<_, String>(1)?),
                    code: row.get(2)?,
                    title: row.get(3)?,
                    description: row.get(4)?,
                })
            })
            .map_err(|err| db_error(&err))?;
        let mut requirements = Vec::new();
        for row in rows {
            requirements.push(row.map_err(|err| db_error(&err))?);
        }
        Ok(requirements)
    }
}

// ============================================================================
// SECTION: Raw Rows
// ============================================================================

/// Raw validation rule row before enum and document parsing.
struct RawRule {
    /// Rule identifier column.
    rule_id: String,
    /// Requirement identifier column.
    requirement_id: String,
    /// Asset type label column.
    asset_type: String,
    /// Rule name column.
    rule_name: String,
    /// Rule description column.
    rule_description: Option<String>,
    /// Serialized validation logic column.
    logic_json: String,
    /// Priority column.
    priority: i32,
    /// Active flag column.
    active: bool,
    /// Creator column.
    created_by: String,
    /// Creation timestamp column.
    created_at: i64,
    /// Update timestamp column.
    updated_at: i64,
}

impl RawRule {
    /// Extracts a raw rule from one query row.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            rule_id: row.get(0)?,
            requirement_id: row.get(1)?,
            asset_type: row.get(2)?,
            rule_name: row.get(3)?,
            rule_description: row.get(4)?,
            logic_json: row.get(5)?,
            priority: row.get(6)?,
            active: row.get(7)?,
            created_by: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    /// Parses the raw row into a validation rule.
    fn into_rule(self) -> Result<ValidationRule, SqliteStoreError> {
        let asset_type = parse_asset_type(&self.asset_type)?;
        let logic: ValidationLogic = serde_json::from_str(&self.logic_json).map_err(|err| {
            SqliteStoreError::Corrupt(format!(
                "unparseable validation logic for rule {}: {err}",
                self.rule_id
            ))
        })?;
        Ok(ValidationRule {
            rule_id: RuleId::new(self.rule_id),
            requirement_id: RequirementId::new(self.requirement_id),
            asset_type,
            rule_name: self.rule_name,
            rule_description: self.rule_description,
            logic,
            priority: self.priority,
            active: self.active,
            created_by: AssessorId::new(self.created_by),
            created_at: Timestamp::from_unix_millis(self.created_at),
            updated_at: Timestamp::from_unix_millis(self.updated_at),
        })
    }
}

/// Raw mapping row before enum and document parsing.
struct RawMapping {
    /// Asset type label column.
    asset_type: String,
    /// Asset identifier column.
    asset_id: String,
    /// Requirement identifier column.
    requirement_id: String,
    /// Status label column.
    status: String,
    /// Last-assessed timestamp column.
    last_assessed_at: i64,
    /// Assessor column.
    assessed_by: Option<String>,
    /// Serialized evidence URL list column.
    evidence_urls_json: String,
    /// Notes column.
    notes: Option<String>,
    /// Auto-assessed flag column.
    auto_assessed: bool,
}

impl RawMapping {
    /// Extracts a raw mapping from one query row.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            asset_type: row.get(0)?,
            asset_id: row.get(1)?,
            requirement_id: row.get(2)?,
            status: row.get(3)?,
            last_assessed_at: row.get(4)?,
            assessed_by: row.get(5)?,
            evidence_urls_json: row.get(6)?,
            notes: row.get(7)?,
            auto_assessed: row.get(8)?,
        })
    }

    /// Parses the raw row into a mapping.
    fn into_mapping(self) -> Result<AssetRequirementMapping, SqliteStoreError> {
        let asset_type = parse_asset_type(&self.asset_type)?;
        let status = parse_status(&self.status)?;
        let evidence_urls: Vec<String> =
            serde_json::from_str(&self.evidence_urls_json).map_err(|err| {
                SqliteStoreError::Corrupt(format!("unparseable evidence url list: {err}"))
            })?;
        Ok(AssetRequirementMapping {
            asset_type,
            asset_id: AssetId::new(self.asset_id),
            requirement_id: RequirementId::new(self.requirement_id),
            status,
            last_assessed_at: Timestamp::from_unix_millis(self.last_assessed_at),
            assessed_by: self.assessed_by.map(AssessorId::new),
            evidence_urls,
            notes: self.notes,
            auto_assessed: self.auto_assessed,
        })
    }
}

/// Raw assessment row before enum and document parsing.
struct RawAssessment {
    /// Asset type label column.
    asset_type: String,
    /// Asset identifier column.
    asset_id: String,
    /// Requirement identifier column.
    requirement_id: String,
    /// Assessment type label column.
    assessment_type: String,
    /// Previous status label column.
    previous_status: String,
    /// New status label column.
    new_status: String,
    /// Serialized rule outcome list column.
    rule_results_json: String,
    /// Assessor column.
    assessed_by: Option<String>,
    /// Assessment timestamp column.
    assessed_at: i64,
    /// Notes column.
    notes: Option<String>,
}

impl RawAssessment {
    /// Extracts a raw assessment from one query row.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            asset_type: row.get(0)?,
            asset_id: row.get(1)?,
            requirement_id: row.get(2)?,
            assessment_type: row.get(3)?,
            previous_status: row.get(4)?,
            new_status: row.get(5)?,
            rule_results_json: row.get(6)?,
            assessed_by: row.get(7)?,
            assessed_at: row.get(8)?,
            notes: row.get(9)?,
        })
    }

    /// Parses the raw row into an assessment record.
    fn into_assessment(self) -> Result<ComplianceAssessment, SqliteStoreError> {
        let asset_type = parse_asset_type(&self.asset_type)?;
        let assessment_type = parse_assessment_type(&self.assessment_type)?;
        let previous_status = parse_status(&self.previous_status)?;
        let new_status = parse_status(&self.new_status)?;
        let rule_results: Vec<RuleOutcome> = serde_json::from_str(&self.rule_results_json)
            .map_err(|err| {
                SqliteStoreError::Corrupt(format!("unparseable rule outcome list: {err}"))
            })?;
        Ok(ComplianceAssessment {
            asset_type,
            asset_id: AssetId::new(self.asset_id),
            requirement_id: RequirementId::new(self.requirement_id),
            assessment_type,
            previous_status,
            new_status,
            rule_results,
            assessed_by: self.assessed_by.map(AssessorId::new),
            assessed_at: Timestamp::from_unix_millis(self.assessed_at),
            notes: self.notes,
        })
    }
}

// ============================================================================
// SECTION: Rule Store
// ============================================================================

impl RuleStore for SqliteComplianceStore {
    fn active_rules(
        &self,
        requirement_id: &RequirementId,
        asset_type: AssetType,
    ) -> Result<Vec<ValidationRule>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let sql = format!(
            "SELECT {RULE_COLUMNS} FROM validation_rules
             WHERE requirement_id = ?1 AND asset_type = ?2 AND active = 1
             ORDER BY priority DESC, rowid ASC"
        );
        let mut statement =
            connection.prepare(&sql).map_err(|err| StoreError::from(db_error(&err)))?;
        let rows = statement
            .query_map(params![requirement_id.as_str(), asset_type.as_str()], RawRule::from_row)
            .map_err(|err| StoreError::from(db_error(&err)))?;
        collect_rules(rows)
    }

    fn insert_rule(&self, rule: &ValidationRule) -> Result<(), StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let logic_json = serialize_logic(&rule.logic)?;
        connection
            .execute(
                "INSERT INTO validation_rules (rule_id, requirement_id, asset_type, rule_name, \
                 rule_description, logic_json, priority, active, created_by, created_at, \
                 updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    rule.rule_id.as_str(),
                    rule.requirement_id.as_str(),
                    rule.asset_type.as_str(),
                    rule.rule_name,
                    rule.rule_description,
                    logic_json,
                    rule.priority,
                    rule.active,
                    rule.created_by.as_str(),
                    rule.created_at.unix_millis(),
                    rule.updated_at.unix_millis(),
                ],
            )
            .map_err(|err| StoreError::from(insert_conflict(&rule.rule_id, &err)))?;
        Ok(())
    }

    fn list_rules(&self, filter: &RuleFilter) -> Result<Vec<ValidationRule>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let mut sql = format!("SELECT {RULE_COLUMNS} FROM validation_rules");
        let mut clauses: Vec<&str> = Vec::new();
        let mut bindings: Vec<String> = Vec::new();
        if let Some(requirement_id) = &filter.requirement_id {
            clauses.push("requirement_id = ?");
            bindings.push(requirement_id.to_string());
        }
        if let Some(asset_type) = filter.asset_type {
            clauses.push("asset_type = ?");
            bindings.push(asset_type.as_str().to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY priority DESC, created_at DESC");

        let mut statement =
            connection.prepare(&sql).map_err(|err| StoreError::from(db_error(&err)))?;
        let rows = statement
            .query_map(params_from_iter(bindings.iter()), RawRule::from_row)
            .map_err(|err| StoreError::from(db_error(&err)))?;
        collect_rules(rows)
    }

    fn rule(&self, rule_id: &RuleId) -> Result<Option<ValidationRule>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let sql = format!("SELECT {RULE_COLUMNS} FROM validation_rules WHERE rule_id = ?1");
        let raw = connection
            .query_row(&sql, params![rule_id.as_str()], RawRule::from_row)
            .optional()
            .map_err(|err| StoreError::from(db_error(&err)))?;
        raw.map(|row| row.into_rule().map_err(StoreError::from)).transpose()
    }

    fn update_rule(&self, rule: &ValidationRule) -> Result<(), StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let logic_json = serialize_logic(&rule.logic)?;
        let updated = connection
            .execute(
                "UPDATE validation_rules SET requirement_id = ?2, asset_type = ?3, \
                 rule_name = ?4, rule_description = ?5, logic_json = ?6, priority = ?7, \
                 active = ?8, updated_at = ?9
                 WHERE rule_id = ?1",
                params![
                    rule.rule_id.as_str(),
                    rule.requirement_id.as_str(),
                    rule.asset_type.as_str(),
                    rule.rule_name,
                    rule.rule_description,
                    logic_json,
                    rule.priority,
                    rule.active,
                    rule.updated_at.unix_millis(),
                ],
            )
            .map_err(|err| StoreError::from(db_error(&err)))?;
        if updated == 0 {
            return Err(StoreError::Invalid(format!("no such validation rule: {}", rule.rule_id)));
        }
        Ok(())
    }

    fn delete_rule(&self, rule_id: &RuleId) -> Result<bool, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let deleted = connection
            .execute("DELETE FROM validation_rules WHERE rule_id = ?1", params![rule_id.as_str()])
            .map_err(|err| StoreError::from(db_error(&err)))?;
        Ok(deleted > 0)
    }
}

// ============================================================================
// SECTION: Requirement Directory
// ============================================================================

impl RequirementDirectory for SqliteComplianceStore {
    fn requirement(
        &self,
        requirement_id: &RequirementId,
    ) -> Result<Option<ComplianceRequirement>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        connection
            .query_row(
                "SELECT requirement_id, framework_id, code, title, description
                 FROM requirements WHERE requirement_id = ?1",
                params![requirement_id.as_str()],
                |row| {
                    Ok(ComplianceRequirement {
                        requirement_id: RequirementId::new(row.get::<_, String>(0)?),
                        framework_id: FrameworkId::new(row.get::<_, String>(1)?),
                        code: row.get(2)?,
                        title: row.get(3)?,
                        description: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(|err| StoreError::from(db_error(&err)))
    }

    fn requirements_for_frameworks(
        &self,
        framework_ids: &[FrameworkId],
    ) -> Result<Vec<ComplianceRequirement>, StoreError> {
        if framework_ids.is_empty() {
            return Ok(Vec::new());
        }
        let connection = self.lock().map_err(StoreError::from)?;
        let placeholders = vec!["?"; framework_ids.len()].join(", ");
        let sql = format!(
            "SELECT requirement_id, framework_id, code, title, description
             FROM requirements WHERE framework_id IN ({placeholders})
             ORDER BY requirement_id ASC"
        );
        let mut statement =
            connection.prepare(&sql).map_err(|err| StoreError::from(db_error(&err)))?;
        let rows = statement
            .query_map(
                params_from_iter(framework_ids.iter().map(FrameworkId::as_str)),
                |row| {
                    Ok(ComplianceRequirement {
                        requirement_id: RequirementId::new(row.get::<_, String>(0)?),
                        framework_id: FrameworkId::new(row.get::<_, String>(1)?),
                        code: row.get(2)?,
                        title: row.get(3)?,
                        description: row.get(4)?,
                    })
                },
            )
            .map_err(|err| StoreError::from(db_error(&err)))?;
        let mut requirements = Vec::new();
        for row in rows {
            requirements.push(row.map_err(|err| StoreError::from(db_error(&err)))?);
        }
        Ok(requirements)
    }
}

// ============================================================================
// SECTION: Assessment Store
// ============================================================================

impl AssessmentStore for SqliteComplianceStore {
    fn mapping(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Option<AssetRequirementMapping>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let sql = format!(
            "SELECT {MAPPING_COLUMNS} FROM asset_requirement_mappings
             WHERE asset_type = ?1 AND asset_id = ?2 AND requirement_id = ?3"
        );
        let raw = connection
            .query_row(
                &sql,
                params![asset_type.as_str(), asset_id.as_str(), requirement_id.as_str()],
                RawMapping::from_row,
            )
            .optional()
            .map_err(|err| StoreError::from(db_error(&err)))?;
        raw.map(|row| row.into_mapping().map_err(StoreError::from)).transpose()
    }

    fn mappings_for_asset(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
    ) -> Result<Vec<AssetRequirementMapping>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let sql = format!(
            "SELECT {MAPPING_COLUMNS} FROM asset_requirement_mappings
             WHERE asset_type = ?1 AND asset_id = ?2
             ORDER BY requirement_id ASC"
        );
        let mut statement =
            connection.prepare(&sql).map_err(|err| StoreError::from(db_error(&err)))?;
        let rows = statement
            .query_map(params![asset_type.as_str(), asset_id.as_str()], RawMapping::from_row)
            .map_err(|err| StoreError::from(db_error(&err)))?;
        collect_mappings(rows)
    }

    fn mappings_matching(
        &self,
        filter: &ComplianceListFilter,
    ) -> Result<Vec<AssetRequirementMapping>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let mut sql = format!("SELECT {MAPPING_COLUMNS} FROM asset_requirement_mappings");
        let mut clauses: Vec<&str> = Vec::new();
        let mut bindings: Vec<String> = Vec::new();
        if let Some(asset_type) = filter.asset_type {
            clauses.push("asset_type = ?");
            bindings.push(asset_type.as_str().to_string());
        }
        if let Some(status) = filter.status {
            clauses.push("status = ?");
            bindings.push(status.as_str().to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY asset_type ASC, asset_id ASC, requirement_id ASC");

        let mut statement =
            connection.prepare(&sql).map_err(|err| StoreError::from(db_error(&err)))?;
        let rows = statement
            .query_map(params_from_iter(bindings.iter()), RawMapping::from_row)
            .map_err(|err| StoreError::from(db_error(&err)))?;
        collect_mappings(rows)
    }

    fn latest_assessment(
        &self,
        asset_type: AssetType,
        asset_id: &AssetId,
        requirement_id: &RequirementId,
    ) -> Result<Option<ComplianceAssessment>, StoreError> {
        let connection = self.lock().map_err(StoreError::from)?;
        let sql = format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM compliance_assessments
             WHERE asset_type = ?1 AND asset_id = ?2 AND requirement_id = ?3
             ORDER BY assessed_at DESC, assessment_seq DESC LIMIT 1"
        );
        let raw = connection
            .query_row(
                &sql,
                params![asset_type.as_str(), asset_id.as_str(), requirement_id.as_str()],
                RawAssessment::from_row,
            )
            .optional()
            .map_err(|err| StoreError::from(db_error(&err)))?;
        raw.map(|row| row.into_assessment().map_err(StoreError::from)).transpose()
    }

    fn record_outcome(
        &self,
        mapping: &AssetRequirementMapping,
        assessment: &ComplianceAssessment,
    ) -> Result<(), StoreError> {
        let mut connection = self.lock().map_err(StoreError::from)?;
        let evidence_urls_json = serde_json::to_string(&mapping.evidence_urls)
            .map_err(|err| StoreError::Invalid(format!("unserializable evidence urls: {err}")))?;
        let rule_results_json = serde_json::to_string(&assessment.rule_results)
            .map_err(|err| StoreError::Invalid(format!("unserializable rule outcomes: {err}")))?;

        let tx = connection
            .transaction()
            .map_err(|err| StoreError::from(db_error(&err)))?;
        tx.execute(
            "INSERT INTO asset_requirement_mappings (asset_type, asset_id, requirement_id, \
             status, last_assessed_at, assessed_by, evidence_urls_json, notes, auto_assessed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT (asset_type, asset_id, requirement_id) DO UPDATE SET
                 status = excluded.status,
                 last_assessed_at = excluded.last_assessed_at,
                 assessed_by = excluded.assessed_by,
                 evidence_urls_json = excluded.evidence_urls_json,
                 notes = excluded.notes,
                 auto_assessed = excluded.auto_assessed",
            params![
                mapping.asset_type.as_str(),
                mapping.asset_id.as_str(),
                mapping.requirement_id.as_str(),
                mapping.status.as_str(),
                mapping.last_assessed_at.unix_millis(),
                mapping.assessed_by.as_ref().map(AssessorId::as_str),
                evidence_urls_json,
                mapping.notes,
                mapping.auto_assessed,
            ],
        )
        .map_err(|err| StoreError::from(db_error(&err)))?;
        tx.execute(
            "INSERT INTO compliance_assessments (asset_type, asset_id, requirement_id, \
             assessment_type, previous_status, new_status, rule_results_json, assessed_by, \
             assessed_at, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                assessment.asset_type.as_str(),
                assessment.asset_id.as_str(),
                assessment.requirement_id.as_str(),
                assessment.assessment_type.as_str(),
                assessment.previous_status.as_str(),
                assessment.new_status.as_str(),
                rule_results_json,
                assessment.assessed_by.as_ref().map(AssessorId::as_str),
                assessment.assessed_at.unix_millis(),
                assessment.notes,
            ],
        )
        .map_err(|err| StoreError::from(db_error(&err)))?;
        tx.commit().map_err(|err| StoreError::from(db_error(&err)))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Collection Helpers
// ============================================================================

/// Collects and parses validation rule rows.
fn collect_rules<I>(rows: I) -> Result<Vec<ValidationRule>, StoreError>
where
    I: Iterator<Item = rusqlite::Result<RawRule>>,
{
    let mut rules = Vec::new();
    for row in rows {
        let raw = row.map_err(|err| StoreError::from(db_error(&err)))?;
        rules.push(raw.into_rule().map_err(StoreError::from)?);
    }
    Ok(rules)
}

/// Collects and parses mapping rows.
fn collect_mappings<I>(rows: I) -> Result<Vec<AssetRequirementMapping>, StoreError>
where
    I: Iterator<Item = rusqlite::Result<RawMapping>>,
{
    let mut mappings = Vec::new();
    for row in rows {
        let raw = row.map_err(|err| StoreError::from(db_error(&err)))?;
        mappings.push(raw.into_mapping().map_err(StoreError::from)?);
    }
    Ok(mappings)
}

/// Serializes a validation logic document for storage.
fn serialize_logic(logic: &ValidationLogic) -> Result<String, StoreError> {
    serde_json::to_string(logic)
        .map_err(|err| StoreError::Invalid(format!("unserializable validation logic: {err}")))
}

/// Maps an insert failure to a conflict when the rule id already exists.
fn insert_conflict(rule_id: &RuleId, error: &rusqlite::Error) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = error
        && failure.code == ErrorCode::ConstraintViolation
    {
        return SqliteStoreError::Conflict(format!("validation rule already exists: {rule_id}"));
    }
    db_error(error)
}

// ============================================================================
// SECTION: Label Parsing
// ============================================================================

/// Parses a stored asset type label.
fn parse_asset_type(label: &str) -> Result<AssetType, SqliteStoreError> {
    AssetType::from_str(label)
        .map_err(|_| SqliteStoreError::Corrupt(format!("unsupported asset type: {label}")))
}

/// Parses a stored compliance status label.
fn parse_status(label: &str) -> Result<ComplianceStatus, SqliteStoreError> {
    ComplianceStatus::from_str(label)
        .map_err(|_| SqliteStoreError::Corrupt(format!("unsupported compliance status: {label}")))
}

/// Parses a stored assessment type label.
fn parse_assessment_type(label: &str) -> Result<AssessmentType, SqliteStoreError> {
    match label {
        "automatic" => Ok(AssessmentType::Automatic),
        "manual" => Ok(AssessmentType::Manual),
        "scheduled" => Ok(AssessmentType::Scheduled),
        other => Err(SqliteStoreError::Corrupt(format!("unsupported assessment type: {other}"))),
    }
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Validates the configured database path.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let rendered = path.to_string_lossy();
    if rendered.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid("store path component too long".to_string()));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| db_error(&err))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| db_error(&err))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| db_error(&err))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| db_error(&err))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| db_error(&err))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| db_error(&err))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS requirements (
                    requirement_id TEXT PRIMARY KEY,
                    framework_id TEXT NOT NULL,
                    code TEXT NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_requirements_framework
                    ON requirements (framework_id);
                CREATE TABLE IF NOT EXISTS validation_rules (
                    rule_id TEXT PRIMARY KEY,
                    requirement_id TEXT NOT NULL,
                    asset_type TEXT NOT NULL,
                    rule_name TEXT NOT NULL,
                    rule_description TEXT,
                    logic_json TEXT NOT NULL,
                    priority INTEGER NOT NULL,
                    active INTEGER NOT NULL,
                    created_by TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_validation_rules_lookup
                    ON validation_rules (requirement_id, asset_type, active, priority);
                CREATE TABLE IF NOT EXISTS asset_requirement_mappings (
                    asset_type TEXT NOT NULL,
                    asset_id TEXT NOT NULL,
                    requirement_id TEXT NOT NULL,
                    status TEXT NOT NULL,
                    last_assessed_at INTEGER NOT NULL,
                    assessed_by TEXT,
                    evidence_urls_json TEXT NOT NULL,
                    notes TEXT,
                    auto_assessed INTEGER NOT NULL,
                    PRIMARY KEY (asset_type, asset_id, requirement_id)
                );
                CREATE INDEX IF NOT EXISTS idx_mappings_asset
                    ON asset_requirement_mappings (asset_type, asset_id);
                CREATE TABLE IF NOT EXISTS compliance_assessments (
                    assessment_seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    asset_type TEXT NOT NULL,
                    asset_id TEXT NOT NULL,
                    requirement_id TEXT NOT NULL,
                    assessment_type TEXT NOT NULL,
                    previous_status TEXT NOT NULL,
                    new_status TEXT NOT NULL,
                    rule_results_json TEXT NOT NULL,
                    assessed_by TEXT,
                    assessed_at INTEGER NOT NULL,
                    notes TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_assessments_triple
                    ON compliance_assessments (asset_type, asset_id, requirement_id, assessed_at);",
            )
            .map_err(|err| db_error(&err))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| db_error(&err))?;
    Ok(())
}
