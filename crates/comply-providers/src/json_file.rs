// crates/comply-providers/src/json_file.rs
// ============================================================================
// Module: JSON File Asset Directory
// Description: Asset directory backed by one JSON document on disk.
// Purpose: Resolve asset snapshots for CLI and embedded hosts.
// Dependencies: comply-core, serde_json
// ============================================================================

//! ## Overview
//! The asset document maps asset-type labels to objects keyed by asset
//! identifier. The file is re-read on every fetch so external edits are
//! visible without restarts, matching the engine's no-caching discipline.
//! Loads are size-capped and must be valid UTF-8 JSON; anything else fails
//! closed.
//!
//! ```json
//! {
//!   "information": {
//!     "asset-1": { "name": "customer db", "criticality_level": "high" }
//!   }
//! }
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use comply_core::AssetDirectory;
use comply_core::AssetId;
use comply_core::AssetType;
use comply_core::DirectoryError;
use serde_json::Value;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an asset document accepted by the directory.
pub const MAX_ASSET_DOCUMENT_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Directory
// ============================================================================

/// Asset directory reading snapshots from one JSON document.
///
/// # Invariants
/// - The document is re-read on every fetch; no snapshot is cached.
/// - Documents exceeding [`MAX_ASSET_DOCUMENT_BYTES`] are rejected.
#[derive(Debug, Clone)]
pub struct JsonFileAssetDirectory {
    /// Path to the asset document.
    path: PathBuf,
}

impl JsonFileAssetDirectory {
    /// Creates a directory over the given asset document path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads and parses the asset document.
    fn load_document(&self) -> Result<Value, DirectoryError> {
        let metadata = fs::metadata(&self.path)
            .map_err(|err| DirectoryError::Io(format!("asset document unreadable: {err}")))?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > MAX_ASSET_DOCUMENT_BYTES {
            return Err(DirectoryError::Invalid(format!(
                "asset document exceeds size limit: {size} bytes (max {MAX_ASSET_DOCUMENT_BYTES})"
            )));
        }
        let bytes = fs::read(&self.path)
            .map_err(|err| DirectoryError::Io(format!("asset document unreadable: {err}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| DirectoryError::Invalid("asset document must be utf-8".to_string()))?;
        let document: Value = serde_json::from_str(&text)
            .map_err(|err| DirectoryError::Invalid(format!("asset document unparseable: {err}")))?;
        if !document.is_object() {
            return Err(DirectoryError::Invalid(
                "asset document root must be an object".to_string(),
            ));
        }
        Ok(document)
    }

    /// Returns the configured document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AssetDirectory for JsonFileAssetDirectory {
    fn fetch(&self, asset_type: AssetType, asset_id: &AssetId) -> Result<Value, DirectoryError> {
        let document = self.load_document()?;
        let snapshot = document
            .get(asset_type.as_str())
            .and_then(|section| section.get(asset_id.as_str()))
            .cloned();
        snapshot.ok_or_else(|| DirectoryError::NotFound {
            asset_type,
            asset_id: asset_id.clone(),
        })
    }
}
