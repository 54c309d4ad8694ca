//! Metadata tracking for persisted indexes.
//!
//! This module records which embedding model built an index, its dimension
//! and size, and a fingerprint of the corpus text so consistency can be
//! checked across save/load cycles.

use std::path::Path;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{RetrievalError, RetrievalResult};
use crate::semantic::METADATA_FILE;

/// Metadata for a persisted index artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Name of the embedding model used
    pub model_name: String,

    /// Dimension of embeddings
    pub dimension: usize,

    /// Number of documents (and vectors) stored
    pub document_count: usize,

    /// SHA-256 over the document texts in position order
    pub corpus_sha256: String,

    /// Unix timestamp when created
    pub created_at: u64,

    /// Version of the metadata format
    pub version: u32,
}

impl IndexMetadata {
    /// Current metadata version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create new metadata with current timestamp
    pub fn new(model_name: impl Into<String>, dimension: usize, documents: &[String]) -> Self {
        Self {
            model_name: model_name.into(),
            dimension,
            document_count: documents.len(),
            corpus_sha256: corpus_fingerprint(documents),
            created_at: get_utc_timestamp(),
            version: Self::CURRENT_VERSION,
        }
    }

    /// Save metadata as JSON into `dir`
    pub fn save(&self, dir: &Path) -> RetrievalResult<()> {
        let metadata_path = dir.join(METADATA_FILE);

        let json = serde_json::to_string_pretty(self).map_err(|e| RetrievalError::Persist {
            path: metadata_path.clone(),
            source: e.into(),
        })?;

        std::fs::write(&metadata_path, json).map_err(|source| RetrievalError::Persist {
            path: metadata_path,
            source,
        })
    }

    /// Load metadata from `dir`.
    ///
    /// Returns `Ok(None)` when no metadata file exists; a file that exists
    /// but cannot be parsed, or was written by a newer format, is corruption.
    pub fn load(dir: &Path) -> RetrievalResult<Option<Self>> {
        let metadata_path = dir.join(METADATA_FILE);
        if !metadata_path.is_file() {
            return Ok(None);
        }

        let corrupted = |reason: String| RetrievalError::IndexCorrupted {
            path: dir.to_path_buf(),
            reason,
        };

        let json = std::fs::read_to_string(&metadata_path)
            .map_err(|e| corrupted(format!("failed to read {METADATA_FILE}: {e}")))?;

        let metadata: Self = serde_json::from_str(&json)
            .map_err(|e| corrupted(format!("failed to parse {METADATA_FILE}: {e}")))?;

        if metadata.version > Self::CURRENT_VERSION {
            return Err(corrupted(format!(
                "metadata version {} is newer than supported version {}",
                metadata.version,
                Self::CURRENT_VERSION
            )));
        }

        Ok(Some(metadata))
    }

    /// Creation time formatted for display.
    pub fn created_display(&self) -> String {
        i64::try_from(self.created_at)
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| self.created_at.to_string())
    }
}

/// SHA-256 over an ordered list of document texts.
///
/// Each text is prefixed with its byte length so that moving text across a
/// document boundary changes the digest.
pub fn corpus_digest(documents: &[String]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for text in documents {
        hasher.update((text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
    }
    hasher.finalize().into()
}

/// [`corpus_digest`] as lowercase hex.
pub fn corpus_fingerprint(documents: &[String]) -> String {
    corpus_digest(documents)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Get current UTC timestamp in seconds since UNIX_EPOCH
pub fn get_utc_timestamp() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_metadata_save_and_load() {
        let temp_dir = TempDir::new().unwrap();

        let metadata = IndexMetadata::new("AllMiniLML6V2", 384, &docs(&["a", "b"]));
        metadata.save(temp_dir.path()).unwrap();

        let loaded = IndexMetadata::load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(loaded, metadata);
        assert_eq!(loaded.document_count, 2);
        assert_eq!(loaded.version, IndexMetadata::CURRENT_VERSION);
    }

    #[test]
    fn test_metadata_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();

        assert!(IndexMetadata::load(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_version_compatibility() {
        let temp_dir = TempDir::new().unwrap();
        let future_metadata = r#"{
            "model_name": "FutureModel",
            "dimension": 512,
            "document_count": 0,
            "corpus_sha256": "",
            "created_at": 1735689600,
            "version": 999
        }"#;
        std::fs::write(temp_dir.path().join(METADATA_FILE), future_metadata).unwrap();

        match IndexMetadata::load(temp_dir.path()) {
            Err(RetrievalError::IndexCorrupted { reason, .. }) => {
                assert!(reason.contains("version"));
            }
            other => panic!("Expected version error, got {other:?}"),
        }
    }

    #[test]
    fn test_fingerprint_tracks_boundaries_and_order() {
        let base = corpus_fingerprint(&docs(&["red dress", "blue jeans"]));

        assert_eq!(base, corpus_fingerprint(&docs(&["red dress", "blue jeans"])));
        assert_ne!(base, corpus_fingerprint(&docs(&["blue jeans", "red dress"])));
        assert_ne!(base, corpus_fingerprint(&docs(&["red dressblue", " jeans"])));
        assert_eq!(base.len(), 64);
    }

    #[test]
    fn test_created_display() {
        let mut metadata = IndexMetadata::new("m", 3, &[]);
        metadata.created_at = 1735689600;
        assert_eq!(metadata.created_display(), "2025-01-01 00:00:00 UTC");
    }
}
