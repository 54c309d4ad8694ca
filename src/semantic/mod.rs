//! Persisted index artifacts
//!
//! This module owns the on-disk layout of a built index: the vector file, the
//! document texts, and the metadata recording how they were produced.

mod metadata;
mod storage;

pub use metadata::{IndexMetadata, corpus_digest, corpus_fingerprint, get_utc_timestamp};
pub use storage::IndexArtifact;

/// Binary vector index part of an artifact.
pub const INDEX_FILE: &str = "index.vec";

/// JSON array of document texts in position order.
pub const DOCUMENTS_FILE: &str = "documents.json";

/// Informational metadata; optional when loading.
pub const METADATA_FILE: &str = "metadata.json";
