//! Error types for the retrieval index
//!
//! This module provides structured error types using thiserror so callers
//! can tell setup, build, not-found, corruption and dimension problems apart
//! and react to each one differently.

use std::path::PathBuf;
use thiserror::Error;

use crate::vector::{VectorError, VectorStorageError};

/// Broad category of a [`RetrievalError`].
///
/// The orchestration layer branches on this rather than on individual
/// variants: a `NotFound` is fixed by running a build, a `Corruption` needs a
/// rebuild, a `Setup` failure needs the model to become available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Setup,
    Build,
    NotFound,
    Corruption,
    DimensionMismatch,
    InvalidArgument,
    Config,
}

/// Main error type for building and querying the retrieval index
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding model could not be initialized
    #[error("Failed to initialize embedding model '{model}': {reason}")]
    ModelInit { model: String, reason: String },

    #[error(
        "Unknown embedding model '{name}'. Supported models: AllMiniLML6V2, AllMiniLML12V2, BGESmallENV15, BGEBaseENV15, MultilingualE5Small"
    )]
    UnknownModel { name: String },

    /// Corpus errors
    #[error("Failed to read corpus file '{path}': {source}")]
    CorpusRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corpus file '{path}' is not valid UTF-8")]
    Decode { path: PathBuf },

    #[error(
        "Vector at position {position} has dimension {actual}, expected {expected}. All vectors in an index must share one dimension"
    )]
    RaggedDimensions {
        position: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Build produced {vectors} vectors for {documents} documents")]
    CountMismatch { vectors: usize, documents: usize },

    #[error("Failed to persist index to '{path}': {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write vector file '{path}': {source}")]
    VectorWrite {
        path: PathBuf,
        source: VectorStorageError,
    },

    /// Artifact missing entirely or missing one of its parts
    #[error("Index not built at '{path}' (missing {missing}). Run 'lookbook index' first")]
    IndexNotBuilt { path: PathBuf, missing: String },

    #[error("Index at '{path}' is corrupted: {reason}")]
    IndexCorrupted { path: PathBuf, reason: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid result limit {k}: at least one result must be requested")]
    InvalidLimit { k: usize },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
}

impl RetrievalError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ModelInit { .. } | Self::UnknownModel { .. } => ErrorKind::Setup,
            Self::CorpusRead { .. }
            | Self::Decode { .. }
            | Self::RaggedDimensions { .. }
            | Self::Embedding(_)
            | Self::CountMismatch { .. }
            | Self::Persist { .. }
            | Self::VectorWrite { .. } => ErrorKind::Build,
            Self::IndexNotBuilt { .. } => ErrorKind::NotFound,
            Self::IndexCorrupted { .. } => ErrorKind::Corruption,
            Self::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Self::InvalidLimit { .. } => ErrorKind::InvalidArgument,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::ModelInit { .. } => "MODEL_INIT_ERROR",
            Self::UnknownModel { .. } => "UNKNOWN_MODEL",
            Self::CorpusRead { .. } => "CORPUS_READ_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::RaggedDimensions { .. } => "RAGGED_DIMENSIONS",
            Self::Embedding(_) => "EMBEDDING_ERROR",
            Self::CountMismatch { .. } => "COUNT_MISMATCH",
            Self::Persist { .. } | Self::VectorWrite { .. } => "PERSISTENCE_ERROR",
            Self::IndexNotBuilt { .. } => "INDEX_NOT_BUILT",
            Self::IndexCorrupted { .. } => "INDEX_CORRUPTED",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::InvalidLimit { .. } => "INVALID_LIMIT",
            Self::Config { .. } => "CONFIG_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::ModelInit { .. } => vec![
                "Ensure you have internet connection for first-time model download",
                "Check that the model cache directory is writable",
            ],
            Self::UnknownModel { .. } => {
                vec!["Set semantic_search.model to a supported model name"]
            }
            Self::CorpusRead { .. } => vec![
                "Check that the corpus directory exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::Decode { .. } => vec!["Re-save the file as UTF-8 or remove it from the corpus"],
            Self::IndexNotBuilt { .. } => vec!["Run 'lookbook index' to build the index"],
            Self::IndexCorrupted { .. } => vec![
                "Run 'lookbook index' to rebuild from scratch",
                "Check for disk errors or filesystem corruption",
            ],
            Self::DimensionMismatch { .. } => vec![
                "The embedding model changed since the index was built",
                "Run 'lookbook index' to rebuild with the current model",
            ],
            Self::Persist { .. } | Self::VectorWrite { .. } => {
                vec!["Check disk space and permissions in the index directory"]
            }
            Self::InvalidLimit { .. } => vec!["Request at least one result (-k 1 or more)"],
            _ => vec![],
        }
    }
}

impl From<VectorError> for RetrievalError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            VectorError::RaggedVector {
                position,
                expected,
                actual,
            } => Self::RaggedDimensions {
                position,
                expected,
                actual,
            },
            VectorError::InvalidLimit(k) => Self::InvalidLimit { k },
            VectorError::EmbeddingFailed(reason) => Self::Embedding(reason),
            VectorError::InvalidDimension { dimension, reason } => Self::Embedding(format!(
                "invalid embedding dimension {dimension}: {reason}"
            )),
        }
    }
}

impl RetrievalError {
    /// Map a storage-level failure for the artifact rooted at `path`.
    ///
    /// A missing file is reported as not-built, anything malformed is corruption.
    pub fn from_storage(path: impl Into<PathBuf>, err: VectorStorageError) -> Self {
        let path = path.into();
        match err {
            VectorStorageError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::IndexNotBuilt {
                    path,
                    missing: crate::semantic::INDEX_FILE.to_string(),
                }
            }
            other => Self::IndexCorrupted {
                path,
                reason: other.to_string(),
            },
        }
    }
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
