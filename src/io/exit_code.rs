//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success - operation completed (an empty result list is a success)
//! - `1`: General error - unspecified failure
//! - `3-9`: Specific errors a script can branch on
//! - `126-255`: Reserved by shell

use crate::error::RetrievalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Index has not been built (code 3)
    NotFound = 3,

    /// Corpus content could not be turned into an index (code 4)
    BuildError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration or model setup error (code 6)
    ConfigError = 6,

    /// Index corruption detected (code 7)
    IndexCorrupted = 7,

    /// Model and index disagree on vector dimension (code 8)
    DimensionMismatch = 8,

    /// Invalid command argument (code 9)
    InvalidArgument = 9,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

impl ExitCode {
    /// Map an error to the exit code scripts use to pick a recovery action.
    pub fn from_error(error: &RetrievalError) -> Self {
        match error {
            RetrievalError::IndexNotBuilt { .. } => ExitCode::NotFound,
            RetrievalError::Decode { .. }
            | RetrievalError::RaggedDimensions { .. }
            | RetrievalError::Embedding(_)
            | RetrievalError::CountMismatch { .. } => ExitCode::BuildError,
            RetrievalError::CorpusRead { .. }
            | RetrievalError::Persist { .. }
            | RetrievalError::VectorWrite { .. } => ExitCode::IoError,
            RetrievalError::ModelInit { .. }
            | RetrievalError::UnknownModel { .. }
            | RetrievalError::Config { .. } => ExitCode::ConfigError,
            RetrievalError::IndexCorrupted { .. } => ExitCode::IndexCorrupted,
            RetrievalError::DimensionMismatch { .. } => ExitCode::DimensionMismatch,
            RetrievalError::InvalidLimit { .. } => ExitCode::InvalidArgument,
        }
    }

    /// Short label printed ahead of an error message.
    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::NotFound => "Index not built",
            ExitCode::BuildError => "Build error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::IndexCorrupted => "Index corrupted",
            ExitCode::DimensionMismatch => "Dimension mismatch",
            ExitCode::InvalidArgument => "Invalid argument",
        }
    }
}
