//! Vector index functionality for semantic retrieval.
//!
//! This module turns text into embeddings and answers exact nearest-neighbor
//! queries over them.
//!
//! # Architecture
//! - [`EmbeddingGenerator`]: text to fixed-dimension vectors
//! - [`FlatIndex`]: contiguous vectors with a brute-force k-NN query by
//!   squared Euclidean distance
//! - [`VectorFile`]: the binary on-disk form of a `FlatIndex`

mod embedding;
mod flat;
mod storage;
mod types;

// Re-export core types for public API
#[cfg(test)]
pub use embedding::MockEmbeddingGenerator;
pub use embedding::{
    DEFAULT_MODEL, EmbeddingGenerator, FastEmbedGenerator, ModelOptions, model_to_string,
    parse_embedding_model,
};
pub use flat::{FlatIndex, Neighbor, squared_euclidean};
pub use storage::{STORAGE_VERSION, VectorFile, VectorFileHeader, VectorStorageError};
pub use types::{Position, VECTOR_DIMENSION_384, VectorDimension, VectorError};
