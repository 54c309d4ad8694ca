//! Semantic retrieval over a directory of short text documents.
//!
//! Build once with [`build_index`], query many times with [`Retriever`].

pub mod config;
pub mod corpus;
pub mod display;
pub mod error;
pub mod indexing;
pub mod io;
pub mod retrieve;
pub mod semantic;
pub mod vector;

// Explicit exports for better API clarity
pub use config::Settings;
pub use corpus::{Document, load_corpus};
pub use error::{ErrorKind, RetrievalError, RetrievalResult};
pub use indexing::{BuildStats, IndexBuilder, build_index};
pub use retrieve::{DEFAULT_LIMIT, IndexInfo, Retriever, index_info, search};
pub use semantic::{IndexArtifact, IndexMetadata};
pub use vector::{EmbeddingGenerator, FastEmbedGenerator, FlatIndex, Neighbor, VectorDimension};
