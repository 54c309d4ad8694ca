//! Retrieval facade.
//!
//! [`Retriever`] is the only query surface: it takes text in and hands
//! document texts back, nearest first. Positions, vectors and the index
//! itself stay internal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::{RetrievalError, RetrievalResult};
use crate::semantic::{INDEX_FILE, IndexArtifact};
use crate::vector::{EmbeddingGenerator, FastEmbedGenerator, VectorFile};

/// Number of results returned when the caller does not choose.
pub const DEFAULT_LIMIT: usize = 2;

/// Summary of a persisted index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
    pub path: PathBuf,
    pub document_count: usize,
    pub dimension: usize,
    pub index_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_sha256: Option<String>,
}

/// Answers queries against the artifact stored at `index_path`.
///
/// The artifact is read on every call, so a rebuild is visible to the next
/// query without restarting anything.
pub struct Retriever {
    index_path: PathBuf,
    embedder: Arc<dyn EmbeddingGenerator>,
}

impl Retriever {
    pub fn new(index_path: impl Into<PathBuf>, embedder: Arc<dyn EmbeddingGenerator>) -> Self {
        Self {
            index_path: index_path.into(),
            embedder,
        }
    }

    /// Retriever over the configured index using the shared model instance.
    pub fn from_settings(settings: &Settings) -> RetrievalResult<Self> {
        let embedder = FastEmbedGenerator::shared(
            &settings.semantic_search.model,
            &settings.model_options(),
        )?;
        Ok(Self::new(settings.index_dir(), embedder))
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Return up to `k` document texts nearest to `query`, nearest first.
    ///
    /// # Errors
    /// - `InvalidLimit` if `k` is zero
    /// - `IndexNotBuilt` if no artifact exists at the index path
    /// - `IndexCorrupted` if the artifact cannot be read back consistently
    /// - `DimensionMismatch` if the embedder's dimension differs from the index
    pub fn search(&self, query: &str, k: usize) -> RetrievalResult<Vec<String>> {
        if k == 0 {
            return Err(RetrievalError::InvalidLimit { k });
        }

        let artifact = IndexArtifact::load(&self.index_path)?;
        self.check_compatible(&artifact)?;

        if artifact.is_empty() {
            debug!(path = %self.index_path.display(), "index is empty");
            return Ok(Vec::new());
        }

        let embedding = self
            .embedder
            .generate_embeddings(&[query])?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("no embedding returned for query".into()))?;

        let neighbors = artifact.index().query(&embedding, k)?;
        debug!(k, hits = neighbors.len(), "query answered");

        neighbors
            .into_iter()
            .map(|neighbor| {
                artifact
                    .document(neighbor.position)
                    .map(str::to_string)
                    .ok_or_else(|| RetrievalError::IndexCorrupted {
                        path: self.index_path.clone(),
                        reason: format!("no document at position {}", neighbor.position),
                    })
            })
            .collect()
    }

    /// Summary of the persisted index without embedding anything.
    pub fn info(&self) -> RetrievalResult<IndexInfo> {
        index_info(&self.index_path)
    }

    fn check_compatible(&self, artifact: &IndexArtifact) -> RetrievalResult<()> {
        let index_dim = artifact.index().dimension();
        let embedder_dim = self.embedder.dimension();
        if index_dim != embedder_dim {
            return Err(RetrievalError::DimensionMismatch {
                expected: index_dim.get(),
                actual: embedder_dim.get(),
            });
        }

        if let Some(meta) = artifact.metadata() {
            if meta.model_name != self.embedder.model_name() {
                warn!(
                    index_model = %meta.model_name,
                    query_model = self.embedder.model_name(),
                    "index was built with a different model of the same dimension; results may be poor"
                );
            }
        }
        Ok(())
    }
}

/// Summary of the artifact at `index_path`.
pub fn index_info(index_path: &Path) -> RetrievalResult<IndexInfo> {
    let artifact = IndexArtifact::load(index_path)?;
    let index_bytes = VectorFile::new(index_path.join(INDEX_FILE))
        .file_size()
        .unwrap_or_default();
    let metadata = artifact.metadata();

    Ok(IndexInfo {
        path: index_path.to_path_buf(),
        document_count: artifact.len(),
        dimension: artifact.index().dimension().get(),
        index_bytes,
        model_name: metadata.map(|m| m.model_name.clone()),
        created_at: metadata.map(|m| m.created_display()),
        corpus_sha256: metadata.map(|m| m.corpus_sha256.clone()),
    })
}

/// Search the configured index with the configured model.
///
/// Loads settings from the workspace, so this is the one-call entry point
/// for library users who do not manage a [`Retriever`] themselves.
pub fn search(query: &str, k: usize) -> RetrievalResult<Vec<String>> {
    let settings = Settings::load().map_err(|e| RetrievalError::Config {
        reason: e.to_string(),
    })?;
    Retriever::from_settings(&settings)?.search(query, k)
}
