//! Offline index build: load corpus, embed, build, persist.

use std::path::Path;

use tracing::{debug, info};

use crate::corpus::{DEFAULT_EXTENSIONS, Document, load_corpus};
use crate::error::{RetrievalError, RetrievalResult};
use crate::indexing::BuildStats;
use crate::semantic::IndexArtifact;
use crate::vector::{EmbeddingGenerator, FlatIndex};

/// Number of documents sent to the embedder per call.
pub const DEFAULT_BATCH_SIZE: usize = 64;

type BatchCallback<'a> = Box<dyn Fn(usize, usize) + 'a>;

/// Builds an [`IndexArtifact`] from a corpus directory.
///
/// Nothing is written to disk until every document has been embedded and the
/// index has been built, so a failed build leaves any existing artifact alone.
pub struct IndexBuilder<'a> {
    embedder: &'a dyn EmbeddingGenerator,
    extensions: Vec<String>,
    batch_size: usize,
    on_batch: Option<BatchCallback<'a>>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(embedder: &'a dyn EmbeddingGenerator) -> Self {
        Self {
            embedder,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            on_batch: None,
        }
    }

    /// File extensions (without the dot) loaded from the corpus directory.
    #[must_use]
    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Called after each embedding batch with `(embedded, total)`.
    #[must_use]
    pub fn on_batch(mut self, callback: impl Fn(usize, usize) + 'a) -> Self {
        self.on_batch = Some(Box::new(callback));
        self
    }

    /// Build the artifact in memory.
    pub fn build(&self, corpus_dir: &Path) -> RetrievalResult<(IndexArtifact, BuildStats)> {
        let mut stats = BuildStats::new();
        stats.model_name = self.embedder.model_name().to_string();
        stats.dimension = self.embedder.dimension().get();

        info!(corpus = %corpus_dir.display(), extensions = ?self.extensions, "building index");

        let documents = load_corpus(corpus_dir, &self.extensions)?;
        stats.bytes_read = documents.iter().map(|d| d.text.len()).sum();

        let vectors = self.embed_documents(&documents, &mut stats)?;
        let index = FlatIndex::build(self.embedder.dimension(), &vectors)?;

        stats.documents_indexed = index.len();
        let texts = documents.into_iter().map(|d| d.text).collect();
        let artifact = IndexArtifact::new(index, texts, self.embedder.model_name())?;

        stats.stop_timing();
        info!(
            documents = stats.documents_indexed,
            dimension = stats.dimension,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "index built"
        );
        Ok((artifact, stats))
    }

    /// Build the artifact and persist it to `index_dir`.
    pub fn build_and_persist(
        &self,
        corpus_dir: &Path,
        index_dir: &Path,
    ) -> RetrievalResult<BuildStats> {
        let (artifact, mut stats) = self.build(corpus_dir)?;
        artifact.persist(index_dir)?;
        stats.index_path = Some(index_dir.to_path_buf());
        Ok(stats)
    }

    fn embed_documents(
        &self,
        documents: &[Document],
        stats: &mut BuildStats,
    ) -> RetrievalResult<Vec<Vec<f32>>> {
        let total = documents.len();
        let mut vectors = Vec::with_capacity(total);

        for batch in documents.chunks(self.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|d| d.text.as_str()).collect();
            let embeddings = self.embedder.generate_embeddings(&texts)?;

            if embeddings.len() != texts.len() {
                return Err(RetrievalError::CountMismatch {
                    vectors: embeddings.len(),
                    documents: texts.len(),
                });
            }

            vectors.extend(embeddings);
            stats.batches += 1;
            debug!(embedded = vectors.len(), total, "embedded batch");

            if let Some(callback) = &self.on_batch {
                callback(vectors.len(), total);
            }
        }

        Ok(vectors)
    }
}

/// Build the index for `corpus_dir` and persist it to `index_dir`.
pub fn build_index(
    corpus_dir: &Path,
    index_dir: &Path,
    embedder: &dyn EmbeddingGenerator,
    extensions: &[String],
) -> RetrievalResult<BuildStats> {
    IndexBuilder::new(embedder)
        .with_extensions(extensions)
        .build_and_persist(corpus_dir, index_dir)
}
