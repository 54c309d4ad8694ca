//! Embedding generation for documents and queries.
//!
//! [`EmbeddingGenerator`] is the seam between the index and whatever turns
//! text into vectors. The production implementation wraps fastembed's
//! sentence-transformer models. Loading a model means reading (or
//! downloading) its weights, so [`FastEmbedGenerator::shared`] keeps one
//! instance per model for the lifetime of the process and hands out `Arc`s
//! to it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{RetrievalError, RetrievalResult};
use crate::vector::{VectorDimension, VectorError};

/// Default model used when configuration does not name one.
pub const DEFAULT_MODEL: &str = "AllMiniLML6V2";

/// Trait for generating embeddings from text.
///
/// Implementations must be deterministic: the same text always maps to the
/// same vector for a given model.
pub trait EmbeddingGenerator: Send + Sync {
    /// Generate embeddings for multiple texts.
    ///
    /// # Returns
    /// One embedding per input text, in input order.
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError>;

    /// Get the dimension of embeddings produced by this generator.
    #[must_use]
    fn dimension(&self) -> VectorDimension;

    /// Identity of the underlying model, recorded alongside persisted indexes.
    #[must_use]
    fn model_name(&self) -> &str;
}

/// Options for loading a fastembed model.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Directory holding downloaded model weights.
    pub cache_dir: PathBuf,
    /// Show a download progress bar on first use.
    pub show_download_progress: bool,
}

/// FastEmbed implementation backed by a local ONNX sentence-embedding model.
pub struct FastEmbedGenerator {
    model: Mutex<TextEmbedding>,
    dimension: VectorDimension,
    model_name: String,
}

impl std::fmt::Debug for FastEmbedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedGenerator")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("model", &"<TextEmbedding>")
            .finish()
    }
}

static SHARED_GENERATORS: OnceLock<Mutex<HashMap<String, Arc<FastEmbedGenerator>>>> =
    OnceLock::new();

impl FastEmbedGenerator {
    /// Load `model_name` with the given options.
    ///
    /// Every call loads the weights again; use [`FastEmbedGenerator::shared`]
    /// unless a private instance is really needed.
    ///
    /// # Errors
    /// Returns a setup error if the name is unknown or the model fails to
    /// initialize or download.
    pub fn new(model_name: &str, options: &ModelOptions) -> RetrievalResult<Self> {
        let model = parse_embedding_model(model_name).ok_or_else(|| {
            RetrievalError::UnknownModel {
                name: model_name.to_string(),
            }
        })?;

        info!(model = model_name, cache_dir = %options.cache_dir.display(), "loading embedding model");

        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(options.cache_dir.clone())
                .with_show_download_progress(options.show_download_progress),
        )
        .map_err(|e| RetrievalError::ModelInit {
            model: model_name.to_string(),
            reason: e.to_string(),
        })?;

        // Probe once to learn the output dimension
        let probe = text_model
            .embed(vec!["dimension probe"], None)
            .map_err(|e| RetrievalError::ModelInit {
                model: model_name.to_string(),
                reason: format!("probe embedding failed: {e}"),
            })?;
        let width = probe.first().map(Vec::len).unwrap_or_default();
        let dimension = VectorDimension::new(width).map_err(|e| RetrievalError::ModelInit {
            model: model_name.to_string(),
            reason: e.to_string(),
        })?;

        debug!(model = model_name, dimension = dimension.get(), "embedding model ready");

        Ok(Self {
            model: Mutex::new(text_model),
            dimension,
            model_name: model_name.to_string(),
        })
    }

    /// Process-wide instance of `model_name`, loaded on first use.
    ///
    /// Later calls with the same name return the same instance and never
    /// touch the weights again. `options` only matter for the first call.
    pub fn shared(model_name: &str, options: &ModelOptions) -> RetrievalResult<Arc<Self>> {
        let registry = SHARED_GENERATORS.get_or_init(|| Mutex::new(HashMap::new()));
        let mut generators = registry.lock();

        if let Some(generator) = generators.get(model_name) {
            return Ok(Arc::clone(generator));
        }

        let generator = Arc::new(Self::new(model_name, options)?);
        generators.insert(model_name.to_string(), Arc::clone(&generator));
        Ok(generator)
    }
}

impl EmbeddingGenerator for FastEmbedGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // fastembed expects owned strings
        let text_strings: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();

        let embeddings = self
            .model
            .lock()
            .embed(text_strings, None)
            .map_err(|e| {
                VectorError::EmbeddingFailed(format!("Failed to generate embeddings: {e}"))
            })?;

        if embeddings.len() != texts.len() {
            return Err(VectorError::EmbeddingFailed(format!(
                "model returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        for embedding in &embeddings {
            self.dimension.validate_vector(embedding)?;
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Parse a configured model name into a fastembed model.
///
/// Accepts the canonical names written by [`model_to_string`].
#[must_use]
pub fn parse_embedding_model(name: &str) -> Option<EmbeddingModel> {
    match name {
        "AllMiniLML6V2" => Some(EmbeddingModel::AllMiniLML6V2),
        "AllMiniLML12V2" => Some(EmbeddingModel::AllMiniLML12V2),
        "BGESmallENV15" => Some(EmbeddingModel::BGESmallENV15),
        "BGEBaseENV15" => Some(EmbeddingModel::BGEBaseENV15),
        "MultilingualE5Small" => Some(EmbeddingModel::MultilingualE5Small),
        _ => None,
    }
}

/// Canonical configuration name for a fastembed model.
#[must_use]
pub fn model_to_string(model: &EmbeddingModel) -> String {
    match model {
        EmbeddingModel::AllMiniLML6V2 => "AllMiniLML6V2",
        EmbeddingModel::AllMiniLML12V2 => "AllMiniLML12V2",
        EmbeddingModel::BGESmallENV15 => "BGESmallENV15",
        EmbeddingModel::BGEBaseENV15 => "BGEBaseENV15",
        EmbeddingModel::MultilingualE5Small => "MultilingualE5Small",
        _ => "Unsupported",
    }
    .to_string()
}

/// Mock embedding generator for testing.
///
/// Maps a handful of clothing and color words onto fixed axes so tests can
/// predict nearest neighbors without loading a model.
#[cfg(test)]
pub struct MockEmbeddingGenerator {
    dimension: VectorDimension,
}

#[cfg(test)]
impl Default for MockEmbeddingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl MockEmbeddingGenerator {
    const AXES: &'static [&'static [&'static str]] = &[
        &["red", "crimson", "scarlet"],
        &["dress", "gown"],
        &["blue", "navy"],
        &["jeans", "denim"],
        &["black", "ebony"],
        &["blazer", "jacket"],
    ];

    /// Create a new mock generator with 8 dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimension(VectorDimension::new(8).unwrap())
    }

    /// Create a generator with custom dimension for testing.
    #[must_use]
    pub fn with_dimension(dimension: VectorDimension) -> Self {
        assert!(dimension.get() >= Self::AXES.len());
        Self { dimension }
    }
}

#[cfg(test)]
impl EmbeddingGenerator for MockEmbeddingGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        let dim = self.dimension.get();
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let lower = text.to_lowercase();
            let mut embedding = vec![0.1; dim];

            for (axis, words) in Self::AXES.iter().enumerate() {
                if words.iter().any(|word| lower.contains(word)) {
                    embedding[axis] = 1.0;
                }
            }

            // Normalize to unit length (like real embeddings)
            let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            for val in &mut embedding {
                *val /= magnitude;
            }

            embeddings.push(embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "MockModel"
    }
}
