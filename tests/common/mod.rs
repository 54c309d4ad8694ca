use lookbook::vector::{EmbeddingGenerator, VectorDimension, VectorError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A corpus directory and an index directory under one temp root.
pub struct TestCorpus {
    pub dir: TempDir,
}

impl TestCorpus {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("data")).expect("Failed to create corpus dir");
        Self { dir }
    }

    pub fn with_documents(documents: &[(&str, &str)]) -> Self {
        let corpus = Self::new();
        for (name, text) in documents {
            corpus.add_document(name, text);
        }
        corpus
    }

    pub fn add_document(&self, name: &str, text: &str) -> PathBuf {
        let path = self.corpus_dir().join(name);
        fs::write(&path, text).expect("Failed to write document");
        path
    }

    pub fn corpus_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn index_dir(&self) -> PathBuf {
        self.dir.path().join("vector_index")
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// The three-garment corpus used across the pipeline tests.
pub fn wardrobe() -> TestCorpus {
    TestCorpus::with_documents(&[
        ("01.txt", "red dress"),
        ("02.txt", "blue jeans"),
        ("03.txt", "black blazer"),
    ])
}

/// Deterministic embedder: one axis per synonym group, plus a constant bias.
pub struct KeywordEmbedder {
    dimension: VectorDimension,
}

impl KeywordEmbedder {
    const GROUPS: &'static [&'static [&'static str]] = &[
        &["red", "crimson", "scarlet"],
        &["dress", "gown", "frock"],
        &["blue", "navy", "indigo"],
        &["jeans", "denim", "trousers"],
        &["black", "ebony", "charcoal"],
        &["blazer", "jacket", "coat"],
    ];

    pub fn new() -> Self {
        Self::with_dimension(6)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        assert!(dimension >= Self::GROUPS.len());
        Self {
            dimension: VectorDimension::new(dimension).expect("non-zero dimension"),
        }
    }
}

impl EmbeddingGenerator for KeywordEmbedder {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, VectorError> {
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                let mut v = vec![0.05; self.dimension.get()];
                for (axis, words) in Self::GROUPS.iter().enumerate() {
                    if words.iter().any(|w| lower.contains(w)) {
                        v[axis] = 1.0;
                    }
                }
                v
            })
            .collect())
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "KeywordEmbedder"
    }
}
