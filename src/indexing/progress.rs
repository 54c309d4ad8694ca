//! Statistics for index builds

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Statistics collected while building an index
#[derive(Debug, Default, Clone, Serialize)]
pub struct BuildStats {
    /// Number of documents embedded and stored
    pub documents_indexed: usize,

    /// Total bytes of document text read from the corpus
    pub bytes_read: usize,

    /// Dimension of the stored vectors
    pub dimension: usize,

    /// Model that produced the embeddings
    pub model_name: String,

    /// Number of embedding batches sent to the model
    pub batches: usize,

    /// Directory the artifact was written to, if it was persisted
    pub index_path: Option<PathBuf>,

    /// Time elapsed during the build
    pub elapsed: Duration,

    #[serde(skip)]
    start_time: Option<Instant>,
}

impl BuildStats {
    /// Create new stats and start timing
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Stop timing and record elapsed time
    pub fn stop_timing(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed = start.elapsed();
            self.start_time = None;
        }
    }

    /// Throughput over the whole build, zero for an empty corpus
    pub fn documents_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if self.documents_indexed == 0 || secs == 0.0 {
            return 0.0;
        }
        self.documents_indexed as f64 / secs
    }
}
