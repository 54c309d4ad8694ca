//! Persisted index artifact: vectors plus the document texts they came from.
//!
//! An artifact is a directory with two required parts, [`INDEX_FILE`] (the
//! binary vector index) and [`DOCUMENTS_FILE`] (a JSON array of texts in the
//! same position order), plus an informational [`METADATA_FILE`].
//!
//! Writes never happen in place. All parts go into a staging directory next
//! to the target, which is then renamed over it. The vector file header
//! carries a digest of the documents it was built with. Loading rejects a
//! [`DOCUMENTS_FILE`] that does not match it, so a reader racing a rebuild
//! sees one whole build or `IndexCorrupted`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{RetrievalError, RetrievalResult};
use crate::semantic::{
    DOCUMENTS_FILE, INDEX_FILE, IndexMetadata, corpus_digest, corpus_fingerprint,
};
use crate::vector::{FlatIndex, Position, VectorFile};

/// An index together with its documents, as built or as loaded from disk.
#[derive(Debug, Clone)]
pub struct IndexArtifact {
    index: FlatIndex,
    documents: Vec<String>,
    metadata: Option<IndexMetadata>,
}

impl IndexArtifact {
    /// Pair an index with its documents.
    ///
    /// # Errors
    /// Returns a build error when the vector and document counts differ.
    pub fn new(
        index: FlatIndex,
        documents: Vec<String>,
        model_name: &str,
    ) -> RetrievalResult<Self> {
        if index.len() != documents.len() {
            return Err(RetrievalError::CountMismatch {
                vectors: index.len(),
                documents: documents.len(),
            });
        }

        let metadata = IndexMetadata::new(model_name, index.dimension().get(), &documents);
        Ok(Self {
            index,
            documents,
            metadata: Some(metadata),
        })
    }

    #[must_use]
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    #[must_use]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Text of the document at `position`.
    #[must_use]
    pub fn document(&self, position: Position) -> Option<&str> {
        self.documents.get(position.get()).map(String::as_str)
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&IndexMetadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Fail with `IndexNotBuilt` naming every required part missing from `dir`.
    pub fn ensure_built(dir: &Path) -> RetrievalResult<()> {
        let missing: Vec<&str> = [INDEX_FILE, DOCUMENTS_FILE]
            .into_iter()
            .filter(|name| !dir.join(name).is_file())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(RetrievalError::IndexNotBuilt {
            path: dir.to_path_buf(),
            missing: missing.join(" and "),
        })
    }

    /// Write the artifact to `dir`, replacing whatever is there.
    pub fn persist(&self, dir: &Path) -> RetrievalResult<()> {
        let name = dir.file_name().ok_or_else(|| RetrievalError::Config {
            reason: format!("index path '{}' has no directory name", dir.display()),
        })?;
        let parent = match dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|source| persist_error(&parent, source))?;

        let staging = tempfile::Builder::new()
            .prefix(".lookbook-staging-")
            .tempdir_in(&parent)
            .map_err(|source| persist_error(&parent, source))?;
        debug!(staging = %staging.path().display(), "writing index artifact");

        self.write_parts(staging.path())?;

        let mut backup_name = std::ffi::OsString::from(".");
        backup_name.push(name);
        backup_name.push(".previous");
        let backup = parent.join(backup_name);

        if backup.exists() {
            fs::remove_dir_all(&backup).map_err(|source| persist_error(&backup, source))?;
        }
        let had_previous = dir.exists();
        if had_previous {
            fs::rename(dir, &backup).map_err(|source| persist_error(dir, source))?;
        }

        if let Err(source) = fs::rename(staging.path(), dir) {
            if had_previous {
                if let Err(e) = fs::rename(&backup, dir) {
                    warn!(backup = %backup.display(), "failed to restore previous index: {e}");
                }
            }
            return Err(persist_error(dir, source));
        }

        if had_previous {
            if let Err(e) = fs::remove_dir_all(&backup) {
                warn!(backup = %backup.display(), "failed to remove previous index: {e}");
            }
        }

        info!(
            path = %dir.display(),
            documents = self.documents.len(),
            dimension = self.index.dimension().get(),
            "index artifact persisted"
        );
        Ok(())
    }

    fn write_parts(&self, dir: &Path) -> RetrievalResult<()> {
        let index_path = dir.join(INDEX_FILE);
        VectorFile::new(&index_path)
            .write(&self.index, &corpus_digest(&self.documents))
            .map_err(|source| RetrievalError::VectorWrite {
                path: index_path.clone(),
                source,
            })?;

        let documents_path = dir.join(DOCUMENTS_FILE);
        let file = File::create(&documents_path)
            .map_err(|source| persist_error(&documents_path, source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.documents)
            .map_err(|e| persist_error(&documents_path, e.into()))?;
        writer
            .flush()
            .map_err(|source| persist_error(&documents_path, source))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|source| persist_error(&documents_path, source))?;

        if let Some(metadata) = &self.metadata {
            metadata.save(dir)?;
        }

        Ok(())
    }

    /// Load an artifact from `dir`.
    ///
    /// # Errors
    /// - `IndexNotBuilt` when the directory or either required part is missing
    /// - `IndexCorrupted` when a part is malformed or the parts come from
    ///   different builds
    pub fn load(dir: &Path) -> RetrievalResult<Self> {
        Self::ensure_built(dir)?;
        let index_path = dir.join(INDEX_FILE);
        let documents_path = dir.join(DOCUMENTS_FILE);

        let (header, index) = VectorFile::new(&index_path)
            .read()
            .map_err(|e| RetrievalError::from_storage(dir, e))?;

        let corrupted = |reason: String| RetrievalError::IndexCorrupted {
            path: dir.to_path_buf(),
            reason,
        };

        let file = File::open(&documents_path)
            .map_err(|e| corrupted(format!("failed to open {DOCUMENTS_FILE}: {e}")))?;
        let documents: Vec<String> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| corrupted(format!("failed to parse {DOCUMENTS_FILE}: {e}")))?;

        if index.len() != documents.len() {
            return Err(corrupted(format!(
                "{INDEX_FILE} holds {} vectors but {DOCUMENTS_FILE} holds {} documents",
                index.len(),
                documents.len()
            )));
        }
        if corpus_digest(&documents) != header.content_digest {
            return Err(corrupted(format!(
                "{DOCUMENTS_FILE} does not match the documents {INDEX_FILE} was built from"
            )));
        }

        let metadata = IndexMetadata::load(dir)?;
        if let Some(meta) = &metadata {
            if meta.document_count != documents.len() {
                return Err(corrupted(format!(
                    "metadata records {} documents but the index holds {}",
                    meta.document_count,
                    documents.len()
                )));
            }
            if meta.dimension != index.dimension().get() {
                return Err(corrupted(format!(
                    "metadata records dimension {} but the index has dimension {}",
                    meta.dimension,
                    index.dimension()
                )));
            }
            if meta.corpus_sha256 != corpus_fingerprint(&documents) {
                return Err(corrupted(
                    "metadata fingerprint does not match the stored documents".to_string(),
                ));
            }
        }

        debug!(
            path = %dir.display(),
            documents = documents.len(),
            dimension = index.dimension().get(),
            "index artifact loaded"
        );

        Ok(Self {
            index,
            documents,
            metadata,
        })
    }
}

fn persist_error(path: &Path, source: std::io::Error) -> RetrievalError {
    RetrievalError::Persist {
        path: path.to_path_buf(),
        source,
    }
}
