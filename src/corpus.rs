//! Corpus loading.
//!
//! A corpus is a flat directory of UTF-8 text files. Each matching file
//! becomes one [`Document`], and positions follow file-name order so that two
//! builds over the same directory always assign the same positions.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{RetrievalError, RetrievalResult};
use crate::vector::Position;

/// Default extensions loaded when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt"];

/// One corpus file and its full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub position: Position,
    pub path: PathBuf,
    pub text: String,
}

/// Load every file in `dir` whose extension appears in `extensions`.
///
/// The scan is not recursive. Matching is exact and case-sensitive, so
/// `notes.TXT` is skipped when only `txt` is configured.
///
/// # Errors
/// - `CorpusRead` when the directory or a file cannot be read
/// - `Decode` when a file is not valid UTF-8
pub fn load_corpus<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> RetrievalResult<Vec<Document>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if outside_corpus(&e, extensions) => {
                debug!(error = %e, "skipping unreadable non-corpus entry");
                continue;
            }
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                return Err(RetrievalError::CorpusRead { path, source });
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if has_extension(entry.path(), extensions) {
            paths.push(entry.into_path());
        }
    }

    let mut documents = Vec::with_capacity(paths.len());
    for (i, path) in paths.into_iter().enumerate() {
        let bytes = std::fs::read(&path).map_err(|source| RetrievalError::CorpusRead {
            path: path.clone(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| RetrievalError::Decode { path: path.clone() })?;

        debug!(position = i, path = %path.display(), bytes = text.len(), "loaded document");
        documents.push(Document {
            position: Position::new(i),
            path,
            text,
        });
    }

    Ok(documents)
}

/// A broken entry the extension filter would have skipped anyway.
fn outside_corpus<S: AsRef<str>>(err: &walkdir::Error, extensions: &[S]) -> bool {
    err.depth() > 0 && !err.path().is_some_and(|p| has_extension(p, extensions))
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| extensions.iter().any(|e| e.as_ref() == ext))
}
