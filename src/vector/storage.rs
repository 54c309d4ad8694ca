//! Binary on-disk format for a [`FlatIndex`].
//!
//! # Storage Format
//!
//! - Header (48 bytes): magic `LBVF`, format version, dimension, vector count
//!   (all `u32` little-endian), then the 32-byte content digest of the
//!   documents the vectors were built from
//! - Vectors: `count * dimension` contiguous `f32` values in little-endian
//!   format, in position order
//!
//! Reading memory-maps the file and decodes it in one pass. The decoded
//! index is bit-for-bit identical to the one that was written.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use memmap2::MmapOptions;
use thiserror::Error;

use crate::vector::flat::FlatIndex;
use crate::vector::types::{VectorDimension, VectorError};

/// Current storage format version.
pub const STORAGE_VERSION: u32 = 1;

/// Size of the storage header in bytes.
const HEADER_SIZE: usize = 48;

/// Offset of the content digest within the header.
const DIGEST_OFFSET: usize = 16;

/// Magic bytes to identify vector index files.
const MAGIC_BYTES: &[u8; 4] = b"LBVF";

/// Number of bytes per f32 value.
const BYTES_PER_F32: usize = 4;

/// Errors specific to vector storage operations.
#[derive(Error, Debug)]
pub enum VectorStorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid storage format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported storage version: expected {expected}, got {actual}")]
    VersionMismatch { expected: u32, actual: u32 },

    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),
}

/// Decoded header of a vector index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorFileHeader {
    pub version: u32,
    pub dimension: VectorDimension,
    pub vector_count: usize,
    /// Digest of the documents paired with these vectors in the same build.
    pub content_digest: [u8; 32],
}

/// A vector index file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorFile {
    path: PathBuf,
}

impl VectorFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Writes `index` to the file, replacing any previous contents.
    ///
    /// `content_digest` ties the vectors to the documents they were built
    /// from. The data is flushed and synced before returning.
    pub fn write(
        &self,
        index: &FlatIndex,
        content_digest: &[u8; 32],
    ) -> Result<(), VectorStorageError> {
        let vector_count = u32::try_from(index.len()).map_err(|_| {
            VectorStorageError::InvalidFormat(format!(
                "too many vectors for format: {}",
                index.len()
            ))
        })?;
        let dimension = u32::try_from(index.dimension().get()).map_err(|_| {
            VectorStorageError::InvalidFormat(format!(
                "dimension too large for format: {}",
                index.dimension()
            ))
        })?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC_BYTES)?;
        writer.write_all(&STORAGE_VERSION.to_le_bytes())?;
        writer.write_all(&dimension.to_le_bytes())?;
        writer.write_all(&vector_count.to_le_bytes())?;
        writer.write_all(content_digest)?;

        for &value in index.as_raw() {
            writer.write_all(&value.to_le_bytes())?;
        }

        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| VectorStorageError::Io(e.into_error()))?
            .sync_all()?;

        Ok(())
    }

    /// Reads the whole index back together with its header.
    ///
    /// # Errors
    /// `Io` with `NotFound` if the file is missing, `InvalidFormat` for bad
    /// magic bytes or a body that does not match the header's vector count.
    pub fn read(&self) -> Result<(VectorFileHeader, FlatIndex), VectorStorageError> {
        let file = File::open(&self.path)?;
        let file_len = file.metadata()?.len() as usize;
        if file_len < HEADER_SIZE {
            return Err(VectorStorageError::InvalidFormat(
                "File too small to contain header".to_string(),
            ));
        }

        // SAFETY: the map is read-only and dropped before this function returns
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        let header = parse_header(&mmap[..HEADER_SIZE])?;

        let dim = header.dimension.get();
        let expected_len = header
            .vector_count
            .checked_mul(dim)
            .and_then(|values| values.checked_mul(BYTES_PER_F32))
            .and_then(|bytes| bytes.checked_add(HEADER_SIZE))
            .ok_or_else(|| {
                VectorStorageError::InvalidFormat("Header describes an impossible size".to_string())
            })?;

        if mmap.len() != expected_len {
            return Err(VectorStorageError::InvalidFormat(format!(
                "expected {expected_len} bytes for {} vectors of dimension {dim}, found {}",
                header.vector_count,
                mmap.len()
            )));
        }

        let data: Vec<f32> = mmap[HEADER_SIZE..]
            .chunks_exact(BYTES_PER_F32)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let index = FlatIndex::from_raw(header.dimension, data)?;
        Ok((header, index))
    }

    /// Returns the size of the file in bytes.
    pub fn file_size(&self) -> Result<u64, io::Error> {
        Ok(std::fs::metadata(&self.path)?.len())
    }
}

fn parse_header(bytes: &[u8]) -> Result<VectorFileHeader, VectorStorageError> {
    if bytes.len() < HEADER_SIZE {
        return Err(VectorStorageError::InvalidFormat(
            "File too small to contain header".to_string(),
        ));
    }

    if &bytes[0..4] != MAGIC_BYTES {
        return Err(VectorStorageError::InvalidFormat(
            "Invalid magic bytes".to_string(),
        ));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != STORAGE_VERSION {
        return Err(VectorStorageError::VersionMismatch {
            expected: STORAGE_VERSION,
            actual: version,
        });
    }

    let dim_value = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let dimension = VectorDimension::new(dim_value as usize)?;

    let vector_count = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;

    let mut content_digest = [0u8; 32];
    content_digest.copy_from_slice(&bytes[DIGEST_OFFSET..HEADER_SIZE]);

    Ok(VectorFileHeader {
        version,
        dimension,
        vector_count,
        content_digest,
    })
}
