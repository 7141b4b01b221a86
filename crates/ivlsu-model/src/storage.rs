//! Grid storage accessor.
//!
//! The velocity model is a flat file of little-endian `f32` values, one per
//! node, z varying slowest. It is either read fully into memory or left on
//! disk and read one value at a time with positioned reads, which keeps the
//! store shareable across threads.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::GridDims;
use crate::error::StorageError;

/// Bytes per stored value.
pub const VALUE_SIZE: usize = std::mem::size_of::<f32>();

/// Name of the velocity data file inside the model directory.
pub const DATA_FILE_NAME: &str = "vp.dat";

/// Values decoded per read while loading into memory.
const LOAD_CHUNK_VALUES: usize = 64 * 1024;

/// How the velocity data should be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Load into memory when possible, otherwise read from disk.
    #[default]
    Auto,
    /// Always load into memory; fail if that is not possible.
    InMemory,
    /// Always read from disk.
    FileBacked,
}

/// Options for loading a model that are not part of its configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub storage: StorageMode,
    /// Largest model, in bytes, that may be held in memory.
    pub memory_limit: Option<u64>,
}

/// Velocity values backing a model.
pub enum VelocityStore {
    /// Every value resident in memory.
    InMemory(Vec<f32>),
    /// Values read from the data file on demand.
    FileBacked(FileBackedStore),
}

/// A data file read with positioned reads.
pub struct FileBackedStore {
    file: File,
    path: PathBuf,
    len: usize,
}

impl VelocityStore {
    /// Open the data file at `path` for a grid of `dims` nodes.
    pub fn load<P: AsRef<Path>>(
        path: P,
        dims: GridDims,
        options: &LoadOptions,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }

        let len = dims.node_count().ok_or(StorageError::GridTooLarge {
            nx: dims.nx,
            ny: dims.ny,
            nz: dims.nz,
        })?;
        let expected = len as u64 * VALUE_SIZE as u64;
        let actual = std::fs::metadata(path)?.len();
        if actual != expected {
            return Err(StorageError::SizeMismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }

        let within_limit = options.memory_limit.map_or(true, |limit| expected <= limit);
        match options.storage {
            StorageMode::FileBacked => Self::open_file_backed(path, len),
            StorageMode::InMemory => {
                if !within_limit {
                    return Err(StorageError::Allocation {
                        bytes: expected,
                        reason: "exceeds the configured memory limit".to_string(),
                    });
                }
                Self::read_into_memory(path, len)
            }
            StorageMode::Auto => {
                if within_limit {
                    match Self::read_into_memory(path, len) {
                        Ok(store) => return Ok(store),
                        Err(StorageError::Allocation { reason, .. }) => {
                            debug!(bytes = expected, %reason, "In-memory load failed");
                        }
                        Err(e) => return Err(e),
                    }
                }
                warn!(
                    path = %path.display(),
                    bytes = expected,
                    "Could not load model into memory; reading the model from disk may be slow"
                );
                Self::open_file_backed(path, len)
            }
        }
    }

    /// Wrap values that are already in memory.
    pub fn from_values(values: Vec<f32>) -> Self {
        VelocityStore::InMemory(values)
    }

    fn read_into_memory(path: &Path, len: usize) -> Result<Self, StorageError> {
        let mut values: Vec<f32> = Vec::new();
        values
            .try_reserve_exact(len)
            .map_err(|e| StorageError::Allocation {
                bytes: len as u64 * VALUE_SIZE as u64,
                reason: e.to_string(),
            })?;

        let mut reader = BufReader::new(File::open(path)?);
        let mut buf = vec![0u8; LOAD_CHUNK_VALUES * VALUE_SIZE];
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(LOAD_CHUNK_VALUES);
            let chunk = &mut buf[..n * VALUE_SIZE];
            reader.read_exact(chunk)?;
            values.extend(chunk.chunks_exact(VALUE_SIZE).map(decode_value));
            remaining -= n;
        }

        info!(path = %path.display(), values = len, "Loaded velocity model into memory");
        Ok(VelocityStore::InMemory(values))
    }

    fn open_file_backed(path: &Path, len: usize) -> Result<Self, StorageError> {
        let file = File::open(path)?;
        info!(path = %path.display(), values = len, "Reading velocity model from disk");
        Ok(VelocityStore::FileBacked(FileBackedStore {
            file,
            path: path.to_path_buf(),
            len,
        }))
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        match self {
            VelocityStore::InMemory(values) => values.len(),
            VelocityStore::FileBacked(store) => store.len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the value at a linear node index.
    pub fn read(&self, index: usize) -> Result<f32, StorageError> {
        match self {
            VelocityStore::InMemory(values) => {
                values
                    .get(index)
                    .copied()
                    .ok_or(StorageError::IndexOutOfRange {
                        index,
                        len: values.len(),
                    })
            }
            VelocityStore::FileBacked(store) => store.read(index),
        }
    }

    /// Short name of the backing kind.
    pub fn kind(&self) -> &'static str {
        match self {
            VelocityStore::InMemory(_) => "in-memory",
            VelocityStore::FileBacked(_) => "file-backed",
        }
    }

    /// Bytes of velocity data held in memory.
    pub fn resident_bytes(&self) -> usize {
        match self {
            VelocityStore::InMemory(values) => values.len() * VALUE_SIZE,
            VelocityStore::FileBacked(_) => 0,
        }
    }
}

impl fmt::Debug for VelocityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VelocityStore::InMemory(values) => f
                .debug_struct("InMemory")
                .field("len", &values.len())
                .finish(),
            VelocityStore::FileBacked(store) => f
                .debug_struct("FileBacked")
                .field("path", &store.path)
                .field("len", &store.len)
                .finish(),
        }
    }
}

impl FileBackedStore {
    /// Path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self, index: usize) -> Result<f32, StorageError> {
        if index >= self.len {
            return Err(StorageError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let mut buf = [0u8; VALUE_SIZE];
        read_exact_at(&self.file, &mut buf, (index * VALUE_SIZE) as u64)?;
        Ok(f32::from_le_bytes(buf))
    }
}

fn decode_value(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Write values in the on-disk layout. Used to build data files for tests
/// and tools.
pub fn write_values<W: std::io::Write>(mut writer: W, values: &[f32]) -> std::io::Result<()> {
    for v in values {
        writer.write_all(&v.to_le_bytes())?;
    }
    writer.flush()
}
