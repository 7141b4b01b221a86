//! Error types for model loading and queries.

use std::path::PathBuf;

use ivlsu_proj::ProjectionError;
use thiserror::Error;

/// Errors raised while reading or validating the model configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read.
    #[error("Cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more required keys never appeared in the file.
    #[error("Configuration is missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),

    /// A value could not be parsed as the type its key requires.
    #[error("Line {line}: cannot parse '{value}' for key '{key}'")]
    Parse {
        line: usize,
        key: &'static str,
        value: String,
    },

    /// A value parsed but is outside the range its key allows.
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors raised by the grid storage accessor.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The velocity data file does not exist.
    #[error("Velocity data file not found: {0}")]
    NotFound(PathBuf),

    /// The data file does not hold exactly one value per grid node.
    #[error("Velocity data file {path} is {actual} bytes, expected {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// The grid is too large to address on this platform.
    #[error("Grid of {nx} x {ny} x {nz} nodes is too large to address")]
    GridTooLarge { nx: usize, ny: usize, nz: usize },

    /// In-memory storage was requested but could not be provided.
    #[error("Cannot hold {bytes} bytes of velocity data in memory: {reason}")]
    Allocation { bytes: u64, reason: String },

    /// A linear index past the end of the store was read.
    #[error("Grid index {index} out of range for store of {len} values")]
    IndexOutOfRange { index: usize, len: usize },

    /// An I/O error while opening or reading the data file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single query point could not be resolved.
///
/// These never abort a batch; the affected record gets the sentinel and the
/// error is reported in the [`QueryReport`](crate::QueryReport).
#[derive(Debug, Error)]
pub enum PointError {
    /// The point could not be projected.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// A node read failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A neighbor node lies outside the grid and the edge policy rejects it.
    #[error("Neighbor node ({x}, {y}, {z}) lies outside the grid")]
    EdgeNeighbor { x: i64, y: i64, z: i64 },
}

impl PointError {
    /// Short label used for the `reason` metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            PointError::Projection(_) => "projection",
            PointError::Storage(_) => "storage",
            PointError::EdgeNeighbor { .. } => "edge",
        }
    }
}

/// Top-level errors for model initialization and batch queries.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The configuration file is missing, unreadable or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The projection for the configured UTM zone could not be set up.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// The velocity data could not be loaded.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The store does not match the configured grid dimensions.
    #[error("Store holds {actual} values but the grid has {expected} nodes")]
    StoreSizeMismatch { expected: usize, actual: usize },

    /// The output buffer is not the same length as the input points.
    #[error("Output buffer holds {outputs} records for {points} points")]
    OutputLengthMismatch { points: usize, outputs: usize },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
