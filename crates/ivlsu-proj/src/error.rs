//! Error types for the projection crate.

use thiserror::Error;

/// Errors that can occur when building or applying a projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The projection definition could not be turned into a transform.
    #[error("Cannot set up projection '{definition}': {reason}")]
    Setup {
        /// The definition string that was rejected.
        definition: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A single coordinate pair could not be transformed.
    #[error("Cannot transform coordinate ({x}, {y}): {reason}")]
    Transform {
        /// First input coordinate (longitude or easting).
        x: f64,
        /// Second input coordinate (latitude or northing).
        y: f64,
        /// Why the transform failed.
        reason: &'static str,
    },
}

impl ProjectionError {
    pub(crate) fn setup(definition: &str, reason: impl Into<String>) -> Self {
        ProjectionError::Setup {
            definition: definition.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transform(x: f64, y: f64, reason: &'static str) -> Self {
        ProjectionError::Transform { x, y, reason }
    }
}
