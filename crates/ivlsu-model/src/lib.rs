//! # ivlsu-model
//!
//! Point queries against the LSU Imperial Valley seismic velocity model.
//!
//! The model is a regular 3-D grid of P-wave velocities covering a survey
//! rectangle given by four corners in UTM coordinates; the rectangle need not
//! be aligned with the UTM axes. A query takes longitude, latitude and depth,
//! finds the surrounding grid nodes, optionally blends them, and derives
//! density and shear velocity from the result. Points outside the grid get
//! the `-1` sentinel instead of an error.
//!
//! ## Layout on disk
//!
//! ```text
//! <install_dir>/model/<label>/data/config
//! <install_dir>/model/<label>/data/<model_dir>/vp.dat
//! ```
//!
//! `vp.dat` holds one little-endian `f32` per node, x varying fastest and
//! z slowest.
//!
//! ## Example
//!
//! ```no_run
//! use ivlsu_model::{GeoPoint, LoadOptions, Model, PropertiesRecord};
//!
//! let model = Model::init("/opt/ucvm", "ivlsu", &LoadOptions::default())?;
//!
//! let points = [GeoPoint::new(-116.0516, 32.6862, 2000.0)];
//! let mut out = [PropertiesRecord::default(); 1];
//! let report = model.query(&points, &mut out)?;
//!
//! println!("vp = {} ({} resolved)", out[0].vp, report.resolved);
//! model.finalize()?;
//! # Ok::<(), ivlsu_model::ModelError>(())
//! ```

pub mod config;
pub mod derived;
mod error;
pub mod geometry;
pub mod interpolate;
mod model;
pub mod sampler;
pub mod storage;
mod telemetry;
mod types;

pub use config::{Corner, EdgePolicy, GridConfiguration, GridDims};
pub use error::{ConfigError, ModelError, PointError, Result, StorageError};
pub use geometry::{GridPosition, SurveyGeometry};
pub use model::{Model, PointOutcome, QueryReport, MODEL_VERSION};
pub use storage::{LoadOptions, StorageMode, VelocityStore};
pub use telemetry::{describe_metrics, metric_defs, Metric, MetricKind};
pub use types::{GeoPoint, PropertiesRecord, NOT_AVAILABLE};

pub use ivlsu_proj::{Projection, ProjectionError};
