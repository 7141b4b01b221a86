//! # ivlsu-proj
//!
//! Geographic (WGS84 longitude/latitude) to projected (UTM easting/northing)
//! coordinate conversion for the IVLSU velocity model.
//!
//! The model locates its survey rectangle in projected coordinates, so every
//! query point passes through this crate before any grid arithmetic happens.
//! The projection is configured once from a proj-style definition string and
//! is immutable afterwards, which makes it safe to share across threads.
//!
//! ## Example
//!
//! ```
//! use ivlsu_proj::{utm_definition, Projection, UtmProjection};
//!
//! let proj = UtmProjection::from_definition(&utm_definition(11))?;
//!
//! let (easting, northing) = proj.to_projected(-116.051578, 32.596922)?;
//! assert!((easting - 589_000.0).abs() < 1.0);
//! assert!((northing - 3_607_000.0).abs() < 1.0);
//!
//! let (lon, lat) = proj.to_geographic(easting, northing)?;
//! assert!((lon + 116.051578).abs() < 1e-6);
//! assert!((lat - 32.596922).abs() < 1e-6);
//! # Ok::<(), ivlsu_proj::ProjectionError>(())
//! ```

mod definition;
mod error;
mod utm;

pub use definition::{utm_definition, Ellipsoid, ProjDefinition};
pub use error::ProjectionError;
pub use utm::UtmProjection;

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// A forward/inverse pair between geographic and projected coordinates.
///
/// Longitudes and latitudes are in decimal degrees, eastings and northings in
/// meters.
pub trait Projection: Send + Sync + std::fmt::Debug {
    /// Convert geographic coordinates to projected `(easting, northing)`.
    fn to_projected(&self, lon: f64, lat: f64) -> Result<(f64, f64)>;

    /// Convert projected coordinates back to geographic `(lon, lat)`.
    fn to_geographic(&self, easting: f64, northing: f64) -> Result<(f64, f64)>;
}
