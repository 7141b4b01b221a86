//! Survey rectangle geometry and the coordinate mapper.
//!
//! Query points are projected, translated so the rectangle's bottom-left
//! corner is the origin, and rotated into the rectangle's own axes. Nominal
//! grid indices come from the rotated position; interpolation weights come
//! from the translated (unrotated) position divided by the physical cell
//! size. For an axis-aligned rectangle the two frames coincide.

use ivlsu_proj::{Projection, ProjectionError};

use crate::config::GridConfiguration;
use crate::types::GeoPoint;

/// Depth bucket used for the coarse z pick, in meters.
pub const Z_BUCKET_M: f64 = 1000.0;

/// Geometry derived once from a [`GridConfiguration`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyGeometry {
    origin_easting: f64,
    origin_northing: f64,
    /// Angle of the bottom-left to top-left edge, measured from grid north.
    pub rotation: f64,
    cos_rotation: f64,
    sin_rotation: f64,
    /// Length of the left edge in meters.
    pub total_height: f64,
    /// Length of the top edge in meters.
    pub total_width: f64,
    /// Index spacing along x and y.
    pub lon_delta: f64,
    pub lat_delta: f64,
    /// Physical cell size along x and y, used for interpolation weights.
    pub x_cell_width: f64,
    pub y_cell_width: f64,
    depth_interval: f64,
}

/// Where a query point falls within the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPosition {
    /// Offset from the bottom-left corner in projected axes.
    pub point_u: f64,
    pub point_v: f64,
    /// The same offset rotated into the rectangle's axes.
    pub point_x: f64,
    pub point_y: f64,
    pub x_index: i64,
    pub y_index: i64,
    pub z_index: i64,
    pub x_percent: f64,
    pub y_percent: f64,
    pub z_percent: f64,
}

/// Divisor for spacing along an axis with `n` nodes.
fn spans(n: usize) -> f64 {
    if n > 1 {
        (n - 1) as f64
    } else {
        1.0
    }
}

impl SurveyGeometry {
    pub fn new(config: &GridConfiguration) -> Self {
        let bl = config.bottom_left;
        let tl = config.top_left;
        let tr = config.top_right;

        let rotation = (tl.easting - bl.easting).atan2(tl.northing - bl.northing);
        let (sin_rotation, cos_rotation) = rotation.sin_cos();

        let total_height = bl.distance_to(&tl);
        let total_width = tl.distance_to(&tr);

        // Index spacing comes from the bottom-left to top-right diagonal,
        // expressed in the rectangle's own axes.
        let (du, dv) = (tr.easting - bl.easting, tr.northing - bl.northing);
        let diag_x = cos_rotation * du - sin_rotation * dv;
        let diag_y = sin_rotation * du + cos_rotation * dv;

        let dims = config.dims;
        Self {
            origin_easting: bl.easting,
            origin_northing: bl.northing,
            rotation,
            cos_rotation,
            sin_rotation,
            total_height,
            total_width,
            lon_delta: diag_x / spans(dims.nx),
            lat_delta: diag_y / spans(dims.ny),
            x_cell_width: total_width / spans(dims.nx),
            y_cell_width: total_height / spans(dims.ny),
            depth_interval: config.depth_interval,
        }
    }

    /// Locate a point already in projected coordinates.
    pub fn locate(&self, easting: f64, northing: f64, depth: f64) -> GridPosition {
        let point_u = easting - self.origin_easting;
        let point_v = northing - self.origin_northing;
        let point_x = self.cos_rotation * point_u - self.sin_rotation * point_v;
        let point_y = self.sin_rotation * point_u + self.cos_rotation * point_v;

        GridPosition {
            point_u,
            point_v,
            point_x,
            point_y,
            x_index: (point_x / self.lon_delta).round_ties_even() as i64,
            y_index: (point_y / self.lat_delta).round_ties_even() as i64,
            z_index: (depth / Z_BUCKET_M).floor() as i64,
            x_percent: (point_u % self.x_cell_width) / self.x_cell_width,
            y_percent: (point_v % self.y_cell_width) / self.y_cell_width,
            z_percent: (depth % self.depth_interval) / self.depth_interval,
        }
    }

    /// Project a geographic point and locate it.
    pub fn map_point(
        &self,
        projection: &dyn Projection,
        point: &GeoPoint,
    ) -> Result<GridPosition, ProjectionError> {
        let (easting, northing) = projection.to_projected(point.longitude, point.latitude)?;
        Ok(self.locate(easting, northing, point.depth))
    }
}
