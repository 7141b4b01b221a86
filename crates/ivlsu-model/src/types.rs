//! Query input and output records.

use serde::{Deserialize, Serialize};

/// Marker stored in a property that is not available at the queried point.
pub const NOT_AVAILABLE: f64 = -1.0;

/// A query location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Longitude in decimal degrees (negative = west).
    pub longitude: f64,
    /// Latitude in decimal degrees (positive = north).
    pub latitude: f64,
    /// Depth below sea level in meters, positive downward.
    pub depth: f64,
}

impl GeoPoint {
    /// Create a query point.
    pub fn new(longitude: f64, latitude: f64, depth: f64) -> Self {
        Self {
            longitude,
            latitude,
            depth,
        }
    }
}

/// Material properties at a point.
///
/// `qp` and `qs` are carried for hosts that expect the full five-value
/// record; this model never computes them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertiesRecord {
    /// P-wave velocity in m/s.
    pub vp: f64,
    /// S-wave velocity in m/s.
    pub vs: f64,
    /// Density in kg/m^3.
    pub rho: f64,
    /// P-wave quality factor (unused).
    pub qp: f64,
    /// S-wave quality factor (unused).
    pub qs: f64,
}

impl PropertiesRecord {
    /// Every property marked not available.
    pub const SENTINEL: Self = Self {
        vp: NOT_AVAILABLE,
        vs: NOT_AVAILABLE,
        rho: NOT_AVAILABLE,
        qp: NOT_AVAILABLE,
        qs: NOT_AVAILABLE,
    };

    /// A record holding only a stored P-wave velocity; the derived
    /// properties are marked not available until they are computed.
    pub fn from_vp(vp: f64) -> Self {
        Self {
            vp,
            vs: NOT_AVAILABLE,
            rho: NOT_AVAILABLE,
            ..Default::default()
        }
    }

    /// Mark the velocity and density fields not available, leaving `qp`
    /// and `qs` as the caller set them.
    pub fn mark_out_of_bounds(&mut self) {
        self.vp = NOT_AVAILABLE;
        self.vs = NOT_AVAILABLE;
        self.rho = NOT_AVAILABLE;
    }

    /// True when `vp` holds a real value.
    pub fn is_available(&self) -> bool {
        self.vp != NOT_AVAILABLE
    }
}
