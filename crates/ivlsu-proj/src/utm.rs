//! Universal Transverse Mercator projection.
//!
//! Forward and inverse series follow Snyder, "Map Projections: A Working
//! Manual" (USGS PP 1395), eqs. 8-9 to 8-25. Within a few degrees of the
//! central meridian the round trip is exact to well below a millimeter.

use crate::definition::{utm_definition, Ellipsoid, ProjDefinition};
use crate::{Projection, ProjectionError, Result};
use tracing::debug;

/// Scale factor on the central meridian.
const K0: f64 = 0.9996;
/// False easting in meters.
const FALSE_EASTING: f64 = 500_000.0;
/// False northing for southern-hemisphere zones in meters.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
/// Longitudes further than this from the central meridian are rejected;
/// the series diverges as the offset approaches 90 degrees.
const MAX_MERIDIAN_OFFSET_DEG: f64 = 60.0;

/// A UTM zone projection on a reference ellipsoid.
#[derive(Debug, Clone)]
pub struct UtmProjection {
    definition: ProjDefinition,
    /// Central meridian in radians.
    lon0: f64,
    false_northing: f64,
    // Ellipsoid constants, precomputed once.
    a: f64,
    e2: f64,
    ep2: f64,
    e1: f64,
}

impl UtmProjection {
    /// Build a projection from a proj-style definition string.
    pub fn from_definition(text: &str) -> Result<Self> {
        let definition = ProjDefinition::parse(text)?;
        let Ellipsoid { a, .. } = definition.ellipsoid;
        let e2 = definition.ellipsoid.e2();
        let root = (1.0 - e2).sqrt();

        let projection = Self {
            lon0: definition.central_meridian().to_radians(),
            false_northing: if definition.south {
                FALSE_NORTHING_SOUTH
            } else {
                0.0
            },
            a,
            e2,
            ep2: e2 / (1.0 - e2),
            e1: (1.0 - root) / (1.0 + root),
            definition,
        };

        debug!(
            definition = %projection.definition.text,
            central_meridian = projection.definition.central_meridian(),
            "UTM projection initialized"
        );

        Ok(projection)
    }

    /// Build the northern-hemisphere WGS84 projection for a zone.
    pub fn for_zone(zone: u8) -> Result<Self> {
        Self::from_definition(&utm_definition(zone))
    }

    /// The zone number.
    pub fn zone(&self) -> u8 {
        self.definition.zone
    }

    /// The definition this projection was built from.
    pub fn definition(&self) -> &str {
        &self.definition.text
    }

    /// Meridian arc length from the equator to latitude `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

impl Projection for UtmProjection {
    fn to_projected(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::transform(lon, lat, "non-finite coordinate"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ProjectionError::transform(lon, lat, "latitude outside [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ProjectionError::transform(lon, lat, "longitude outside [-180, 180]"));
        }

        let phi = lat.to_radians();
        let mut dlam = lon.to_radians() - self.lon0;
        if dlam > std::f64::consts::PI {
            dlam -= 2.0 * std::f64::consts::PI;
        } else if dlam < -std::f64::consts::PI {
            dlam += 2.0 * std::f64::consts::PI;
        }
        if dlam.abs().to_degrees() > MAX_MERIDIAN_OFFSET_DEG {
            return Err(ProjectionError::transform(
                lon,
                lat,
                "too far from the zone's central meridian",
            ));
        }

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();
        let n = self.a / (1.0 - self.e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = self.ep2 * cos_phi * cos_phi;
        let a = dlam * cos_phi;
        let m = self.meridian_arc(phi);

        let easting = K0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a.powi(5) / 120.0)
            + FALSE_EASTING;

        let northing = K0
            * (m + n
                * tan_phi
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a.powi(6)
                        / 720.0))
            + self.false_northing;

        Ok((easting, northing))
    }

    fn to_geographic(&self, easting: f64, northing: f64) -> Result<(f64, f64)> {
        if !easting.is_finite() || !northing.is_finite() {
            return Err(ProjectionError::transform(
                easting,
                northing,
                "non-finite coordinate",
            ));
        }

        let e2 = self.e2;
        let e1 = self.e1;
        let x = easting - FALSE_EASTING;
        let y = northing - self.false_northing;

        // Footpoint latitude.
        let mu = (y / K0) / (self.a * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        if phi1.abs() >= std::f64::consts::FRAC_PI_2 {
            return Err(ProjectionError::transform(
                easting,
                northing,
                "northing beyond the pole",
            ));
        }

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let w = 1.0 - e2 * sin_phi1 * sin_phi1;
        let n1 = self.a / w.sqrt();
        let r1 = self.a * (1.0 - e2) / w.powf(1.5);
        let t1 = tan_phi1 * tan_phi1;
        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let d = x / (n1 * K0);

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);

        let lam = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        let (lon, lat) = (lam.to_degrees(), phi.to_degrees());
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::transform(
                easting,
                northing,
                "inverse series did not converge",
            ));
        }

        Ok((lon, lat))
    }
}
