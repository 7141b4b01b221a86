//! Parsing of proj-style projection definition strings.
//!
//! Only the subset needed for UTM is understood:
//! `+proj=utm +zone=11 [+south] [+datum=WGS84 | +ellps=WGS84|GRS80] [+units=m] [+no_defs]`.
//! Other `+key` parameters are accepted and ignored, the way proj ignores
//! parameters a projection does not use.

use crate::{ProjectionError, Result};

/// Reference ellipsoid, described by its semi-major axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major (equatorial) axis in meters.
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

impl Ellipsoid {
    /// WGS84 ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// GRS80 ellipsoid (NAD83).
    pub const GRS80: Ellipsoid = Ellipsoid {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }
}

/// Build the definition string for a northern-hemisphere WGS84 UTM zone.
pub fn utm_definition(zone: u8) -> String {
    format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs", zone)
}

/// A parsed projection definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjDefinition {
    /// The definition text as given.
    pub text: String,
    /// UTM zone number (1-60).
    pub zone: u8,
    /// Southern hemisphere (false northing of 10,000 km).
    pub south: bool,
    /// Reference ellipsoid.
    pub ellipsoid: Ellipsoid,
}

impl ProjDefinition {
    /// Parse a definition string.
    pub fn parse(text: &str) -> Result<Self> {
        let mut proj = None;
        let mut zone = None;
        let mut south = false;
        let mut ellipsoid = Ellipsoid::WGS84;

        for token in text.split_whitespace() {
            let param = token
                .strip_prefix('+')
                .ok_or_else(|| ProjectionError::setup(text, format!("malformed parameter '{}'", token)))?;
            let (key, value) = match param.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (param, None),
            };

            match (key, value) {
                ("proj", Some(v)) => proj = Some(v),
                ("zone", Some(v)) => {
                    let z: u8 = v
                        .parse()
                        .map_err(|_| ProjectionError::setup(text, format!("invalid zone '{}'", v)))?;
                    if !(1..=60).contains(&z) {
                        return Err(ProjectionError::setup(text, format!("zone {} outside 1-60", z)));
                    }
                    zone = Some(z);
                }
                ("south", None) => south = true,
                ("datum", Some(v)) | ("ellps", Some(v)) => {
                    ellipsoid = match v.to_ascii_uppercase().as_str() {
                        "WGS84" => Ellipsoid::WGS84,
                        "GRS80" | "NAD83" => Ellipsoid::GRS80,
                        _ => {
                            return Err(ProjectionError::setup(
                                text,
                                format!("unsupported {} '{}'", key, v),
                            ))
                        }
                    };
                }
                ("units", Some(v)) if v != "m" => {
                    return Err(ProjectionError::setup(text, format!("unsupported units '{}'", v)));
                }
                _ => {}
            }
        }

        match proj {
            Some("utm") => {}
            Some(other) => {
                return Err(ProjectionError::setup(text, format!("unsupported projection '{}'", other)))
            }
            None => return Err(ProjectionError::setup(text, "missing +proj")),
        }

        let zone = zone.ok_or_else(|| ProjectionError::setup(text, "missing +zone"))?;

        Ok(Self {
            text: text.to_string(),
            zone,
            south,
            ellipsoid,
        })
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        (self.zone as f64 - 1.0) * 6.0 - 180.0 + 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_templated_definition() {
        let def = ProjDefinition::parse(&utm_definition(11)).unwrap();
        assert_eq!(def.zone, 11);
        assert!(!def.south);
        assert_eq!(def.ellipsoid, Ellipsoid::WGS84);
        assert_eq!(def.central_meridian(), -117.0);
    }

    #[test]
    fn test_parse_south_grs80() {
        let def = ProjDefinition::parse("+proj=utm +zone=33 +south +ellps=GRS80").unwrap();
        assert_eq!(def.zone, 33);
        assert!(def.south);
        assert_eq!(def.ellipsoid, Ellipsoid::GRS80);
        assert_eq!(def.central_meridian(), 15.0);
    }

    #[test]
    fn test_parse_rejects_bad_definitions() {
        let cases = [
            "+proj=latlong +datum=WGS84",
            "+proj=utm +datum=WGS84",
            "+proj=utm +zone=0",
            "+proj=utm +zone=61",
            "+proj=utm +zone=eleven",
            "+proj=utm +zone=11 +datum=clarke66",
            "+proj=utm +zone=11 +units=ft",
            "proj=utm zone=11",
            "",
        ];
        for case in cases {
            let err = ProjDefinition::parse(case).unwrap_err();
            assert!(
                matches!(err, ProjectionError::Setup { .. }),
                "expected setup error for '{}', got {:?}",
                case,
                err
            );
        }
    }

    #[test]
    fn test_unknown_parameters_ignored() {
        let def = ProjDefinition::parse("+proj=utm +zone=10 +towgs84=0,0,0 +wktext").unwrap();
        assert_eq!(def.zone, 10);
    }
}
