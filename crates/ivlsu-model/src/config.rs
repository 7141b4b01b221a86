//! Model configuration file.
//!
//! The file is a list of `key = value` lines. Blank lines and lines starting
//! with `#` are skipped and unrecognized keys are ignored. Presence of every
//! required key is tracked explicitly, so a corner legitimately at zero
//! easting or northing is accepted.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Keys that must appear in every configuration file.
pub const REQUIRED_KEYS: [&str; 15] = [
    "utm_zone",
    "model_dir",
    "nx",
    "ny",
    "nz",
    "depth",
    "depth_interval",
    "top_left_corner_e",
    "top_left_corner_n",
    "top_right_corner_e",
    "top_right_corner_n",
    "bottom_left_corner_e",
    "bottom_left_corner_n",
    "bottom_right_corner_e",
    "bottom_right_corner_n",
];

/// Keys that may be omitted.
pub const OPTIONAL_KEYS: [&str; 2] = ["interpolation", "edge_policy"];

/// How neighbor nodes past the grid edge are read during interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Form the linear index without re-checking the axes. An index that
    /// still lands inside the array reads that value; one past either end
    /// reads as zero.
    #[default]
    Unchecked,
    /// Clamp each axis into the grid before forming the linear index.
    Clamp,
    /// Treat any neighbor outside the grid as a per-point failure.
    Reject,
}

impl FromStr for EdgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unchecked" => Ok(EdgePolicy::Unchecked),
            "clamp" => Ok(EdgePolicy::Clamp),
            "reject" => Ok(EdgePolicy::Reject),
            other => Err(format!("unknown edge policy '{}'", other)),
        }
    }
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgePolicy::Unchecked => "unchecked",
            EdgePolicy::Clamp => "clamp",
            EdgePolicy::Reject => "reject",
        };
        f.write_str(name)
    }
}

/// Node counts along each grid axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    /// Nodes along the rectangle's width.
    pub nx: usize,
    /// Nodes along the rectangle's height.
    pub ny: usize,
    /// Depth layers.
    pub nz: usize,
}

impl GridDims {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Total node count, or `None` if it overflows `usize`.
    pub fn node_count(&self) -> Option<usize> {
        self.nx.checked_mul(self.ny)?.checked_mul(self.nz)
    }

    /// Linear index of node `(x, y, z)`: z varies slowest, then y, then x.
    ///
    /// Computed in signed arithmetic so neighbors past an edge produce an
    /// index the caller can test rather than a wrapped one. `None` when the
    /// index does not fit in an `i64`, which is past the array either way.
    pub fn linear_index(&self, x: i64, y: i64, z: i64) -> Option<i64> {
        let nx = i64::try_from(self.nx).ok()?;
        let ny = i64::try_from(self.ny).ok()?;
        z.checked_mul(nx.checked_mul(ny)?)?
            .checked_add(y.checked_mul(nx)?)?
            .checked_add(x)
    }

    /// Whether `(x, y, z)` lies within the grid on every axis.
    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        (0..self.nx as i64).contains(&x)
            && (0..self.ny as i64).contains(&y)
            && (0..self.nz as i64).contains(&z)
    }
}

/// A survey rectangle corner in projected meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Corner {
    pub easting: f64,
    pub northing: f64,
}

impl Corner {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    /// Straight-line distance to another corner.
    pub fn distance_to(&self, other: &Corner) -> f64 {
        (other.easting - self.easting).hypot(other.northing - self.northing)
    }
}

/// Parsed and validated model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfiguration {
    /// UTM zone of the projected corner coordinates.
    pub utm_zone: u8,
    /// Directory under the model's data directory holding `vp.dat`.
    pub model_dir: String,
    pub dims: GridDims,
    /// Maximum depth covered by the model, in meters.
    pub depth: f64,
    /// Meters between successive z layers.
    pub depth_interval: f64,
    pub top_left: Corner,
    pub top_right: Corner,
    pub bottom_left: Corner,
    pub bottom_right: Corner,
    /// Blend neighboring nodes instead of taking the nearest one.
    pub interpolation: bool,
    pub edge_policy: EdgePolicy,
}

impl GridConfiguration {
    /// Read and validate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Reading model configuration");
        Self::parse(&text)
    }

    /// Parse and validate configuration text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::blank();
        let mut seen: HashSet<&'static str> = HashSet::new();

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, rest)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let Some(key) = REQUIRED_KEYS
                .iter()
                .chain(OPTIONAL_KEYS.iter())
                .copied()
                .find(|k| *k == key)
            else {
                continue;
            };
            // Only the first token after '=' is the value.
            let value = rest.split_whitespace().next().unwrap_or("");

            config.assign(key, value, line_no)?;
            seen.insert(key);
        }

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|k| !seen.contains(k))
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        config.validate()?;
        Ok(config)
    }

    fn blank() -> Self {
        Self {
            utm_zone: 0,
            model_dir: String::new(),
            dims: GridDims::new(0, 0, 0),
            depth: 0.0,
            depth_interval: 0.0,
            top_left: Corner::default(),
            top_right: Corner::default(),
            bottom_left: Corner::default(),
            bottom_right: Corner::default(),
            interpolation: false,
            edge_policy: EdgePolicy::default(),
        }
    }

    fn assign(&mut self, key: &'static str, value: &str, line: usize) -> Result<(), ConfigError> {
        match key {
            "utm_zone" => self.utm_zone = parse_value(key, value, line)?,
            "model_dir" => {
                if value.is_empty() {
                    return Err(parse_error(key, value, line));
                }
                self.model_dir = value.to_string();
            }
            "nx" => self.dims.nx = parse_value(key, value, line)?,
            "ny" => self.dims.ny = parse_value(key, value, line)?,
            "nz" => self.dims.nz = parse_value(key, value, line)?,
            "depth" => self.depth = parse_value(key, value, line)?,
            "depth_interval" => self.depth_interval = parse_value(key, value, line)?,
            "top_left_corner_e" => self.top_left.easting = parse_value(key, value, line)?,
            "top_left_corner_n" => self.top_left.northing = parse_value(key, value, line)?,
            "top_right_corner_e" => self.top_right.easting = parse_value(key, value, line)?,
            "top_right_corner_n" => self.top_right.northing = parse_value(key, value, line)?,
            "bottom_left_corner_e" => self.bottom_left.easting = parse_value(key, value, line)?,
            "bottom_left_corner_n" => self.bottom_left.northing = parse_value(key, value, line)?,
            "bottom_right_corner_e" => self.bottom_right.easting = parse_value(key, value, line)?,
            "bottom_right_corner_n" => self.bottom_right.northing = parse_value(key, value, line)?,
            "interpolation" => self.interpolation = value == "on",
            "edge_policy" => self.edge_policy = parse_value(key, value, line)?,
            _ => {}
        }
        Ok(())
    }

    /// Check value ranges and the survey rectangle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=60).contains(&self.utm_zone) {
            return Err(invalid("utm_zone", format!("zone {} outside 1-60", self.utm_zone)));
        }
        if self.model_dir.is_empty() {
            return Err(invalid("model_dir", "must not be empty"));
        }
        for (key, n) in [("nx", self.dims.nx), ("ny", self.dims.ny), ("nz", self.dims.nz)] {
            if n == 0 {
                return Err(invalid(key, "must be at least 1"));
            }
        }
        if self.dims.node_count().is_none() {
            return Err(invalid("nz", "grid node count overflows"));
        }
        for (key, v) in [("depth", self.depth), ("depth_interval", self.depth_interval)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(invalid(key, format!("{} is not a positive number", v)));
            }
        }
        for (key, corner) in [
            ("top_left_corner", self.top_left),
            ("top_right_corner", self.top_right),
            ("bottom_left_corner", self.bottom_left),
            ("bottom_right_corner", self.bottom_right),
        ] {
            if !(corner.easting.is_finite() && corner.northing.is_finite()) {
                return Err(invalid(key, "corner coordinates must be finite"));
            }
        }
        if self.bottom_left.distance_to(&self.top_left) == 0.0 {
            return Err(invalid("top_left_corner", "survey rectangle has zero height"));
        }
        if self.top_left.distance_to(&self.top_right) == 0.0 {
            return Err(invalid("top_right_corner", "survey rectangle has zero width"));
        }
        Ok(())
    }
}

impl fmt::Display for GridConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "UTM zone:       {}", self.utm_zone)?;
        writeln!(f, "Model dir:      {}", self.model_dir)?;
        writeln!(
            f,
            "Grid:           {} x {} x {} nodes",
            self.dims.nx, self.dims.ny, self.dims.nz
        )?;
        writeln!(
            f,
            "Depth:          {} m ({} m per layer)",
            self.depth, self.depth_interval
        )?;
        for (name, c) in [
            ("Top left:", self.top_left),
            ("Top right:", self.top_right),
            ("Bottom left:", self.bottom_left),
            ("Bottom right:", self.bottom_right),
        ] {
            writeln!(f, "{:<15} {:.1} E, {:.1} N", name, c.easting, c.northing)?;
        }
        writeln!(
            f,
            "Interpolation:  {}",
            if self.interpolation { "on" } else { "off" }
        )?;
        write!(f, "Edge policy:    {}", self.edge_policy)
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str, line: usize) -> Result<T, ConfigError> {
    value.parse().map_err(|_| parse_error(key, value, line))
}

fn parse_error(key: &'static str, value: &str, line: usize) -> ConfigError {
    ConfigError::Parse {
        line,
        key,
        value: value.to_string(),
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}
