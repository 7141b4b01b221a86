//! Query point input.

use std::io::BufRead;

use ivlsu_model::GeoPoint;

use crate::CliError;

/// Read whitespace-separated `longitude latitude depth` lines.
///
/// Blank lines and `#` comments are skipped. The first malformed line aborts
/// the read.
pub fn read_points<R: BufRead>(reader: R) -> Result<Vec<GeoPoint>, CliError> {
    let mut points = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let point = parse_point(line).map_err(|reason| CliError::Input {
            line: i + 1,
            reason,
        })?;
        points.push(point);
    }
    Ok(points)
}

fn parse_point(line: &str) -> Result<GeoPoint, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(format!("expected 3 fields, found {}", fields.len()));
    }

    let mut values = [0.0f64; 3];
    for (value, (field, name)) in values
        .iter_mut()
        .zip(fields.iter().zip(["longitude", "latitude", "depth"]))
    {
        *value = field
            .parse()
            .map_err(|_| format!("invalid {} '{}'", name, field))?;
    }

    let [longitude, latitude, depth] = values;
    Ok(GeoPoint::new(longitude, latitude, depth))
}
