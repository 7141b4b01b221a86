//! Query result output.

use std::io::Write;

use ivlsu_model::{GeoPoint, PropertiesRecord};
use serde::Serialize;

use crate::CliError;

/// One result row.
#[derive(Debug, Serialize)]
pub struct ResultRow {
    pub longitude: f64,
    pub latitude: f64,
    pub depth: f64,
    pub vp: f64,
    pub vs: f64,
    pub rho: f64,
}

impl ResultRow {
    pub fn new(point: &GeoPoint, record: &PropertiesRecord) -> Self {
        Self {
            longitude: point.longitude,
            latitude: point.latitude,
            depth: point.depth,
            vp: record.vp,
            vs: record.vs,
            rho: record.rho,
        }
    }
}

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `lon lat depth vp vs rho`, four decimals each.
    Text,
    /// One JSON object per line.
    JsonLines,
}

/// Write one row per point.
pub fn write_results<W: Write>(
    mut writer: W,
    format: Format,
    points: &[GeoPoint],
    records: &[PropertiesRecord],
) -> Result<(), CliError> {
    for (point, record) in points.iter().zip(records) {
        let row = ResultRow::new(point, record);
        match format {
            Format::Text => writeln!(
                writer,
                "{:.4} {:.4} {:.4} {:.4} {:.4} {:.4}",
                row.longitude, row.latitude, row.depth, row.vp, row.vs, row.rho
            )?,
            Format::JsonLines => {
                serde_json::to_writer(&mut writer, &row)?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
