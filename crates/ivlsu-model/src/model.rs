//! Model lifecycle and the per-point query.

use std::path::Path;

use ivlsu_proj::{Projection, UtmProjection};
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::config::GridConfiguration;
use crate::derived::{density, shear_velocity};
use crate::error::{ModelError, PointError, Result};
use crate::geometry::{GridPosition, SurveyGeometry};
use crate::interpolate::{bilinear, trilinear};
use crate::sampler::PropertySampler;
use crate::storage::{LoadOptions, VelocityStore, DATA_FILE_NAME};
use crate::telemetry;
use crate::types::{GeoPoint, PropertiesRecord};

/// Identifying string of this model.
pub const MODEL_VERSION: &str = "IMPERIAL";

/// What happened to a single query point.
#[derive(Debug)]
pub enum PointOutcome {
    /// Properties were computed.
    Resolved,
    /// Negative depth; every field holds the sentinel.
    AboveSurface,
    /// Outside the grid; vp, vs and rho hold the sentinel.
    OutOfBounds,
    /// The point could not be evaluated; every field holds the sentinel.
    Failed(PointError),
}

impl PointOutcome {
    /// Metric label for outcomes that produce a sentinel.
    pub fn not_available_reason(&self) -> Option<&'static str> {
        match self {
            PointOutcome::Resolved => None,
            PointOutcome::AboveSurface => Some("above_surface"),
            PointOutcome::OutOfBounds => Some("out_of_bounds"),
            PointOutcome::Failed(e) => Some(e.reason()),
        }
    }
}

/// Summary of a batch query.
#[derive(Debug, Default)]
pub struct QueryReport {
    pub points: usize,
    pub resolved: usize,
    pub above_surface: usize,
    pub out_of_bounds: usize,
    /// Points that failed, by input index.
    pub failures: Vec<(usize, PointError)>,
}

impl QueryReport {
    fn record(&mut self, index: usize, outcome: PointOutcome) {
        self.points += 1;
        match outcome {
            PointOutcome::Resolved => self.resolved += 1,
            PointOutcome::AboveSurface => self.above_surface += 1,
            PointOutcome::OutOfBounds => self.out_of_bounds += 1,
            PointOutcome::Failed(e) => self.failures.push((index, e)),
        }
    }

    /// Points answered with a sentinel, for any reason.
    pub fn not_available(&self) -> usize {
        self.points - self.resolved
    }
}

/// A loaded velocity model.
///
/// Immutable once built; queries take `&self` and may run concurrently.
#[derive(Debug)]
pub struct Model {
    config: GridConfiguration,
    geometry: SurveyGeometry,
    store: VelocityStore,
    projection: Box<dyn Projection>,
}

impl Model {
    /// Load the model labelled `label` under an installation root.
    ///
    /// Reads `<install_dir>/model/<label>/data/config` and the velocity data
    /// in `<model_dir>/vp.dat` beside it.
    pub fn init<P: AsRef<Path>>(install_dir: P, label: &str, options: &LoadOptions) -> Result<Self> {
        let data_dir = install_dir.as_ref().join("model").join(label).join("data");
        let config = GridConfiguration::from_file(data_dir.join("config"))?;

        let data_path = data_dir.join(&config.model_dir).join(DATA_FILE_NAME);
        let store = VelocityStore::load(&data_path, config.dims, options)?;

        let projection = UtmProjection::for_zone(config.utm_zone)?;

        info!(
            label,
            nx = config.dims.nx,
            ny = config.dims.ny,
            nz = config.dims.nz,
            storage = store.kind(),
            interpolation = config.interpolation,
            "Model initialized"
        );

        Self::from_parts(config, store, Box::new(projection))
    }

    /// Assemble a model from already-loaded parts.
    pub fn from_parts(
        config: GridConfiguration,
        store: VelocityStore,
        projection: Box<dyn Projection>,
    ) -> Result<Self> {
        config.validate()?;

        let expected = config.dims.node_count().unwrap_or(usize::MAX);
        if store.len() != expected {
            return Err(ModelError::StoreSizeMismatch {
                expected,
                actual: store.len(),
            });
        }

        let geometry = SurveyGeometry::new(&config);
        debug!(
            rotation_deg = geometry.rotation.to_degrees(),
            width_m = geometry.total_width,
            height_m = geometry.total_height,
            "Survey geometry derived"
        );
        telemetry::record_resident_bytes(store.resident_bytes());

        Ok(Self {
            config,
            geometry,
            store,
            projection,
        })
    }

    pub fn config(&self) -> &GridConfiguration {
        &self.config
    }

    pub fn geometry(&self) -> &SurveyGeometry {
        &self.geometry
    }

    pub fn store(&self) -> &VelocityStore {
        &self.store
    }

    /// Query a batch of points in order.
    ///
    /// `out` must be the same length as `points`. Per-point failures are
    /// reported, never returned as an error.
    pub fn query(&self, points: &[GeoPoint], out: &mut [PropertiesRecord]) -> Result<QueryReport> {
        check_lengths(points, out)?;
        let mut report = QueryReport::default();
        for (i, (point, record)) in points.iter().zip(out.iter_mut()).enumerate() {
            report.record(i, self.query_point(point, record));
        }
        Ok(report)
    }

    /// Query a batch of points on the rayon thread pool.
    pub fn par_query(&self, points: &[GeoPoint], out: &mut [PropertiesRecord]) -> Result<QueryReport> {
        check_lengths(points, out)?;
        let outcomes: Vec<PointOutcome> = points
            .par_iter()
            .zip(out.par_iter_mut())
            .map(|(point, record)| self.query_point(point, record))
            .collect();

        let mut report = QueryReport::default();
        for (i, outcome) in outcomes.into_iter().enumerate() {
            report.record(i, outcome);
        }
        Ok(report)
    }

    /// Query one point, writing its properties into `out`.
    ///
    /// `qp` and `qs` are only written when the whole record becomes the
    /// sentinel.
    pub fn query_point(&self, point: &GeoPoint, out: &mut PropertiesRecord) -> PointOutcome {
        let outcome = self.resolve(point, out);
        telemetry::record_outcome(&outcome);
        outcome
    }

    fn resolve(&self, point: &GeoPoint, out: &mut PropertiesRecord) -> PointOutcome {
        if point.depth < 0.0 {
            *out = PropertiesRecord::SENTINEL;
            return PointOutcome::AboveSurface;
        }

        let position = match self.geometry.map_point(self.projection.as_ref(), point) {
            Ok(position) => position,
            Err(e) => {
                warn!(lon = point.longitude, lat = point.latitude, error = %e, "Projection failed");
                *out = PropertiesRecord::SENTINEL;
                return PointOutcome::Failed(e.into());
            }
        };

        if self.out_of_bounds(point.depth, &position) {
            out.mark_out_of_bounds();
            return PointOutcome::OutOfBounds;
        }

        match self.sample(&position) {
            Ok(vp) => {
                trace!(
                    x = position.x_index,
                    y = position.y_index,
                    z = position.z_index,
                    vp,
                    "Point resolved"
                );
                out.vp = vp;
                out.rho = density(vp);
                out.vs = shear_velocity(vp);
                PointOutcome::Resolved
            }
            Err(e) => {
                warn!(
                    lon = point.longitude,
                    lat = point.latitude,
                    depth = point.depth,
                    error = %e,
                    "Sampling failed"
                );
                *out = PropertiesRecord::SENTINEL;
                PointOutcome::Failed(e)
            }
        }
    }

    fn out_of_bounds(&self, depth: f64, pos: &GridPosition) -> bool {
        let dims = self.config.dims;
        !depth.is_finite()
            || depth > self.config.depth
            || pos.x_index < 0
            || pos.x_index > dims.nx as i64 - 1
            || pos.y_index < 0
            || pos.y_index > dims.ny as i64 - 1
            || pos.z_index < 0
    }

    /// Sampled (and possibly interpolated) vp at a position inside the grid.
    fn sample(&self, pos: &GridPosition) -> std::result::Result<f64, PointError> {
        let sampler = PropertySampler::new(&self.store, self.config.dims, self.config.edge_policy);
        let (x, y, z) = (pos.x_index, pos.y_index, pos.z_index);
        let interpolate = self.config.interpolation;

        let record = if z == 0 && pos.z_percent == 0.0 {
            // At the surface only the top layer takes part.
            if interpolate {
                bilinear(pos.x_percent, pos.y_percent, &sampler.read_plane(x, y, 0)?)
            } else {
                sampler.read_node(x, y, 0)?
            }
        } else if interpolate {
            trilinear(
                pos.x_percent,
                pos.y_percent,
                pos.z_percent,
                &sampler.read_cell(x, y, z)?,
            )
        } else {
            sampler.read_node(x, y, z)?
        };

        Ok(record.vp)
    }

    /// Release the model.
    pub fn finalize(self) -> Result<()> {
        info!(storage = self.store.kind(), "Model finalized");
        telemetry::record_resident_bytes(0);
        Ok(())
    }

    /// Identifying string of the model.
    pub fn version() -> &'static str {
        MODEL_VERSION
    }

    /// Human-readable configuration summary.
    pub fn info(&self) -> String {
        format!(
            "{} velocity model\n{}\nStorage:        {} ({} values)\nRotation:       {:.4} deg",
            MODEL_VERSION,
            self.config,
            self.store.kind(),
            self.store.len(),
            self.geometry.rotation.to_degrees()
        )
    }
}

fn check_lengths(points: &[GeoPoint], out: &[PropertiesRecord]) -> Result<()> {
    if points.len() != out.len() {
        return Err(ModelError::OutputLengthMismatch {
            points: points.len(),
            outputs: out.len(),
        });
    }
    Ok(())
}
