//! Model initialization from an installation directory.

use std::fs::{self, File};
use std::path::Path;

use ivlsu_model::storage::write_values;
use ivlsu_model::{
    ConfigError, GeoPoint, LoadOptions, Model, ModelError, PropertiesRecord, StorageError,
    StorageMode,
};
use ivlsu_proj::{Projection, UtmProjection};
use tempfile::TempDir;

const NX: usize = 66;
const NY: usize = 86;
const NZ: usize = 9;

fn config_text(interpolation: &str) -> String {
    format!(
        "\
# Imperial Valley
utm_zone = 11
model_dir = ivlsu
nx = {NX}
ny = {NY}
nz = {NZ}
depth = 8000
depth_interval = 1000
top_left_corner_e = 589000
top_left_corner_n = 3692000
top_right_corner_e = 654000
top_right_corner_n = 3692000
bottom_left_corner_e = 589000
bottom_left_corner_n = 3607000
bottom_right_corner_e = 654000
bottom_right_corner_n = 3607000
interpolation = {interpolation}
"
    )
}

/// Velocity at node `(x, y, z)`: increases with depth, varies across the grid.
fn node_vp(x: usize, y: usize, z: usize) -> f32 {
    1600.0 + 500.0 * z as f32 + 3.0 * x as f32 + 0.5 * y as f32
}

fn grid_values() -> Vec<f32> {
    let mut values = Vec::with_capacity(NX * NY * NZ);
    for z in 0..NZ {
        for y in 0..NY {
            for x in 0..NX {
                values.push(node_vp(x, y, z));
            }
        }
    }
    values
}

/// Lay out `<root>/model/ivlsu/data/{config, ivlsu/vp.dat}`.
fn install(root: &Path, config: &str, values: &[f32]) {
    let data_dir = root.join("model").join("ivlsu").join("data");
    fs::create_dir_all(data_dir.join("ivlsu")).unwrap();
    fs::write(data_dir.join("config"), config).unwrap();
    write_values(File::create(data_dir.join("ivlsu").join("vp.dat")).unwrap(), values).unwrap();
}

/// Geographic coordinates of grid column `(x, y)`.
fn node_location(x: usize, y: usize) -> (f64, f64) {
    let proj = UtmProjection::for_zone(11).unwrap();
    proj.to_geographic(589_000.0 + 1000.0 * x as f64, 3_607_000.0 + 1000.0 * y as f64)
        .unwrap()
}

#[test]
fn test_init_and_query_nearest_node() {
    let dir = TempDir::new().unwrap();
    install(dir.path(), &config_text("off"), &grid_values());

    let model = Model::init(dir.path(), "ivlsu", &LoadOptions::default()).unwrap();
    assert_eq!(model.store().kind(), "in-memory");

    let cases = [(0, 0, 0), (12, 40, 3), (65, 85, 8), (33, 7, 5)];
    let points: Vec<GeoPoint> = cases
        .iter()
        .map(|&(x, y, z)| {
            let (lon, lat) = node_location(x, y);
            GeoPoint::new(lon, lat, 1000.0 * z as f64)
        })
        .collect();
    let mut out = vec![PropertiesRecord::default(); points.len()];
    let report = model.query(&points, &mut out).unwrap();

    assert_eq!(report.resolved, cases.len());
    for (&(x, y, z), record) in cases.iter().zip(&out) {
        assert_eq!(record.vp, f64::from(node_vp(x, y, z)), "node ({}, {}, {})", x, y, z);
        assert!(record.rho >= 1000.0);
    }
    model.finalize().unwrap();
}

#[test]
fn test_points_outside_survey() {
    let dir = TempDir::new().unwrap();
    install(dir.path(), &config_text("on"), &grid_values());
    let model = Model::init(dir.path(), "ivlsu", &LoadOptions::default()).unwrap();

    let points = [
        // West of the survey, in Los Angeles.
        GeoPoint::new(-118.25, 34.05, 1000.0),
        // Below the model.
        GeoPoint::new(-115.7, 33.0, 9000.0),
        // In the air.
        GeoPoint::new(-115.7, 33.0, -10.0),
        // Inside.
        GeoPoint::new(-115.7, 33.0, 2500.0),
    ];
    let mut out = vec![PropertiesRecord::default(); points.len()];
    let report = model.par_query(&points, &mut out).unwrap();

    assert_eq!(report.out_of_bounds, 2);
    assert_eq!(report.above_surface, 1);
    assert_eq!(report.resolved, 1);
    assert!(out[3].vp > 1600.0);
}

#[test]
fn test_file_backed_matches_in_memory() {
    let dir = TempDir::new().unwrap();
    install(dir.path(), &config_text("on"), &grid_values());

    let memory = Model::init(
        dir.path(),
        "ivlsu",
        &LoadOptions {
            storage: StorageMode::InMemory,
            memory_limit: None,
        },
    )
    .unwrap();
    // A budget below the model size forces the disk fallback.
    let disk = Model::init(
        dir.path(),
        "ivlsu",
        &LoadOptions {
            storage: StorageMode::Auto,
            memory_limit: Some(1024),
        },
    )
    .unwrap();
    assert_eq!(disk.store().kind(), "file-backed");

    let points: Vec<GeoPoint> = (0..200)
        .map(|i| {
            let f = i as f64;
            GeoPoint::new(-116.05 + f * 0.0035, 32.6 + f * 0.0037, f * 41.0)
        })
        .collect();
    let mut a = vec![PropertiesRecord::default(); points.len()];
    let mut b = vec![PropertiesRecord::default(); points.len()];
    memory.query(&points, &mut a).unwrap();
    disk.par_query(&points, &mut b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_missing_config() {
    let dir = TempDir::new().unwrap();
    let err = Model::init(dir.path(), "ivlsu", &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ModelError::Config(ConfigError::NotFound(_))));
}

#[test]
fn test_missing_data_file() {
    let dir = TempDir::new().unwrap();
    install(dir.path(), &config_text("on"), &grid_values());
    fs::remove_file(dir.path().join("model/ivlsu/data/ivlsu/vp.dat")).unwrap();

    let err = Model::init(dir.path(), "ivlsu", &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ModelError::Storage(StorageError::NotFound(_))));
}

#[test]
fn test_truncated_data_file() {
    let dir = TempDir::new().unwrap();
    let mut values = grid_values();
    values.pop();
    install(dir.path(), &config_text("on"), &values);

    let err = Model::init(dir.path(), "ivlsu", &LoadOptions::default()).unwrap_err();
    match err {
        ModelError::Storage(StorageError::SizeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, (NX * NY * NZ * 4) as u64);
            assert_eq!(actual, expected - 4);
        }
        other => panic!("expected size mismatch, got {:?}", other),
    }
}

#[test]
fn test_missing_key() {
    let dir = TempDir::new().unwrap();
    let text = config_text("on").replace("depth_interval = 1000\n", "");
    install(dir.path(), &text, &grid_values());

    let err = Model::init(dir.path(), "ivlsu", &LoadOptions::default()).unwrap_err();
    match err {
        ModelError::Config(ConfigError::MissingKeys(keys)) => assert_eq!(keys, vec!["depth_interval"]),
        other => panic!("expected missing key, got {:?}", other),
    }
}
