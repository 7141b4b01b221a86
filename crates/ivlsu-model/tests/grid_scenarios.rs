//! End-to-end queries against a 2 x 2 x 2 grid on a unit square.
//!
//! A planar projection passes coordinates straight through, so query points
//! land exactly where the test puts them.

use approx::assert_relative_eq;
use ivlsu_model::derived::{density, shear_velocity};
use ivlsu_model::{
    Corner, EdgePolicy, GeoPoint, GridConfiguration, GridDims, Model, PointError, PointOutcome,
    Projection, ProjectionError, PropertiesRecord, VelocityStore, NOT_AVAILABLE,
};

#[derive(Debug)]
struct Planar;

impl Projection for Planar {
    fn to_projected(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        Ok((lon, lat))
    }

    fn to_geographic(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjectionError> {
        Ok((easting, northing))
    }
}

/// Node values; index = z*4 + y*2 + x.
const VALUES: [f32; 8] = [1000.0, 1100.0, 1200.0, 1300.0, 2000.0, 2100.0, 2200.0, 2300.0];

fn unit_config(interpolation: bool, edge_policy: EdgePolicy) -> GridConfiguration {
    GridConfiguration {
        utm_zone: 11,
        model_dir: "unit".to_string(),
        dims: GridDims::new(2, 2, 2),
        depth: 2000.0,
        depth_interval: 1000.0,
        top_left: Corner::new(0.0, 1.0),
        top_right: Corner::new(1.0, 1.0),
        bottom_left: Corner::new(0.0, 0.0),
        bottom_right: Corner::new(1.0, 0.0),
        interpolation,
        edge_policy,
    }
}

fn unit_cube(interpolation: bool, edge_policy: EdgePolicy) -> Model {
    let config = unit_config(interpolation, edge_policy);
    Model::from_parts(config, VelocityStore::from_values(VALUES.to_vec()), Box::new(Planar)).unwrap()
}

fn query_one(model: &Model, lon: f64, lat: f64, depth: f64) -> (PointOutcome, PropertiesRecord) {
    let mut out = PropertiesRecord::default();
    let outcome = model.query_point(&GeoPoint::new(lon, lat, depth), &mut out);
    (outcome, out)
}

#[test]
fn test_center_is_average_of_all_nodes() {
    let model = unit_cube(true, EdgePolicy::Unchecked);
    let (outcome, out) = query_one(&model, 0.5, 0.5, 1500.0);

    let mean = VALUES.iter().map(|v| f64::from(*v)).sum::<f64>() / 8.0;
    assert!(matches!(outcome, PointOutcome::Resolved));
    assert_relative_eq!(out.vp, mean);
    assert_relative_eq!(out.rho, density(mean));
    assert_relative_eq!(out.vs, shear_velocity(mean));
}

#[test]
fn test_center_without_interpolation_is_a_raw_node() {
    let model = unit_cube(false, EdgePolicy::Unchecked);
    let (_, out) = query_one(&model, 0.5, 0.5, 1500.0);

    assert!(VALUES.iter().any(|v| f64::from(*v) == out.vp), "vp {}", out.vp);
    // Ties round to the even index, so the nearest node is (0, 0, 1).
    assert_eq!(out.vp, 2000.0);
}

#[test]
fn test_exact_node_unchanged_by_interpolation() {
    let on = unit_cube(true, EdgePolicy::Unchecked);
    let off = unit_cube(false, EdgePolicy::Unchecked);

    for (lon, lat, depth, expected) in [
        (0.0, 0.0, 0.0, 1000.0),
        (1.0, 0.0, 0.0, 1100.0),
        (1.0, 1.0, 1000.0, 2300.0),
        (0.0, 1.0, 1000.0, 2200.0),
    ] {
        let (_, a) = query_one(&on, lon, lat, depth);
        let (_, b) = query_one(&off, lon, lat, depth);
        assert_eq!(a.vp, expected, "interpolated at ({}, {}, {})", lon, lat, depth);
        assert_eq!(b.vp, expected, "nearest at ({}, {}, {})", lon, lat, depth);
    }
}

#[test]
fn test_surface_uses_top_layer_only() {
    let model = unit_cube(true, EdgePolicy::Unchecked);
    let (_, out) = query_one(&model, 0.5, 0.5, 0.0);
    assert_relative_eq!(out.vp, 1150.0);
}

#[test]
fn test_sentinels() {
    let model = unit_cube(true, EdgePolicy::Unchecked);

    let (outcome, out) = query_one(&model, 0.5, 0.5, -1.0);
    assert!(matches!(outcome, PointOutcome::AboveSurface));
    assert_eq!(out, PropertiesRecord::SENTINEL);

    for (lon, lat, depth) in [(0.5, 0.5, 2000.5), (-0.6, 0.5, 10.0), (0.5, 1.6, 10.0)] {
        let mut out = PropertiesRecord {
            qp: 7.0,
            qs: 3.0,
            ..Default::default()
        };
        let outcome = model.query_point(&GeoPoint::new(lon, lat, depth), &mut out);
        assert!(matches!(outcome, PointOutcome::OutOfBounds));
        assert_eq!((out.vp, out.vs, out.rho), (NOT_AVAILABLE, NOT_AVAILABLE, NOT_AVAILABLE));
        assert_eq!((out.qp, out.qs), (7.0, 3.0));
    }
}

#[test]
fn test_resolved_point_keeps_caller_q() {
    let model = unit_cube(true, EdgePolicy::Unchecked);
    let mut out = PropertiesRecord {
        qp: 7.0,
        qs: 3.0,
        ..Default::default()
    };
    model.query_point(&GeoPoint::new(0.25, 0.75, 1250.0), &mut out);
    assert!(out.is_available());
    assert_eq!((out.qp, out.qs), (7.0, 3.0));
}

#[test]
fn test_edge_policies_at_shallow_depth() {
    // Halfway to the first layer boundary the lower plane is layer -1.
    let point = (0.5, 0.5, 500.0);

    let (_, unchecked) = query_one(&unit_cube(true, EdgePolicy::Unchecked), point.0, point.1, point.2);
    assert_relative_eq!(unchecked.vp, 575.0);

    let (_, clamped) = query_one(&unit_cube(true, EdgePolicy::Clamp), point.0, point.1, point.2);
    assert_relative_eq!(clamped.vp, 1150.0);

    let (outcome, rejected) = query_one(&unit_cube(true, EdgePolicy::Reject), point.0, point.1, point.2);
    assert!(matches!(
        outcome,
        PointOutcome::Failed(PointError::EdgeNeighbor { z: -1, .. })
    ));
    assert_eq!(rejected, PropertiesRecord::SENTINEL);
}

#[test]
fn test_edge_policies_on_far_column() {
    // On the last column the +x neighbor carries zero weight.
    for policy in [EdgePolicy::Unchecked, EdgePolicy::Clamp] {
        let (_, out) = query_one(&unit_cube(true, policy), 1.0, 0.5, 1500.0);
        assert_relative_eq!(out.vp, 1700.0);
    }

    let (outcome, _) = query_one(&unit_cube(true, EdgePolicy::Reject), 1.0, 0.5, 1500.0);
    assert!(matches!(
        outcome,
        PointOutcome::Failed(PointError::EdgeNeighbor { x: 2, .. })
    ));
}

#[test]
fn test_batch_report() {
    let model = unit_cube(true, EdgePolicy::Reject);
    let points = [
        GeoPoint::new(0.5, 0.5, 1500.0),
        GeoPoint::new(0.5, 0.5, -5.0),
        GeoPoint::new(3.0, 0.5, 1500.0),
        GeoPoint::new(1.0, 1.0, 1500.0),
    ];
    let mut out = vec![PropertiesRecord::default(); points.len()];
    let report = model.par_query(&points, &mut out).unwrap();

    assert_eq!(report.points, 4);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.above_surface, 1);
    assert_eq!(report.out_of_bounds, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, 3);
    assert_eq!(report.not_available(), 3);
}

#[test]
fn test_unchecked_depth_past_index_range_reads_zero() {
    // A configured depth this large puts z far beyond any addressable node.
    for interpolation in [false, true] {
        let mut config = unit_config(interpolation, EdgePolicy::Unchecked);
        config.depth = 1e30;
        let model =
            Model::from_parts(config, VelocityStore::from_values(VALUES.to_vec()), Box::new(Planar)).unwrap();

        let (outcome, out) = query_one(&model, 0.0, 0.0, 1e25);
        assert!(matches!(outcome, PointOutcome::Resolved));
        assert_eq!(out.vp, 0.0);
        assert_eq!(out.rho, density(0.0));
    }

    let mut config = unit_config(false, EdgePolicy::Reject);
    config.depth = 1e30;
    let model = Model::from_parts(config, VelocityStore::from_values(VALUES.to_vec()), Box::new(Planar)).unwrap();
    let (outcome, out) = query_one(&model, 0.0, 0.0, 1e25);
    assert!(matches!(outcome, PointOutcome::Failed(PointError::EdgeNeighbor { .. })));
    assert_eq!(out, PropertiesRecord::SENTINEL);
}

#[test]
fn test_rotated_grid_blends_with_unrotated_weights() {
    // 3 km x 2 km rectangle rotated 30 degrees clockwise, 1 km node spacing.
    let theta = 30f64.to_radians();
    let (s, c) = theta.sin_cos();
    let bl = Corner::new(500_000.0, 3_600_000.0);
    let tl = Corner::new(bl.easting + 2000.0 * s, bl.northing + 2000.0 * c);
    let br = Corner::new(bl.easting + 3000.0 * c, bl.northing - 3000.0 * s);
    let tr = Corner::new(tl.easting + 3000.0 * c, tl.northing - 3000.0 * s);
    let config = GridConfiguration {
        utm_zone: 11,
        model_dir: "rotated".to_string(),
        dims: GridDims::new(4, 3, 2),
        depth: 2000.0,
        depth_interval: 1000.0,
        top_left: tl,
        top_right: tr,
        bottom_left: bl,
        bottom_right: br,
        interpolation: true,
        edge_policy: EdgePolicy::Reject,
    };

    // vp = 1000 + 10x + 100y + 1000z, linear in every index.
    let values: Vec<f32> = (0..2)
        .flat_map(|z| (0..3).flat_map(move |y| (0..4).map(move |x| (1000 + 10 * x + 100 * y + 1000 * z) as f32)))
        .collect();
    let model = Model::from_parts(config, VelocityStore::from_values(values), Box::new(Planar)).unwrap();

    // (1200, 1400) in rectangle axes: nodes x 1..2, y 1..2, layers 1 and 0.
    let (x, y) = (1200.0, 1400.0);
    let (outcome, out) = query_one(
        &model,
        bl.easting + x * c + y * s,
        bl.northing - x * s + y * c,
        1250.0,
    );
    assert!(matches!(outcome, PointOutcome::Resolved));

    // x and y weights are 0.7392 and 0.6124, from the unrotated offset
    // (1739.23, 612.44); z_percent 0.25 weights layer 0.
    assert_relative_eq!(out.vp, 1928.6358613752557, epsilon = 1e-6);
    // Weights taken from the rotated offset would give 1902.
    assert!((out.vp - 1902.0).abs() > 1.0);
}
