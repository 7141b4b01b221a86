//! Linear, bilinear and trilinear blending of property records.
//!
//! Node order within a plane is `[origin, +x, +y, +x+y]`. Trilinear input is
//! the upper plane followed by the lower plane.

use crate::types::PropertiesRecord;

/// `(1 - percent) * a + percent * b`, field by field.
pub fn linear(percent: f64, a: &PropertiesRecord, b: &PropertiesRecord) -> PropertiesRecord {
    let mix = |x: f64, y: f64| (1.0 - percent) * x + percent * y;
    PropertiesRecord {
        vp: mix(a.vp, b.vp),
        vs: mix(a.vs, b.vs),
        rho: mix(a.rho, b.rho),
        qp: mix(a.qp, b.qp),
        qs: mix(a.qs, b.qs),
    }
}

/// Blend along x at both y rows, then along y.
pub fn bilinear(x_percent: f64, y_percent: f64, nodes: &[PropertiesRecord; 4]) -> PropertiesRecord {
    let near = linear(x_percent, &nodes[0], &nodes[1]);
    let far = linear(x_percent, &nodes[2], &nodes[3]);
    linear(y_percent, &near, &far)
}

/// Blend each plane bilinearly, then blend the planes along z.
pub fn trilinear(
    x_percent: f64,
    y_percent: f64,
    z_percent: f64,
    nodes: &[PropertiesRecord; 8],
) -> PropertiesRecord {
    let [a0, a1, a2, a3, b0, b1, b2, b3] = *nodes;
    let upper = bilinear(x_percent, y_percent, &[a0, a1, a2, a3]);
    let lower = bilinear(x_percent, y_percent, &[b0, b1, b2, b3]);
    linear(z_percent, &upper, &lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rec(vp: f64) -> PropertiesRecord {
        PropertiesRecord {
            vp,
            vs: vp * 0.5,
            rho: vp * 0.8,
            qp: 0.0,
            qs: 0.0,
        }
    }

    fn plane(base: f64) -> [PropertiesRecord; 4] {
        [rec(base), rec(base + 100.0), rec(base + 200.0), rec(base + 300.0)]
    }

    fn cube() -> [PropertiesRecord; 8] {
        let [a0, a1, a2, a3] = plane(1500.0);
        let [b0, b1, b2, b3] = plane(3100.0);
        [a0, a1, a2, a3, b0, b1, b2, b3]
    }

    #[test]
    fn test_linear_endpoints_exact() {
        let a = rec(1733.25);
        let b = rec(6021.7);
        assert_eq!(linear(0.0, &a, &b), a);
        assert_eq!(linear(1.0, &a, &b), b);
    }

    #[test]
    fn test_linear_midpoint() {
        let mid = linear(0.25, &rec(2000.0), &rec(4000.0));
        assert_relative_eq!(mid.vp, 2500.0);
        assert_relative_eq!(mid.vs, 1250.0);
        assert_relative_eq!(mid.rho, 2000.0);
    }

    #[test]
    fn test_bilinear_corners() {
        let nodes = plane(1500.0);
        assert_eq!(bilinear(0.0, 0.0, &nodes), nodes[0]);
        assert_eq!(bilinear(1.0, 0.0, &nodes), nodes[1]);
        assert_eq!(bilinear(0.0, 1.0, &nodes), nodes[2]);
        assert_eq!(bilinear(1.0, 1.0, &nodes), nodes[3]);
    }

    #[test]
    fn test_bilinear_center_is_average() {
        let nodes = plane(1500.0);
        let center = bilinear(0.5, 0.5, &nodes);
        assert_relative_eq!(center.vp, 1650.0);
    }

    #[test]
    fn test_trilinear_corners() {
        let nodes = cube();
        assert_eq!(trilinear(0.0, 0.0, 0.0, &nodes), nodes[0]);
        assert_eq!(trilinear(1.0, 1.0, 0.0, &nodes), nodes[3]);
        assert_eq!(trilinear(0.0, 0.0, 1.0, &nodes), nodes[4]);
        assert_eq!(trilinear(1.0, 1.0, 1.0, &nodes), nodes[7]);
    }

    #[test]
    fn test_trilinear_center_is_average() {
        let nodes = cube();
        let mean = nodes.iter().map(|n| n.vp).sum::<f64>() / 8.0;
        assert_relative_eq!(trilinear(0.5, 0.5, 0.5, &nodes).vp, mean);
    }

    #[test]
    fn test_trilinear_z_weight_favors_lower_plane() {
        let nodes = cube();
        let v = trilinear(0.0, 0.0, 0.75, &nodes).vp;
        assert_relative_eq!(v, 0.25 * 1500.0 + 0.75 * 3100.0);
    }
}
