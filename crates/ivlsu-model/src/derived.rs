//! Density and shear velocity derived from P-wave velocity.
//!
//! Both relations are Brocher (2005) fits that take vp in km/s.

/// Density in kg/m^3 from the Nafe-Drake curve (Brocher eq. 6).
///
/// The g/cm^3 polynomial is floored at 1.0 before scaling, so very slow
/// material never reads lighter than water.
pub fn density(vp: f64) -> f64 {
    let v = vp * 0.001;
    let rho = 1.6612 * v - 0.4721 * v.powi(2) + 0.0671 * v.powi(3) - 0.0043 * v.powi(4)
        + 0.000106 * v.powi(5);
    rho.max(1.0) * 1000.0
}

/// Shear velocity in m/s (Brocher eq. 1).
///
/// The fit is valid for vp between 1.5 and 8 km/s; outside that range the
/// result is returned as computed, without any floor.
pub fn shear_velocity(vp: f64) -> f64 {
    let v = vp * 0.001;
    let vs = 0.7858 - 1.2344 * v + 0.7949 * v.powi(2) - 0.1238 * v.powi(3) + 0.0064 * v.powi(4);
    vs * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_density_at_5000() {
        // 1.6612*5 - 0.4721*25 + 0.0671*125 - 0.0043*625 + 0.000106*3125
        assert_abs_diff_eq!(density(5000.0), 2534.75, epsilon = 1e-6);
        assert!(density(5000.0) >= 1000.0);
    }

    #[test]
    fn test_density_floor() {
        assert_eq!(density(0.0), 1000.0);
        assert_eq!(density(300.0), 1000.0);
        assert!(density(1500.0) > 1000.0);
    }

    #[test]
    fn test_shear_velocity() {
        // 0.7858 - 6.172 + 19.8725 - 15.475 + 4.0
        assert_abs_diff_eq!(shear_velocity(5000.0), 3011.3, epsilon = 1e-6);
        assert_abs_diff_eq!(shear_velocity(0.0), 785.8, epsilon = 1e-9);
    }

    #[test]
    fn test_shear_velocity_below_fit_range() {
        // Returned as computed even where the fit is not physical.
        assert_abs_diff_eq!(shear_velocity(1000.0), 228.9, epsilon = 1e-6);
    }
}
