/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two (latitude, longitude) pairs
/// in decimal degrees, via the haversine formula. The asin argument is
/// clamped so floating error near antipodal points cannot produce NaN.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let arg = h.sqrt().clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * arg.asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero() {
        assert_eq!(distance_meters(-15.7942, -47.8822, -15.7942, -47.8822), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = distance_meters(-15.7942, -47.8822, -22.9068, -43.1729);
        let ba = distance_meters(-22.9068, -43.1729, -15.7942, -47.8822);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn antipodal_points_are_finite() {
        let d = distance_meters(45.0, 90.0, -45.0, -90.0);
        assert!(d.is_finite());
        // Half the Earth's mean circumference.
        assert!((d - std::f64::consts::PI * 6_371_000.0).abs() < 1_000.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn short_distances_match_known_values() {
        // Two points ~157m apart near Brasília.
        let d = distance_meters(-15.7942, -47.8822, -15.7952, -47.8812);
        assert!(d > 120.0 && d < 200.0);
    }
}
