use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Process-wide, admin-editable geofence settings. The server-side clock
/// validator and the client monitor both read this single persisted row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GeofenceConfig {
    pub enabled: bool,
    pub workplace_latitude: f64,
    pub workplace_longitude: f64,
    pub allowed_radius_meters: f64,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

impl GeofenceConfig {
    /// Range checks applied before any write: latitude within [-90,90],
    /// longitude within [-180,180], radius within [10,10000] meters.
    pub fn check_ranges(
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> Result<(), String> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {} outside [-90, 90]", latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude {} outside [-180, 180]", longitude));
        }
        if !radius_meters.is_finite() || !(10.0..=10_000.0).contains(&radius_meters) {
            return Err(format!("radius {} outside [10, 10000] meters", radius_meters));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_in_range_configuration() {
        assert!(GeofenceConfig::check_ranges(-15.7942, -47.8822, 100.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(GeofenceConfig::check_ranges(91.0, 0.0, 100.0).is_err());
        assert!(GeofenceConfig::check_ranges(0.0, -181.0, 100.0).is_err());
        assert!(GeofenceConfig::check_ranges(0.0, 0.0, 5.0).is_err());
        assert!(GeofenceConfig::check_ranges(0.0, 0.0, 20_000.0).is_err());
        assert!(GeofenceConfig::check_ranges(f64::NAN, 0.0, 100.0).is_err());
    }
}
