use serde::{Deserialize, Serialize};

/// Wire form of the geofence configuration, range-checked by the service
/// before persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceConfigPayload {
    pub enabled: bool,
    #[serde(rename = "workplaceLatitude")]
    pub workplace_latitude: f64,
    #[serde(rename = "workplaceLongitude")]
    pub workplace_longitude: f64,
    #[serde(rename = "allowedRadiusMeters")]
    pub allowed_radius_meters: f64,
}
