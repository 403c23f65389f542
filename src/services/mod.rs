pub mod absence_service;
pub mod clock_service;
pub mod coordination_service;
pub mod export_service;
pub mod geofence_service;
pub mod scope;
pub mod user_service;
