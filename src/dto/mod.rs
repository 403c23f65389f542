pub mod absence_dto;
pub mod auth_dto;
pub mod clock_dto;
pub mod coordination_dto;
pub mod geofence_dto;
pub mod user_dto;
