pub mod absences;
pub mod auth;
pub mod clock;
pub mod coordinations;
pub mod geofence;
pub mod health;
pub mod reports;
pub mod users;
