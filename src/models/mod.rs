pub mod absence;
pub mod clock_record;
pub mod coordination;
pub mod geofence;
pub mod user;
