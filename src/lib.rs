pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod monitor;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    absence_service::AbsenceService, clock_service::ClockService,
    coordination_service::CoordinationService, geofence_service::GeofenceService,
    scope::ScopeService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub coordination_service: CoordinationService,
    pub clock_service: ClockService,
    pub absence_service: AbsenceService,
    pub geofence_service: GeofenceService,
    pub scope_service: ScopeService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let user_service = UserService::new(pool.clone());
        let coordination_service = CoordinationService::new(pool.clone());
        let clock_service = ClockService::new(pool.clone());
        let absence_service = AbsenceService::new(pool.clone());
        let geofence_service = GeofenceService::new(pool.clone());
        let scope_service = ScopeService::new(pool.clone());

        Self {
            pool,
            user_service,
            coordination_service,
            clock_service,
            absence_service,
            geofence_service,
            scope_service,
        }
    }
}
