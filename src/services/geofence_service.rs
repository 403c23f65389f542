use crate::error::{Error, Result};
use crate::models::geofence::GeofenceConfig;
use sqlx::PgPool;

/// Persistence for the single admin-editable geofence row. Both the clock
/// validator and the client monitor load from here, never from a second
/// source.
#[derive(Clone)]
pub struct GeofenceService {
    pool: PgPool,
}

impl GeofenceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<GeofenceConfig> {
        let config = sqlx::query_as::<_, GeofenceConfig>(
            r#"
            SELECT enabled, workplace_latitude, workplace_longitude,
                   allowed_radius_meters, updated_at, updated_by
            FROM geofence_config
            WHERE id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(config)
    }

    pub async fn update(
        &self,
        enabled: bool,
        workplace_latitude: f64,
        workplace_longitude: f64,
        allowed_radius_meters: f64,
        updated_by: &str,
    ) -> Result<GeofenceConfig> {
        GeofenceConfig::check_ranges(workplace_latitude, workplace_longitude, allowed_radius_meters)
            .map_err(Error::BadRequest)?;

        let config = sqlx::query_as::<_, GeofenceConfig>(
            r#"
            UPDATE geofence_config
            SET enabled = $1,
                workplace_latitude = $2,
                workplace_longitude = $3,
                allowed_radius_meters = $4,
                updated_at = NOW(),
                updated_by = $5
            WHERE id
            RETURNING enabled, workplace_latitude, workplace_longitude,
                      allowed_radius_meters, updated_at, updated_by
            "#,
        )
        .bind(enabled)
        .bind(workplace_latitude)
        .bind(workplace_longitude)
        .bind(allowed_radius_meters)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            enabled,
            latitude = workplace_latitude,
            longitude = workplace_longitude,
            radius = allowed_radius_meters,
            by = updated_by,
            "geofence configuration updated"
        );
        Ok(config)
    }
}
