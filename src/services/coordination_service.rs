use crate::dto::coordination_dto::{CreateCoordinationPayload, UpdateCoordinationPayload};
use crate::error::{Error, Result};
use crate::models::coordination::Coordination;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CoordinationService {
    pool: PgPool,
}

impl CoordinationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCoordinationPayload) -> Result<Coordination> {
        let coordination = sqlx::query_as::<_, Coordination>(
            r#"
            INSERT INTO coordinations (name, description, coordinator_email, coordinator_name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.coordinator_email)
        .bind(&payload.coordinator_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(coordination)
    }

    /// Partial update. Setting `coordinator_email` replaces the single
    /// assigned coordinator; clearing it leaves the coordination headless.
    /// A rename is propagated to the cached membership names.
    pub async fn update(&self, id: Uuid, payload: UpdateCoordinationPayload) -> Result<Coordination> {
        let mut tx = self.pool.begin().await?;
        let coordination = sqlx::query_as::<_, Coordination>(
            r#"
            UPDATE coordinations
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                coordinator_email = CASE WHEN $6 THEN $4 ELSE coordinator_email END,
                coordinator_name = CASE WHEN $6 THEN $5 ELSE coordinator_name END,
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&payload.coordinator_email)
        .bind(&payload.coordinator_name)
        .bind(payload.set_coordinator)
        .bind(payload.is_active)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Coordination {} not found", id)))?;

        if payload.name.is_some() {
            sqlx::query(
                "UPDATE user_coordinations SET coordination_name = $2 WHERE coordination_id = $1",
            )
            .bind(id)
            .bind(&coordination.name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(coordination)
    }

    /// Soft delete: the coordination stops counting toward any coordinator's
    /// authority but its history remains.
    pub async fn deactivate(&self, id: Uuid) -> Result<Coordination> {
        let coordination = sqlx::query_as::<_, Coordination>(
            r#"
            UPDATE coordinations
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Coordination {} not found", id)))?;
        Ok(coordination)
    }

    pub async fn get(&self, id: Uuid) -> Result<Coordination> {
        let coordination =
            sqlx::query_as::<_, Coordination>("SELECT * FROM coordinations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Coordination {} not found", id)))?;
        Ok(coordination)
    }

    pub async fn list(&self, only_active: bool) -> Result<Vec<Coordination>> {
        let coordinations = if only_active {
            sqlx::query_as::<_, Coordination>(
                "SELECT * FROM coordinations WHERE is_active ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Coordination>("SELECT * FROM coordinations ORDER BY name")
                .fetch_all(&self.pool)
                .await?
        };
        Ok(coordinations)
    }
}
