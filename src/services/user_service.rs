use crate::error::{Error, Result};
use crate::models::user::{CoordinationMembership, Nivel, User, UserStatus};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// First successful sign-in creates the user as a pending collaborator;
    /// later sign-ins only refresh the display name.
    pub async fn upsert_on_signin(&self, email: &str, name: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", email)))?;
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Administrator approval: assigns levels, activates the account and
    /// replaces coordination memberships in one transaction.
    pub async fn approve(
        &self,
        id: Uuid,
        levels: Vec<Nivel>,
        active_level: Option<Nivel>,
        collaborator_type: Option<String>,
        coordination_ids: Vec<Uuid>,
    ) -> Result<User> {
        if levels.is_empty() {
            return Err(Error::BadRequest("At least one level must be assigned".into()));
        }
        let active = active_level.unwrap_or(levels[0]);
        if !levels.contains(&active) {
            return Err(Error::BadRequest(format!(
                "Active level '{}' must be one of the assigned levels",
                active
            )));
        }

        let mut tx = self.pool.begin().await?;
        let level_strings: Vec<String> = levels.iter().map(|l| l.as_str().to_string()).collect();
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET levels = $2,
                active_level = $3,
                status = $4,
                collaborator_type = COALESCE($5, collaborator_type),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&level_strings)
        .bind(active.as_str())
        .bind(UserStatus::Active.as_str())
        .bind(collaborator_type)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;

        replace_memberships(&mut tx, id, &coordination_ids).await?;
        tx.commit().await?;

        tracing::info!(user = %user.email, levels = ?level_strings, "user approved");
        Ok(user)
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(UserStatus::Inactive.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;
        tracing::info!(user = %user.email, "user deactivated");
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        collaborator_type: Option<String>,
        work_schedule: Option<JsonValue>,
        coordination_ids: Option<Vec<Uuid>>,
    ) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET collaborator_type = COALESCE($2, collaborator_type),
                work_schedule = COALESCE($3, work_schedule),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(collaborator_type)
        .bind(work_schedule)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))?;

        if let Some(ids) = coordination_ids {
            replace_memberships(&mut tx, id, &ids).await?;
        }
        tx.commit().await?;
        Ok(user)
    }

    /// Switching the active level is only valid within the assigned set;
    /// anything else is UNAUTHORIZED_NIVEL.
    pub async fn switch_level(&self, email: &str, requested: Nivel) -> Result<User> {
        let user = self.get_by_email(email).await?;
        if !user.has_level(requested) {
            return Err(Error::UnauthorizedNivel(requested.as_str().to_string()));
        }
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET active_level = $2, updated_at = NOW()
            WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(requested.as_str())
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user = email, level = %requested, "active level switched");
        Ok(user)
    }

    pub async fn memberships_of(&self, user_id: Uuid) -> Result<Vec<CoordinationMembership>> {
        let memberships = sqlx::query_as::<_, CoordinationMembership>(
            "SELECT * FROM user_coordinations WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(memberships)
    }

    /// user id -> coordination ids, for the in-memory employee filter.
    pub async fn memberships_by_user(&self) -> Result<HashMap<Uuid, Vec<Uuid>>> {
        let rows = sqlx::query_as::<_, CoordinationMembership>("SELECT * FROM user_coordinations")
            .fetch_all(&self.pool)
            .await?;
        let mut map: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in rows {
            map.entry(row.user_id).or_default().push(row.coordination_id);
        }
        Ok(map)
    }
}

async fn replace_memberships(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Uuid,
    coordination_ids: &[Uuid],
) -> Result<()> {
    sqlx::query("DELETE FROM user_coordinations WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    for coordination_id in coordination_ids {
        let inserted = sqlx::query(
            r#"
            INSERT INTO user_coordinations (user_id, coordination_id, coordination_name)
            SELECT $1, id, name FROM coordinations WHERE id = $2
            "#,
        )
        .bind(user_id)
        .bind(coordination_id)
        .execute(&mut **tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(Error::BadRequest(format!(
                "Coordination {} does not exist",
                coordination_id
            )));
        }
    }
    Ok(())
}
