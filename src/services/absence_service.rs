use crate::error::{Error, Result};
use crate::models::absence::{Absence, AbsenceStatus, AbsenceType};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AbsenceService {
    pool: PgPool,
}

impl AbsenceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn submit(
        &self,
        user_email: &str,
        date: NaiveDate,
        tipo: AbsenceType,
        justificativa: &str,
        link_documento: Option<&str>,
    ) -> Result<Absence> {
        let absence = sqlx::query_as::<_, Absence>(
            r#"
            INSERT INTO absences (user_email, date, tipo, justificativa, link_documento)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_email)
        .bind(date)
        .bind(tipo.as_str())
        .bind(justificativa)
        .bind(link_documento)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user = user_email, date = %date, tipo = tipo.as_str(), "absence submitted");
        Ok(absence)
    }

    pub async fn get(&self, id: Uuid) -> Result<Absence> {
        let absence = sqlx::query_as::<_, Absence>("SELECT * FROM absences WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Absence {} not found", id)))?;
        Ok(absence)
    }

    /// Listing restricted to the given owner emails unless unrestricted.
    pub async fn list(
        &self,
        emails: Option<&[String]>,
        status: Option<AbsenceStatus>,
    ) -> Result<Vec<Absence>> {
        let status_str = status.map(|s| s.as_str());
        let absences = match emails {
            None => {
                sqlx::query_as::<_, Absence>(
                    r#"
                    SELECT * FROM absences
                    WHERE ($1::text IS NULL OR status = $1)
                    ORDER BY submitted_at DESC
                    "#,
                )
                .bind(status_str)
                .fetch_all(&self.pool)
                .await?
            }
            Some(emails) => {
                sqlx::query_as::<_, Absence>(
                    r#"
                    SELECT * FROM absences
                    WHERE user_email = ANY($2)
                      AND ($1::text IS NULL OR status = $1)
                    ORDER BY submitted_at DESC
                    "#,
                )
                .bind(status_str)
                .bind(emails)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(absences)
    }

    /// Review transition. Only a pending absence can move, and only to
    /// aprovada or rejeitada.
    pub async fn review(
        &self,
        id: Uuid,
        status: AbsenceStatus,
        motivo: Option<&str>,
        reviewer_email: &str,
    ) -> Result<Absence> {
        if status == AbsenceStatus::Pendente {
            return Err(Error::BadRequest(
                "Review status must be 'aprovada' or 'rejeitada'".into(),
            ));
        }
        let existing = self.get(id).await?;
        if !existing.is_pending() {
            return Err(Error::BadRequest(format!(
                "Absence {} was already reviewed",
                id
            )));
        }

        let absence = sqlx::query_as::<_, Absence>(
            r#"
            UPDATE absences
            SET status = $2,
                motivo = $3,
                reviewed_at = NOW(),
                reviewed_by = $4
            WHERE id = $1 AND status = 'pendente'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(motivo)
        .bind(reviewer_email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::BadRequest(format!("Absence {} was already reviewed", id)))?;

        tracing::info!(
            absence = %id,
            status = status.as_str(),
            reviewer = reviewer_email,
            "absence reviewed"
        );
        Ok(absence)
    }
}
