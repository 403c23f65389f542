use crate::models::absence::{Absence, AbsenceStatus, AbsenceType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAbsencePayload {
    pub date: NaiveDate,
    pub tipo: AbsenceType,
    #[validate(length(min = 1))]
    pub justificativa: String,
    #[serde(rename = "linkDocumento")]
    #[validate(length(min = 1))]
    pub link_documento: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAbsenceResponse {
    pub id: Uuid,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbsenceListQuery {
    pub status: Option<AbsenceStatus>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewAbsencePayload {
    #[serde(rename = "ausenciaId")]
    pub ausencia_id: Uuid,
    pub status: AbsenceStatus,
    #[validate(length(min = 1))]
    pub motivo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocumentResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AbsenceView {
    pub id: Uuid,
    pub email: String,
    pub date: NaiveDate,
    pub tipo: String,
    pub justificativa: String,
    #[serde(rename = "linkDocumento", skip_serializing_if = "Option::is_none")]
    pub link_documento: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivo: Option<String>,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "reviewedAt", skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(rename = "reviewedBy", skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}

impl From<Absence> for AbsenceView {
    fn from(absence: Absence) -> Self {
        Self {
            id: absence.id,
            email: absence.user_email,
            date: absence.date,
            tipo: absence.tipo,
            justificativa: absence.justificativa,
            link_documento: absence.link_documento,
            status: absence.status,
            motivo: absence.motivo,
            submitted_at: absence.submitted_at,
            reviewed_at: absence.reviewed_at,
            reviewed_by: absence.reviewed_by,
        }
    }
}
