use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Reason category for a justified absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceType {
    Falta,
    Atestado,
    Licenca,
}

impl AbsenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbsenceType::Falta => "falta",
            AbsenceType::Atestado => "atestado",
            AbsenceType::Licenca => "licenca",
        }
    }
}

impl FromStr for AbsenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "falta" => Ok(AbsenceType::Falta),
            "atestado" => Ok(AbsenceType::Atestado),
            "licenca" => Ok(AbsenceType::Licenca),
            other => Err(format!("unknown absence type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceStatus {
    Pendente,
    Aprovada,
    Rejeitada,
}

impl AbsenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbsenceStatus::Pendente => "pendente",
            AbsenceStatus::Aprovada => "aprovada",
            AbsenceStatus::Rejeitada => "rejeitada",
        }
    }
}

impl FromStr for AbsenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendente" => Ok(AbsenceStatus::Pendente),
            "aprovada" => Ok(AbsenceStatus::Aprovada),
            "rejeitada" => Ok(AbsenceStatus::Rejeitada),
            other => Err(format!("unknown absence status: {}", other)),
        }
    }
}

/// A claim that a user did not work a given day for a justified reason.
/// Created by the collaborator; reviewed only by a coordinator with scope
/// over the owner, or an administrator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Absence {
    pub id: Uuid,
    pub user_email: String,
    pub date: NaiveDate,
    pub tipo: String,
    pub justificativa: String,
    pub link_documento: Option<String>,
    pub status: String,
    pub motivo: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
}

impl Absence {
    pub fn is_pending(&self) -> bool {
        self.status == AbsenceStatus::Pendente.as_str()
    }
}
