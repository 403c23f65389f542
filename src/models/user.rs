use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Hierarchical access level. A user holds a non-empty set of assigned
/// levels and exactly one active level drawn from that set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nivel {
    Administrator,
    Coordinator,
    Collaborator,
}

impl Nivel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nivel::Administrator => "administrator",
            Nivel::Coordinator => "coordinator",
            Nivel::Collaborator => "collaborator",
        }
    }
}

impl FromStr for Nivel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Nivel::Administrator),
            "coordinator" => Ok(Nivel::Coordinator),
            "collaborator" => Ok(Nivel::Collaborator),
            other => Err(format!("unknown level: {}", other)),
        }
    }
}

impl fmt::Display for Nivel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed permission set resolved once per request from the active level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub manage_users: bool,
    pub manage_coordinations: bool,
    pub manage_geofence: bool,
    pub review_absences: bool,
    pub view_aggregate_reports: bool,
}

impl Permissions {
    pub fn for_level(level: Nivel) -> Self {
        match level {
            Nivel::Administrator => Self {
                manage_users: true,
                manage_coordinations: true,
                manage_geofence: true,
                review_absences: true,
                view_aggregate_reports: true,
            },
            Nivel::Coordinator => Self {
                manage_users: false,
                manage_coordinations: false,
                manage_geofence: false,
                review_absences: true,
                view_aggregate_reports: true,
            },
            Nivel::Collaborator => Self {
                manage_users: false,
                manage_coordinations: false,
                manage_geofence: false,
                review_absences: false,
                view_aggregate_reports: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(UserStatus::Pending),
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            other => Err(format!("unknown user status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub levels: Vec<String>,
    pub active_level: String,
    pub status: String,
    pub collaborator_type: Option<String>,
    pub work_schedule: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn active_nivel(&self) -> Option<Nivel> {
        self.active_level.parse().ok()
    }

    pub fn has_level(&self, level: Nivel) -> bool {
        self.levels.iter().any(|l| l.as_str() == level.as_str())
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active.as_str()
    }
}

/// Membership row with the coordination name cached alongside the id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CoordinationMembership {
    pub user_id: Uuid,
    pub coordination_id: Uuid,
    pub coordination_name: String,
}
