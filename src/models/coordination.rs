use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Organizational grouping of collaborators under at most one coordinator.
/// Only active coordinations count toward a coordinator's authority.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Coordination {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub coordinator_email: Option<String>,
    pub coordinator_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
