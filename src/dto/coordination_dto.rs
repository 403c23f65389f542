use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCoordinationPayload {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[validate(email)]
    pub coordinator_email: Option<String>,
    pub coordinator_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCoordinationPayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    /// When true, coordinator_email/coordinator_name replace the current
    /// coordinator (both None clears the assignment).
    #[serde(default)]
    pub set_coordinator: bool,
    #[validate(email)]
    pub coordinator_email: Option<String>,
    pub coordinator_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinationListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}
