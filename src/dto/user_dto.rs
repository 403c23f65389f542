use crate::dto::auth_dto::UserProfile;
use crate::models::user::Nivel;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveUserPayload {
    pub levels: Vec<Nivel>,
    #[serde(rename = "activeLevel")]
    pub active_level: Option<Nivel>,
    #[serde(rename = "collaboratorType")]
    pub collaborator_type: Option<String>,
    #[serde(default)]
    pub coordinations: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserPayload {
    #[serde(rename = "collaboratorType")]
    pub collaborator_type: Option<String>,
    #[serde(rename = "workSchedule")]
    pub work_schedule: Option<JsonValue>,
    pub coordinations: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipView {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub coordinations: Vec<MembershipView>,
}
