use crate::models::user::{Nivel, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Identity already verified by the OAuth gateway; exchanged for a
/// first-party session token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionExchangePayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub usuario: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchLevelPayload {
    #[serde(rename = "novoNivel")]
    pub novo_nivel: Nivel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
    pub levels: Vec<String>,
    #[serde(rename = "activeLevel")]
    pub active_level: String,
    pub status: String,
    #[serde(rename = "collaboratorType", skip_serializing_if = "Option::is_none")]
    pub collaborator_type: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            levels: user.levels,
            active_level: user.active_level,
            status: user.status,
            collaborator_type: user.collaborator_type,
        }
    }
}
