use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    dto::auth_dto::UserProfile,
    dto::user_dto::{ApproveUserPayload, UpdateUserPayload},
    error::{Error, Result},
    middleware::auth::Claims,
    services::scope::{filter_employees, ScopedList},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Employees visible to the caller's scope")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let caller = state.user_service.get_by_email(&claims.sub).await?;
    if !caller.is_active() {
        return Err(Error::Forbidden(
            "Account is not active; wait for an administrator to approve it".into(),
        ));
    }
    let scope = state.scope_service.resolve(&caller).await?;
    let users = state.user_service.list().await?;
    let memberships = state.user_service.memberships_by_user().await?;

    let filtered = filter_employees(&scope, users, &memberships);
    Ok(Json(ScopedList {
        items: filtered
            .items
            .into_iter()
            .map(UserProfile::from)
            .collect::<Vec<_>>(),
        message: filtered.message,
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/approve",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ApproveUserPayload,
    responses(
        (status = 200, description = "User approved and levels assigned", body = Json<UserProfile>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn approve_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveUserPayload>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .approve(
            id,
            payload.levels,
            payload.active_level,
            payload.collaborator_type,
            payload.coordinations,
        )
        .await?;
    Ok(Json(UserProfile::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/deactivate",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = Json<UserProfile>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.deactivate(id).await?;
    Ok(Json(UserProfile::from(user)))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Profile updated", body = Json<UserProfile>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .update_profile(
            id,
            payload.collaborator_type,
            payload.work_schedule,
            payload.coordinations,
        )
        .await?;
    Ok(Json(UserProfile::from(user)))
}
