use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::coordination_dto::{
        CoordinationListQuery, CreateCoordinationPayload, UpdateCoordinationPayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/coordinations",
    params(
        ("include_inactive" = Option<bool>, Query, description = "Also return deactivated coordinations")
    ),
    responses(
        (status = 200, description = "Coordinations list")
    )
)]
#[axum::debug_handler]
pub async fn list_coordinations(
    State(state): State<AppState>,
    Query(query): Query<CoordinationListQuery>,
) -> Result<impl IntoResponse> {
    let coordinations = state
        .coordination_service
        .list(!query.include_inactive)
        .await?;
    Ok(Json(coordinations))
}

#[utoipa::path(
    post,
    path = "/api/coordinations",
    request_body = CreateCoordinationPayload,
    responses(
        (status = 201, description = "Coordination created"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_coordination(
    State(state): State<AppState>,
    Json(payload): Json<CreateCoordinationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let coordination = state.coordination_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(coordination)))
}

#[utoipa::path(
    patch,
    path = "/api/coordinations/{id}",
    params(("id" = Uuid, Path, description = "Coordination ID")),
    request_body = UpdateCoordinationPayload,
    responses(
        (status = 200, description = "Coordination updated"),
        (status = 404, description = "Coordination not found")
    )
)]
#[axum::debug_handler]
pub async fn update_coordination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCoordinationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let coordination = state.coordination_service.update(id, payload).await?;
    Ok(Json(coordination))
}

#[utoipa::path(
    delete,
    path = "/api/coordinations/{id}",
    params(("id" = Uuid, Path, description = "Coordination ID")),
    responses(
        (status = 200, description = "Coordination deactivated"),
        (status = 404, description = "Coordination not found")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_coordination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let coordination = state.coordination_service.deactivate(id).await?;
    Ok(Json(coordination))
}
