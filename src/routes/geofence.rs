use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::{
    dto::geofence_dto::GeofenceConfigPayload, error::Result, middleware::auth::Claims, AppState,
};

#[utoipa::path(
    get,
    path = "/api/geofence",
    responses(
        (status = 200, description = "Current geofence configuration; the client monitor reads the same row the validator uses")
    )
)]
#[axum::debug_handler]
pub async fn get_config(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let config = state.geofence_service.get().await?;
    Ok(Json(config))
}

#[utoipa::path(
    put,
    path = "/api/geofence",
    request_body = GeofenceConfigPayload,
    responses(
        (status = 200, description = "Configuration replaced"),
        (status = 400, description = "Coordinates or radius out of range")
    )
)]
#[axum::debug_handler]
pub async fn update_config(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GeofenceConfigPayload>,
) -> Result<impl IntoResponse> {
    let config = state
        .geofence_service
        .update(
            payload.enabled,
            payload.workplace_latitude,
            payload.workplace_longitude,
            payload.allowed_radius_meters,
            &claims.sub,
        )
        .await?;
    Ok(Json(config))
}
