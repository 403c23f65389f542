use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use validator::Validate;

use crate::{
    dto::auth_dto::{SessionExchangePayload, SessionResponse, SwitchLevelPayload, UserProfile},
    dto::user_dto::{MembershipView, UserDetailResponse},
    error::{Error, Result},
    middleware::auth::{issue_token, Claims},
    AppState,
};

const GATEWAY_SECRET_HEADER: &str = "x-auth-gateway-secret";

#[utoipa::path(
    post,
    path = "/api/auth/session",
    request_body = SessionExchangePayload,
    responses(
        (status = 200, description = "Session token issued", body = Json<SessionResponse>),
        (status = 401, description = "Gateway secret missing or wrong")
    )
)]
#[axum::debug_handler]
pub async fn exchange_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SessionExchangePayload>,
) -> Result<impl IntoResponse> {
    let config = crate::config::get_config();
    let supplied = headers
        .get(GATEWAY_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if supplied != config.auth_gateway_secret {
        return Err(Error::Unauthorized("Invalid gateway secret".into()));
    }
    payload.validate()?;

    let user = state
        .user_service
        .upsert_on_signin(&payload.email, &payload.name)
        .await?;
    let token = issue_token(&user)?;
    tracing::info!(user = %user.email, status = %user.status, "session exchanged");

    Ok(Json(SessionResponse {
        token,
        usuario: UserProfile::from(user),
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Caller profile with memberships", body = Json<UserDetailResponse>)
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_email(&claims.sub).await?;
    let memberships = state.user_service.memberships_of(user.id).await?;
    Ok(Json(UserDetailResponse {
        profile: UserProfile::from(user),
        coordinations: memberships
            .into_iter()
            .map(|m| MembershipView {
                id: m.coordination_id,
                name: m.coordination_name,
            })
            .collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/nivel",
    request_body = SwitchLevelPayload,
    responses(
        (status = 200, description = "Active level switched; fresh token returned", body = Json<SessionResponse>),
        (status = 403, description = "Requested level is not assigned")
    )
)]
#[axum::debug_handler]
pub async fn switch_level(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SwitchLevelPayload>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .switch_level(&claims.sub, payload.novo_nivel)
        .await?;
    let token = issue_token(&user)?;
    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            token,
            usuario: UserProfile::from(user),
        }),
    ))
}
