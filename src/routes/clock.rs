use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    dto::clock_dto::{ClockEventPayload, ClockEventResponse, ClockRecordView, ClockRecordsQuery},
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::User,
    services::scope::{Scope, ScopedList, NO_COORDINATION_MESSAGE},
    utils::time,
    AppState,
};

async fn active_caller(state: &AppState, claims: &Claims) -> Result<User> {
    let user = state.user_service.get_by_email(&claims.sub).await?;
    if !user.is_active() {
        return Err(Error::Forbidden(
            "Account is not active; wait for an administrator to approve it".into(),
        ));
    }
    Ok(user)
}

#[utoipa::path(
    post,
    path = "/api/clock/events",
    request_body = ClockEventPayload,
    responses(
        (status = 200, description = "Event registered", body = Json<ClockEventResponse>),
        (status = 400, description = "Missing/invalid location or out-of-order event"),
        (status = 422, description = "Caller outside the allowed radius")
    )
)]
#[axum::debug_handler]
pub async fn register_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ClockEventPayload>,
) -> Result<impl IntoResponse> {
    let user = active_caller(&state, &claims).await?;
    let geofence = state.geofence_service.get().await?;
    let registered = state
        .clock_service
        .register_event(
            &user.email,
            payload.event_type,
            payload.location.as_ref(),
            &geofence,
            time::now(),
        )
        .await?;
    Ok(Json(ClockEventResponse {
        success: true,
        time: registered.time,
        distance_meters: registered.distance_meters,
    }))
}

#[utoipa::path(
    get,
    path = "/api/clock/today",
    responses(
        (status = 200, description = "Caller's record for the workplace-local date, null when absent")
    )
)]
#[axum::debug_handler]
pub async fn today(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = active_caller(&state, &claims).await?;
    let tz = crate::config::get_config().workplace_timezone;
    let date = time::local_date(time::now(), tz);
    let record = state.clock_service.record_for(&user.email, date).await?;
    Ok(Json(record.map(ClockRecordView::from)))
}

#[utoipa::path(
    get,
    path = "/api/clock/records",
    params(
        ("from" = String, Query, description = "Start date (inclusive)"),
        ("to" = String, Query, description = "End date (inclusive)"),
        ("email" = Option<String>, Query, description = "Narrow to one employee")
    ),
    responses(
        (status = 200, description = "Scope-filtered clock records")
    )
)]
#[axum::debug_handler]
pub async fn list_records(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ClockRecordsQuery>,
) -> Result<impl IntoResponse> {
    if query.to < query.from {
        return Err(Error::BadRequest("'to' must not precede 'from'".into()));
    }
    let user = active_caller(&state, &claims).await?;
    let scope = state.scope_service.resolve(&user).await?;

    let emails = match &query.email {
        Some(email) => {
            if !state.scope_service.covers_email(&scope, email).await? {
                return Err(Error::Forbidden(
                    "Employee is not within your coordination scope".into(),
                ));
            }
            Some(vec![email.clone()])
        }
        None => state.scope_service.authorized_emails(&scope).await?,
    };

    let records = state
        .clock_service
        .list_records(emails.as_deref(), query.from, query.to)
        .await?;
    let message = matches!(scope, Scope::CoordinatorUnassigned)
        .then(|| NO_COORDINATION_MESSAGE.to_string());
    Ok(Json(ScopedList {
        items: records.into_iter().map(ClockRecordView::from).collect(),
        message,
    }))
}
