use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    middleware::auth::Claims,
    services::export_service::ExportService,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct TimesheetQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[utoipa::path(
    get,
    path = "/api/reports/timesheet.xlsx",
    params(
        ("from" = String, Query, description = "Start date (inclusive)"),
        ("to" = String, Query, description = "End date (inclusive)")
    ),
    responses(
        (status = 200, description = "XLSX timesheet for the caller's scope")
    )
)]
#[axum::debug_handler]
pub async fn timesheet_xlsx(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TimesheetQuery>,
) -> Result<impl IntoResponse> {
    if query.to < query.from {
        return Err(Error::BadRequest("'to' must not precede 'from'".into()));
    }
    let caller = state.user_service.get_by_email(&claims.sub).await?;
    if !caller.is_active() {
        return Err(Error::Forbidden(
            "Account is not active; wait for an administrator to approve it".into(),
        ));
    }
    let scope = state.scope_service.resolve(&caller).await?;
    let emails = state.scope_service.authorized_emails(&scope).await?;

    let records = state
        .clock_service
        .list_records(emails.as_deref(), query.from, query.to)
        .await?;
    let mut absences = state.absence_service.list(emails.as_deref(), None).await?;
    absences.retain(|a| a.date >= query.from && a.date <= query.to);

    let buffer = ExportService::generate_timesheet_xlsx(&records, &absences, query.from, query.to)?;
    let disposition = format!(
        "attachment; filename=\"timesheet_{}_{}.xlsx\"",
        query.from, query.to
    );

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    ))
}
