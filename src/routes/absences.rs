use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use std::path::Path as StdPath;
use tokio::fs;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::absence_dto::{
        AbsenceListQuery, AbsenceView, ReviewAbsencePayload, SubmitAbsencePayload,
        SubmitAbsenceResponse, UploadedDocumentResponse,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::{Nivel, Permissions, User},
    services::scope::{Scope, ScopedList, NO_COORDINATION_MESSAGE},
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
    path = "/api/absences",
    request_body = SubmitAbsencePayload,
    responses(
        (status = 201, description = "Absence submitted for review", body = Json<SubmitAbsenceResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitAbsencePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = active_caller(&state, &claims).await?;
    let absence = state
        .absence_service
        .submit(
            &user.email,
            payload.date,
            payload.tipo,
            &payload.justificativa,
            payload.link_documento.as_deref(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitAbsenceResponse {
            id: absence.id,
            status: absence.status,
        }),
    ))
}

async fn save_document(filename: &str, data: &bytes::Bytes) -> Result<String> {
    let ext = StdPath::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    let allowed_exts = ["pdf", "jpg", "jpeg", "png", "webp"];
    if !allowed_exts.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed",
            ext
        )));
    }
    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("File is not a valid PDF".into()));
    }

    let uploads_dir = crate::config::get_config().uploads_dir.clone();
    fs::create_dir_all(&uploads_dir).await?;
    let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
    let path = StdPath::new(&uploads_dir).join(&stored_name);
    fs::write(&path, data).await?;
    Ok(format!("/uploads/{}", stored_name))
}

#[utoipa::path(
    post,
    path = "/api/absences/document",
    responses(
        (status = 200, description = "Document stored; link usable as linkDocumento", body = Json<UploadedDocumentResponse>),
        (status = 400, description = "Missing file or disallowed type")
    )
)]
#[axum::debug_handler]
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let _ = active_caller(&state, &claims).await?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("document.bin").to_string();
        let data = field.bytes().await?;
        if data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".into()));
        }
        let url = save_document(&filename, &data).await?;
        tracing::info!(user = %claims.sub, url = %url, "absence document stored");
        return Ok(Json(UploadedDocumentResponse { url }));
    }
    Err(Error::BadRequest("Multipart field 'file' is required".into()))
}

#[utoipa::path(
    get,
    path = "/api/absences",
    params(
        ("status" = Option<String>, Query, description = "Filter by review status"),
        ("email" = Option<String>, Query, description = "Narrow to one employee")
    ),
    responses(
        (status = 200, description = "Scope-filtered absences")
    )
)]
#[axum::debug_handler]
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<AbsenceListQuery>,
) -> Result<impl IntoResponse> {
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

    let absences = state
        .absence_service
        .list(emails.as_deref(), query.status)
        .await?;
    let message = matches!(scope, Scope::CoordinatorUnassigned)
        .then(|| NO_COORDINATION_MESSAGE.to_string());
    Ok(Json(ScopedList {
        items: absences.into_iter().map(AbsenceView::from).collect::<Vec<_>>(),
        message,
    }))
}

#[utoipa::path(
    post,
    path = "/api/absences/review",
    request_body = ReviewAbsencePayload,
    responses(
        (status = 200, description = "Absence reviewed", body = Json<AbsenceView>),
        (status = 403, description = "Owner outside the reviewer's scope")
    )
)]
#[axum::debug_handler]
pub async fn review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReviewAbsencePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = active_caller(&state, &claims).await?;

    let permissions = user
        .active_nivel()
        .map(Permissions::for_level)
        .unwrap_or(Permissions::for_level(Nivel::Collaborator));
    if !permissions.review_absences {
        return Err(Error::Forbidden(
            "Only coordinators and administrators review absences".into(),
        ));
    }

    let absence = state.absence_service.get(payload.ausencia_id).await?;
    let scope = state.scope_service.resolve(&user).await?;
    if !state
        .scope_service
        .covers_email(&scope, &absence.user_email)
        .await?
    {
        return Err(Error::Forbidden(
            "Employee is not within your coordination scope".into(),
        ));
    }

    let reviewed = state
        .absence_service
        .review(
            payload.ausencia_id,
            payload.status,
            payload.motivo.as_deref(),
            &user.email,
        )
        .await?;
    Ok(Json(AbsenceView::from(reviewed)))
}
