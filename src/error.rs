use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Location is required when geofencing is enabled")]
    LocationRequired,

    #[error("Latitude/longitude are missing or invalid")]
    InvalidCoordinates,

    #[error("Outside the allowed workplace radius: {distance_meters:.0}m away, maximum {max_distance_meters:.0}m")]
    OutOfRange {
        distance_meters: f64,
        max_distance_meters: f64,
    },

    #[error("Level '{0}' is not assigned to this user")]
    UnauthorizedNivel(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl Error {
    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::BadRequest(_) | Error::Validation(_) | Error::Json(_) => "VALIDATION_ERROR",
            Error::Unauthorized(_) => "AUTH_REQUIRED",
            Error::Forbidden(_) => "FORBIDDEN_SCOPE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::LocationRequired => "LOCATION_REQUIRED",
            Error::InvalidCoordinates => "INVALID_COORDINATES",
            Error::OutOfRange { .. } => "OUT_OF_RANGE",
            Error::UnauthorizedNivel(_) => "UNAUTHORIZED_NIVEL",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let code = self.code();
        let (status, mut body) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::LocationRequired => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Location is required when geofencing is enabled" }),
            ),
            Error::InvalidCoordinates => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Latitude/longitude are missing or invalid" }),
            ),
            Error::OutOfRange {
                distance_meters,
                max_distance_meters,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": format!(
                        "You are {:.0}m from the workplace; the allowed radius is {:.0}m",
                        distance_meters, max_distance_meters
                    ),
                    "distanceMeters": distance_meters,
                    "maxDistanceMeters": max_distance_meters,
                }),
            ),
            Error::UnauthorizedNivel(nivel) => (
                StatusCode::FORBIDDEN,
                json!({ "error": format!("Level '{}' is not assigned to this user", nivel) }),
            ),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Xlsx(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Export error: {}", err) }),
            ),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "An unexpected error occurred" }),
            ),
        };

        if let Some(obj) = body.as_object_mut() {
            obj.insert("code".to_string(), json!(code));
        }
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
