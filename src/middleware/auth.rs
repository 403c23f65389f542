use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::models::user::User;

/// Session claims. `nivel` is the active level at issuance time; scope
/// decisions always re-resolve against the stored user, so a stale claim
/// can never widen access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub nivel: String,
    pub exp: usize,
}

pub fn issue_token(user: &User) -> Result<String> {
    let config = crate::config::get_config();
    let expires = Utc::now() + Duration::hours(config.token_ttl_hours);
    let claims = Claims {
        sub: user.email.clone(),
        name: user.name.clone(),
        nivel: user.active_level.clone(),
        exp: expires.timestamp() as usize,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| crate::error::Error::Internal(format!("Token issuance failed: {}", e)))?;
    Ok(token)
}

fn decode_bearer(req: &Request) -> std::result::Result<Claims, &'static str> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing_authorization")?;
    let auth_str = auth_header.to_str().map_err(|_| "bad_authorization")?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("unsupported_scheme")?;

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| "invalid_token")
}

fn unauthorized(reason: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": reason, "code": "AUTH_REQUIRED" })),
    )
        .into_response()
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match decode_bearer(&req) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(reason) => unauthorized(reason),
    }
}

/// Gate for admin route groups. The token claim is a fast pre-check;
/// handlers still resolve the stored user before acting.
pub async fn require_admin(mut req: Request, next: Next) -> Response {
    match decode_bearer(&req) {
        Ok(claims) => {
            if !claims.nivel.eq_ignore_ascii_case("administrator") {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({ "error": "forbidden", "code": "FORBIDDEN_SCOPE" })),
                )
                    .into_response();
            }
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(reason) => unauthorized(reason),
    }
}
