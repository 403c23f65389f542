use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use ponto_backend::middleware::auth::issue_token;
use ponto_backend::models::user::Nivel;
use ponto_backend::AppState;

const WORKPLACE: (f64, f64) = (-15.7942, -47.8822);

fn ensure_config() {
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("AUTH_GATEWAY_SECRET", "gw_test_secret");
    env::set_var("TOKEN_TTL_HOURS", "8");
    env::set_var("WORKPLACE_TIMEZONE", "America/Sao_Paulo");
    env::set_var("API_RPS", "100");
    env::set_var("UPLOADS_DIR", env::temp_dir().join("ponto_uploads").display().to_string());
    let _ = ponto_backend::config::init_config();
}

/// Tests need a live database; without one they are skipped.
async fn test_state() -> Option<AppState> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("skipping: DATABASE_URL not set");
        return None;
    }
    ensure_config();
    let pool = ponto_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    Some(AppState::new(pool))
}

async fn approved_user(state: &AppState, name: &str, levels: Vec<Nivel>) -> ponto_backend::models::user::User {
    let email = format!("{}_{}@example.com", name, Uuid::new_v4());
    let user = state
        .user_service
        .upsert_on_signin(&email, name)
        .await
        .expect("signin");
    state
        .user_service
        .approve(user.id, levels, None, None, vec![])
        .await
        .expect("approve")
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

async fn json_body(response: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn clock_router(state: AppState) -> Router {
    Router::new()
        .route("/api/clock/events", post(ponto_backend::routes::clock::register_event))
        .route("/api/clock/today", get(ponto_backend::routes::clock::today))
        .layer(axum::middleware::from_fn(
            ponto_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(state)
}

#[tokio::test]
async fn clock_flow_respects_geofence() {
    let Some(state) = test_state().await else { return };

    state
        .geofence_service
        .update(true, WORKPLACE.0, WORKPLACE.1, 100.0, "test@example.com")
        .await
        .expect("geofence on");

    let user = approved_user(&state, "ana", vec![Nivel::Collaborator]).await;
    let token = issue_token(&user).expect("token");
    let app = clock_router(state.clone());

    // ~150m south of the workplace: rejected, with the distance reported.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/clock/events")
                .header("content-type", "application/json")
                .header("authorization", bearer(&token))
                .body(Body::from(
                    json!({
                        "eventType": "entry",
                        "location": {"latitude": -15.79555, "longitude": WORKPLACE.1, "accuracy": 5.0}
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["code"], "OUT_OF_RANGE");
    let distance = body["distanceMeters"].as_f64().expect("distance");
    assert!((distance - 150.0).abs() < 10.0, "distance was {}", distance);
    assert_eq!(body["maxDistanceMeters"].as_f64(), Some(100.0));

    // No payload while geofencing is enabled.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/clock/events")
                .header("content-type", "application/json")
                .header("authorization", bearer(&token))
                .body(Body::from(json!({"eventType": "entry"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "LOCATION_REQUIRED");

    // The 0,0 sentinel is invalid regardless of configuration.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/clock/events")
                .header("content-type", "application/json")
                .header("authorization", bearer(&token))
                .body(Body::from(
                    json!({
                        "eventType": "entry",
                        "location": {"latitude": 0.0, "longitude": 0.0}
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_COORDINATES");

    // Inside the radius: the event lands with a server-side HH:MM stamp.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/clock/events")
                .header("content-type", "application/json")
                .header("authorization", bearer(&token))
                .body(Body::from(
                    json!({
                        "eventType": "entry",
                        "location": {"latitude": WORKPLACE.0 + 0.0001, "longitude": WORKPLACE.1, "accuracy": 4.0}
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let time = body["time"].as_str().expect("time");
    assert_eq!(time.len(), 5);
    assert_eq!(&time[2..3], ":");
    assert!(body["distanceMeters"].as_f64().unwrap() < 100.0);

    // The day record is visible.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/clock/today")
                .header("authorization", bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["entry"].as_str(), Some(time));

    // With geofencing disabled a bare request passes.
    state
        .geofence_service
        .update(false, WORKPLACE.0, WORKPLACE.1, 100.0, "test@example.com")
        .await
        .expect("geofence off");
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/clock/events")
                .header("content-type", "application/json")
                .header("authorization", bearer(&token))
                .body(Body::from(json!({"eventType": "lunch-start"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn absence_review_is_scoped_to_the_coordinator() {
    let Some(state) = test_state().await else { return };

    let coordinator = approved_user(&state, "maria", vec![Nivel::Coordinator]).await;
    let outsider = approved_user(&state, "joao", vec![Nivel::Coordinator]).await;

    let coordination = state
        .coordination_service
        .create(ponto_backend::dto::coordination_dto::CreateCoordinationPayload {
            name: format!("Math {}", Uuid::new_v4()),
            description: None,
            coordinator_email: Some(coordinator.email.clone()),
            coordinator_name: Some(coordinator.name.clone()),
        })
        .await
        .expect("coordination");

    let collaborator_signin = state
        .user_service
        .upsert_on_signin(&format!("ana_{}@example.com", Uuid::new_v4()), "Ana")
        .await
        .expect("signin");
    let collaborator = state
        .user_service
        .approve(
            collaborator_signin.id,
            vec![Nivel::Collaborator],
            None,
            Some("teaching".into()),
            vec![coordination.id],
        )
        .await
        .expect("approve");

    let absence = state
        .absence_service
        .submit(
            &collaborator.email,
            chrono::NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            ponto_backend::models::absence::AbsenceType::Atestado,
            "Consulta médica",
            None,
        )
        .await
        .expect("submit");
    assert_eq!(absence.status, "pendente");

    let app = Router::new()
        .route("/api/absences/review", post(ponto_backend::routes::absences::review))
        .layer(axum::middleware::from_fn(
            ponto_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(state.clone());

    // A coordinator with no authority over the owner is refused.
    let outsider_token = issue_token(&outsider).expect("token");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/absences/review")
                .header("content-type", "application/json")
                .header("authorization", bearer(&outsider_token))
                .body(Body::from(
                    json!({"ausenciaId": absence.id, "status": "aprovada"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["code"], "FORBIDDEN_SCOPE");

    // The assigned coordinator approves it.
    let token = issue_token(&coordinator).expect("token");
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/absences/review")
                .header("content-type", "application/json")
                .header("authorization", bearer(&token))
                .body(Body::from(
                    json!({"ausenciaId": absence.id, "status": "aprovada", "motivo": "Documento ok"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "aprovada");
    assert_eq!(body["reviewedBy"].as_str(), Some(coordinator.email.as_str()));
}

#[tokio::test]
async fn session_exchange_requires_gateway_secret_and_creates_pending_user() {
    let Some(state) = test_state().await else { return };

    let app = Router::new()
        .route("/api/auth/session", post(ponto_backend::routes::auth::exchange_session))
        .with_state(state);
    let email = format!("novo_{}@example.com", Uuid::new_v4());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/session")
                .header("content-type", "application/json")
                .header("x-auth-gateway-secret", "wrong")
                .body(Body::from(
                    json!({"email": email, "name": "Novo Usuário"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/session")
                .header("content-type", "application/json")
                .header("x-auth-gateway-secret", "gw_test_secret")
                .body(Body::from(
                    json!({"email": email, "name": "Novo Usuário"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["usuario"]["status"], "pending");
    assert_eq!(body["usuario"]["levels"], json!(["collaborator"]));
}

#[tokio::test]
async fn switching_level_changes_visible_scope() {
    let Some(state) = test_state().await else { return };

    // maria holds both levels but coordinates nothing: as coordinator she
    // sees an explicit empty scope, as administrator she sees everyone.
    let maria = approved_user(
        &state,
        "maria_dual",
        vec![Nivel::Coordinator, Nivel::Administrator],
    )
    .await;
    assert_eq!(maria.active_level, "coordinator");

    let app = Router::new()
        .route("/api/users", get(ponto_backend::routes::users::list_users))
        .route("/api/auth/nivel", post(ponto_backend::routes::auth::switch_level))
        .layer(axum::middleware::from_fn(
            ponto_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(state.clone());

    let token = issue_token(&maria).expect("token");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("authorization", bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["items"].as_array().map(|a| a.len()), Some(0));
    assert!(body["message"].as_str().is_some());

    // A level outside the assigned set is refused.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/nivel")
                .header("content-type", "application/json")
                .header("authorization", bearer(&token))
                .body(Body::from(json!({"novoNivel": "collaborator"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["code"], "UNAUTHORIZED_NIVEL");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/nivel")
                .header("content-type", "application/json")
                .header("authorization", bearer(&token))
                .body(Body::from(json!({"novoNivel": "administrator"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let new_token = json_body(response).await["token"]
        .as_str()
        .expect("token")
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("authorization", bearer(&new_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["items"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
    assert!(body["message"].is_null());
}
