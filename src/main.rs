use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use ponto_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    // Session exchange is the only API route reachable without a bearer
    // token; it is guarded by the gateway shared secret instead.
    let session_api = Router::new()
        .route("/api/auth/session", post(routes::auth::exchange_session))
        .layer(axum::middleware::from_fn_with_state(
            ponto_backend::middleware::rate_limit::new_rps_state(config.api_rps),
            ponto_backend::middleware::rate_limit::rps_middleware,
        ));

    let authenticated_api = Router::new()
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/auth/nivel", post(routes::auth::switch_level))
        .route("/api/clock/events", post(routes::clock::register_event))
        .route("/api/clock/today", get(routes::clock::today))
        .route("/api/clock/records", get(routes::clock::list_records))
        .route("/api/absences", post(routes::absences::submit).get(routes::absences::list))
        .route("/api/absences/document", post(routes::absences::upload_document))
        .route("/api/absences/review", post(routes::absences::review))
        .route("/api/users", get(routes::users::list_users))
        .route("/api/coordinations", get(routes::coordinations::list_coordinations))
        .route("/api/geofence", get(routes::geofence::get_config))
        .route("/api/reports/timesheet.xlsx", get(routes::reports::timesheet_xlsx))
        .layer(axum::middleware::from_fn(
            ponto_backend::middleware::auth::require_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            ponto_backend::middleware::rate_limit::new_rps_state(config.api_rps),
            ponto_backend::middleware::rate_limit::rps_middleware,
        ));

    let admin_api = Router::new()
        .route("/api/users/:id/approve", post(routes::users::approve_user))
        .route("/api/users/:id/deactivate", post(routes::users::deactivate_user))
        .route("/api/users/:id", patch(routes::users::update_user))
        .route("/api/coordinations", post(routes::coordinations::create_coordination))
        .route(
            "/api/coordinations/:id",
            patch(routes::coordinations::update_coordination)
                .delete(routes::coordinations::deactivate_coordination),
        )
        .route("/api/geofence", put(routes::geofence::update_config))
        .layer(axum::middleware::from_fn(
            ponto_backend::middleware::auth::require_admin,
        ))
        .layer(axum::middleware::from_fn_with_state(
            ponto_backend::middleware::rate_limit::new_rps_state(config.api_rps),
            ponto_backend::middleware::rate_limit::rps_middleware,
        ));

    let uploads_dir = config.uploads_dir.clone();
    info!("Serving uploaded documents from: {}", uploads_dir);

    let app = base_routes
        .merge(session_api)
        .merge(authenticated_api)
        .merge(admin_api)
        .nest_service("/uploads", tower_http::services::ServeDir::new(uploads_dir))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
