use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use amani_config::config;
use amani_database::Database;

use crate::routes;

/// Build the API router
pub async fn router(db: Database) -> Router {
    let config = config().await;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_origin(Any);

    // Leave headroom above the per-file cap for the remaining form fields.
    let body_limit =
        config.files.limits.max_file_size * (config.files.limits.max_count + 1);

    Router::new()
        .route("/", get(routes::root))
        .route(
            "/api/reports",
            post(routes::create_report)
                .get(routes::fetch_reports)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/reports/summary", get(routes::report_summary))
        .route("/api/reports/:id", patch(routes::update_report_status))
        .nest_service(
            &config.files.serve_prefix,
            ServeDir::new(&config.files.upload_dir),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(db)
}
