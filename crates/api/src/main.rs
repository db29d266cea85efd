use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use amani_database::DatabaseInfo;

mod api;
mod auth;
mod routes;
mod uploads;

#[cfg(test)]
mod test;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Configure logging and environment
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amani_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = amani_config::config().await;

    // Configure API schema
    #[derive(OpenApi)]
    #[openapi(
        paths(
            routes::root,
            routes::create_report,
            routes::fetch_reports,
            routes::report_summary,
            routes::update_report_status
        ),
        components(
            schemas(
                amani_database::Report,
                amani_database::ReportStatus,
                amani_database::ReportSummary,
                amani_result::Error,
                amani_result::ErrorType,
                routes::DataCreateReport,
                routes::DataTags,
                routes::DataUpdateStatus
            )
        )
    )]
    struct ApiDoc;

    // Setup database
    let db = DatabaseInfo::Auto
        .connect()
        .await
        .expect("Database connection failed.");

    // Configure Axum and router
    let app = axum::Router::new()
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .merge(api::router(db).await);

    // Configure TCP listener and bind
    let address = SocketAddr::new(
        config.api.host.parse().expect("valid `api.host` address"),
        config.api.port,
    );
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Serving the Amani API on http://{address}");
    axum::serve(listener, app.into_make_service()).await
}
