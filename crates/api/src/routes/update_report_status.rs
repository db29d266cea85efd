use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use amani_database::{iso8601_timestamp::Timestamp, Database, Report, ReportStatus};
use amani_result::{create_error, Result};

use crate::auth::Admin;

/// # Status Data
#[derive(Deserialize, ToSchema)]
pub struct DataUpdateStatus {
    /// New status for the report
    status: String,
}

/// # Update Report Status
///
/// Move a report between statuses. Requires the admin bearer token.
/// Resolution time is stamped on entry to `resolved` and cleared on exit.
#[utoipa::path(
    patch,
    path = "/api/reports/{id}",
    request_body = DataUpdateStatus,
    responses(
        (status = 200, description = "Updated report", body = Report),
        (status = 400, description = "Unknown status value", body = amani_result::Error),
        (status = 401, description = "Missing admin credentials", body = amani_result::Error),
        (status = 404, description = "No such report", body = amani_result::Error)
    ),
    params(
        ("id" = String, Path, description = "Report id")
    )
)]
pub async fn update_report_status(
    State(db): State<Database>,
    _admin: Admin,
    Path(id): Path<String>,
    Json(data): Json<DataUpdateStatus>,
) -> Result<Json<Report>> {
    let status = data
        .status
        .parse::<ReportStatus>()
        .map_err(|_| create_error!(InvalidStatus))?;

    let resolved_at = if let ReportStatus::Resolved = status {
        Some(Timestamp::now_utc())
    } else {
        None
    };

    let report = db.update_report_status(&id, status, resolved_at).await?;
    tracing::info!(id = %report.id, status = %status, "report status updated");
    Ok(Json(report))
}
