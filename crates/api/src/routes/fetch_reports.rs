use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use amani_database::{Database, Report, ReportStatus};
use amani_result::{create_error, Result};

/// Hard cap on reports returned per request
const MAX_FETCHED_REPORTS: i64 = 1000;

#[derive(Deserialize, IntoParams)]
pub struct OptionsFetchReports {
    /// Only return reports in this status
    status: Option<String>,
}

/// # Fetch Reports
///
/// Fetch recent reports, newest first, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(OptionsFetchReports),
    responses(
        (status = 200, description = "Matching reports", body = Vec<Report>),
        (status = 400, description = "Unknown status value", body = amani_result::Error)
    )
)]
pub async fn fetch_reports(
    State(db): State<Database>,
    Query(options): Query<OptionsFetchReports>,
) -> Result<Json<Vec<Report>>> {
    let status = options
        .status
        .map(|value| {
            value
                .parse::<ReportStatus>()
                .map_err(|_| create_error!(InvalidStatus))
        })
        .transpose()?;

    db.fetch_reports(status, MAX_FETCHED_REPORTS)
        .await
        .map(Json)
}
