use axum::{extract::State, Json};

use amani_database::{Database, ReportSummary};
use amani_result::Result;

/// # Report Summary
///
/// Per-status counts over the whole collection.
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    responses(
        (status = 200, description = "Counts by status", body = ReportSummary)
    )
)]
pub async fn report_summary(State(db): State<Database>) -> Result<Json<ReportSummary>> {
    db.summarise_reports().await.map(Json)
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test::TestHarness;

    #[tokio::test]
    async fn summary_counts_match_reports() {
        let harness = TestHarness::new().await;

        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            let (_, body) = harness
                .post_json(
                    "/api/reports",
                    json!({ "title": title, "description": "Testing" }),
                )
                .await;
            ids.push(body["_id"].as_str().expect("id").to_string());
        }

        harness
            .patch_json(
                &format!("/api/reports/{}", ids[0]),
                json!({ "status": "resolved" }),
                Some(TestHarness::ADMIN_TOKEN),
            )
            .await;
        harness
            .patch_json(
                &format!("/api/reports/{}", ids[1]),
                json!({ "status": "in_progress" }),
                Some(TestHarness::ADMIN_TOKEN),
            )
            .await;

        let (status, body) = harness.get_json("/api/reports/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["open"], 1);
        assert_eq!(body["in_progress"], 1);
        assert_eq!(body["resolved"], 1);
    }

    #[tokio::test]
    async fn summary_of_empty_collection_is_all_zeroes() {
        let harness = TestHarness::new().await;

        let (status, body) = harness.get_json("/api/reports/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "total": 0, "open": 0, "in_progress": 0, "resolved": 0 })
        );
    }
}
