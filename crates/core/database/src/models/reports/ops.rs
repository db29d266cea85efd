use amani_result::Result;
use iso8601_timestamp::Timestamp;

use crate::{Report, ReportStatus, ReportSummary};

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractReports: Sync + Send {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()>;

    /// Fetch a report by its id
    async fn fetch_report(&self, id: &str) -> Result<Report>;

    /// Fetch reports newest first, optionally filtered by status, up to `limit`
    async fn fetch_reports(
        &self,
        status: Option<ReportStatus>,
        limit: i64,
    ) -> Result<Vec<Report>>;

    /// Count reports in total and per status
    async fn summarise_reports(&self) -> Result<ReportSummary>;

    /// Update the status of a report, setting or clearing its resolution time,
    /// and return the updated record
    async fn update_report_status(
        &self,
        id: &str,
        status: ReportStatus,
        resolved_at: Option<Timestamp>,
    ) -> Result<Report>;
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use amani_result::ErrorType;
    use iso8601_timestamp::Timestamp;
    use ulid::Ulid;

    use crate::{Database, DatabaseInfo, Report, ReportStatus};

    async fn db() -> Database {
        DatabaseInfo::Reference
            .connect()
            .await
            .expect("Database connection failed.")
    }

    fn report(offset_secs: u64, status: ReportStatus) -> Report {
        Report {
            // Seconds-apart timestamps keep the time component of the id
            // strictly increasing regardless of the random tail.
            id: Ulid::from_datetime(
                SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + offset_secs),
            )
            .to_string(),
            title: format!("Report {offset_secs}"),
            description: "Something happened.".to_string(),
            location: None,
            latitude: None,
            longitude: None,
            anonymous: true,
            reporter_id: None,
            tags: vec![],
            images: vec![],
            status,
            resolved_at: None,
            created_at: Timestamp::now_utc(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let db = db().await;

        let mut report = report(0, ReportStatus::Open);
        report.location = Some("Market Street".to_string());
        report.latitude = Some(-1.2921);
        report.longitude = Some(36.8219);
        report.tags = vec!["harassment".to_string(), "evening".to_string()];
        report.reporter_id = Some("user_123".to_string());

        db.insert_report(&report).await.expect("insert");
        let fetched = db.fetch_report(&report.id).await.expect("fetch");
        assert_eq!(fetched, report);
    }

    #[tokio::test]
    async fn inserting_duplicate_id_fails() {
        let db = db().await;

        let report = report(0, ReportStatus::Open);
        db.insert_report(&report).await.expect("insert");
        assert!(db.insert_report(&report).await.is_err());
    }

    #[tokio::test]
    async fn fetch_reports_is_newest_first_and_capped() {
        let db = db().await;

        for offset in 0..5 {
            db.insert_report(&report(offset, ReportStatus::Open))
                .await
                .expect("insert");
        }

        let reports = db.fetch_reports(None, 3).await.expect("fetch");
        assert_eq!(reports.len(), 3);
        assert!(reports.windows(2).all(|pair| pair[0].id > pair[1].id));
        assert_eq!(reports[0].title, "Report 4");
    }

    #[tokio::test]
    async fn fetch_reports_filters_by_status() {
        let db = db().await;

        db.insert_report(&report(0, ReportStatus::Open))
            .await
            .expect("insert");
        db.insert_report(&report(1, ReportStatus::Resolved))
            .await
            .expect("insert");
        db.insert_report(&report(2, ReportStatus::Open))
            .await
            .expect("insert");

        let open = db
            .fetch_reports(Some(ReportStatus::Open), 1000)
            .await
            .expect("fetch");
        assert_eq!(open.len(), 2);
        assert!(open
            .iter()
            .all(|report| report.status == ReportStatus::Open));
    }

    #[tokio::test]
    async fn summary_counts_add_up() {
        let db = db().await;

        db.insert_report(&report(0, ReportStatus::Open))
            .await
            .expect("insert");
        db.insert_report(&report(1, ReportStatus::InProgress))
            .await
            .expect("insert");
        db.insert_report(&report(2, ReportStatus::InProgress))
            .await
            .expect("insert");
        db.insert_report(&report(3, ReportStatus::Resolved))
            .await
            .expect("insert");

        let summary = db.summarise_reports().await.expect("summary");
        assert_eq!(summary.total, 4);
        assert_eq!(summary.open, 1);
        assert_eq!(summary.in_progress, 2);
        assert_eq!(summary.resolved, 1);
        assert_eq!(
            summary.open + summary.in_progress + summary.resolved,
            summary.total
        );
    }

    #[tokio::test]
    async fn resolution_time_is_set_and_cleared_with_status() {
        let db = db().await;

        let report = report(0, ReportStatus::Open);
        db.insert_report(&report).await.expect("insert");

        let resolved = db
            .update_report_status(
                &report.id,
                ReportStatus::Resolved,
                Some(Timestamp::now_utc()),
            )
            .await
            .expect("update");
        assert_eq!(resolved.status, ReportStatus::Resolved);
        assert!(resolved.resolved_at.is_some());

        let reopened = db
            .update_report_status(&report.id, ReportStatus::Open, None)
            .await
            .expect("update");
        assert_eq!(reopened.status, ReportStatus::Open);
        assert!(reopened.resolved_at.is_none());
    }

    #[tokio::test]
    async fn updating_unknown_report_fails() {
        let db = db().await;

        let error = db
            .update_report_status("01J0000000000000000000000", ReportStatus::Resolved, None)
            .await
            .expect_err("should not match");
        assert!(matches!(error.error_type, ErrorType::UnknownReport));
    }
}
