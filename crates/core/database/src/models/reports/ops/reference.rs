use amani_result::Result;
use iso8601_timestamp::Timestamp;

use crate::ReferenceDb;
use crate::{Report, ReportStatus, ReportSummary};

use super::AbstractReports;

#[async_trait]
impl AbstractReports for ReferenceDb {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()> {
        let mut reports = self.reports.lock().await;
        if reports.contains_key(&report.id) {
            Err(create_database_error!("insert", "reports"))
        } else {
            reports.insert(report.id.to_string(), report.clone());
            Ok(())
        }
    }

    /// Fetch a report by its id
    async fn fetch_report(&self, id: &str) -> Result<Report> {
        let reports = self.reports.lock().await;
        reports
            .get(id)
            .cloned()
            .ok_or_else(|| create_error!(UnknownReport))
    }

    /// Fetch reports newest first, optionally filtered by status, up to `limit`
    async fn fetch_reports(
        &self,
        status: Option<ReportStatus>,
        limit: i64,
    ) -> Result<Vec<Report>> {
        let reports = self.reports.lock().await;
        let mut reports: Vec<Report> = reports
            .values()
            .filter(|report| status.map_or(true, |status| report.status == status))
            .cloned()
            .collect();

        // Ids are ULIDs, so a descending id sort is newest-first.
        reports.sort_by(|a, b| b.id.cmp(&a.id));
        reports.truncate(limit as usize);

        Ok(reports)
    }

    /// Count reports in total and per status
    async fn summarise_reports(&self) -> Result<ReportSummary> {
        let reports = self.reports.lock().await;

        let mut summary = ReportSummary {
            total: reports.len() as u64,
            open: 0,
            in_progress: 0,
            resolved: 0,
        };

        for report in reports.values() {
            match report.status {
                ReportStatus::Open => summary.open += 1,
                ReportStatus::InProgress => summary.in_progress += 1,
                ReportStatus::Resolved => summary.resolved += 1,
            }
        }

        Ok(summary)
    }

    /// Update the status of a report, setting or clearing its resolution time,
    /// and return the updated record
    async fn update_report_status(
        &self,
        id: &str,
        status: ReportStatus,
        resolved_at: Option<Timestamp>,
    ) -> Result<Report> {
        let mut reports = self.reports.lock().await;
        if let Some(report) = reports.get_mut(id) {
            report.status = status;
            report.resolved_at = resolved_at;
            Ok(report.clone())
        } else {
            Err(create_error!(UnknownReport))
        }
    }
}
