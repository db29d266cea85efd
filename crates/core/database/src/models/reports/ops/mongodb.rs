use amani_result::Result;
use iso8601_timestamp::Timestamp;
use mongodb::options::FindOptions;

use crate::MongoDb;
use crate::{Report, ReportStatus, ReportSummary};

use super::AbstractReports;

static COL: &str = "reports";

#[async_trait]
impl AbstractReports for MongoDb {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()> {
        query!(self, insert_one, COL, &report).map(|_| ())
    }

    /// Fetch a report by its id
    async fn fetch_report(&self, id: &str) -> Result<Report> {
        query!(self, find_one_by_id, COL, id)?.ok_or_else(|| create_error!(UnknownReport))
    }

    /// Fetch reports newest first, optionally filtered by status, up to `limit`
    async fn fetch_reports(
        &self,
        status: Option<ReportStatus>,
        limit: i64,
    ) -> Result<Vec<Report>> {
        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", status.to_string());
        }

        // Ids are ULIDs, so a descending id sort is newest-first.
        query!(
            self,
            find_with_options,
            COL,
            filter,
            FindOptions::builder()
                .sort(doc! { "_id": -1 })
                .limit(limit)
                .build()
        )
    }

    /// Count reports in total and per status
    async fn summarise_reports(&self) -> Result<ReportSummary> {
        let total = query!(self, count_documents, COL, doc! {})?;

        let mut summary = ReportSummary {
            total,
            open: 0,
            in_progress: 0,
            resolved: 0,
        };

        let buckets = query!(
            self,
            aggregate,
            COL,
            vec![doc! {
                "$group": {
                    "_id": "$status",
                    "count": { "$sum": 1_i64 }
                }
            }]
        )?;

        for bucket in buckets {
            let count = bucket
                .get_i64("count")
                .or_else(|_| bucket.get_i32("count").map(i64::from))
                .unwrap_or_default() as u64;

            match bucket.get_str("_id") {
                Ok("open") => summary.open = count,
                Ok("in_progress") => summary.in_progress = count,
                Ok("resolved") => summary.resolved = count,
                _ => {}
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
        let mut set = doc! {
            "status": status.to_string()
        };

        let mut unset = vec![];
        if let Some(resolved_at) = resolved_at {
            set.insert(
                "resolved_at",
                bson::to_bson(&resolved_at)
                    .map_err(|_| create_database_error!("to_bson", COL))?,
            );
        } else {
            unset.push("resolved_at");
        }

        let result = query!(self, update_one_by_id, COL, id, set, unset)?;
        if result.matched_count == 0 {
            return Err(create_error!(UnknownReport));
        }

        self.fetch_report(id).await
    }
}
