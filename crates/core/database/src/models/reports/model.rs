use std::fmt;
use std::str::FromStr;

use iso8601_timestamp::Timestamp;

/// Lifecycle status of an incident report
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "schemas", derive(utoipa::ToSchema))]
pub enum ReportStatus {
    Open,
    InProgress,
    Resolved,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ReportStatus::Open => "open",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Resolved => "resolved",
        })
    }
}

impl FromStr for ReportStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(ReportStatus::Open),
            "in_progress" => Ok(ReportStatus::InProgress),
            "resolved" => Ok(ReportStatus::Resolved),
            _ => Err(()),
        }
    }
}

fn default_anonymous() -> bool {
    true
}

auto_derived!(
    /// Incident report submitted by a (possibly anonymous) reporter
    pub struct Report {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// Short summary of the incident
        pub title: String,
        /// Full description of the incident
        pub description: String,
        /// Free-text place name
        #[serde(skip_serializing_if = "Option::is_none")]
        pub location: Option<String>,
        /// Captured device latitude
        #[serde(skip_serializing_if = "Option::is_none")]
        pub latitude: Option<f64>,
        /// Captured device longitude
        #[serde(skip_serializing_if = "Option::is_none")]
        pub longitude: Option<f64>,
        /// Whether the reporter chose to stay anonymous
        #[serde(default = "default_anonymous")]
        pub anonymous: bool,
        /// Client-supplied reporter identifier, stored verbatim
        #[serde(skip_serializing_if = "Option::is_none")]
        pub reporter_id: Option<String>,
        /// Free-form tags
        #[serde(default)]
        pub tags: Vec<String>,
        /// Relative paths to stored image attachments
        #[serde(default)]
        pub images: Vec<String>,
        /// Status of the report
        pub status: ReportStatus,
        /// When the report was resolved; present iff status is resolved
        #[serde(skip_serializing_if = "Option::is_none")]
        #[cfg_attr(feature = "schemas", schema(value_type = Option<String>))]
        pub resolved_at: Option<Timestamp>,
        /// When the report was created
        #[cfg_attr(feature = "schemas", schema(value_type = String))]
        pub created_at: Timestamp,
    }

    /// Aggregate report counts, one bucket per status
    pub struct ReportSummary {
        pub total: u64,
        pub open: u64,
        pub in_progress: u64,
        pub resolved: u64,
    }
);
