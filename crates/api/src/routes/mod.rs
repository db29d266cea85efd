mod create_report;
mod fetch_reports;
mod report_summary;
mod root;
mod update_report_status;

pub use create_report::*;
pub use fetch_reports::*;
pub use report_summary::*;
pub use root::*;
pub use update_report_status::*;
