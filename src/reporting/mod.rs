//! Messages, content optimization and report output

pub mod messages;
pub mod optimizer;
pub mod report_writer;

pub use messages::{Locale, MessageProvider, ValidationMessage};
pub use optimizer::optimize_ads_txt;
pub use report_writer::{summarize, write_json_report, write_report, FileReport, ReportSummary};
