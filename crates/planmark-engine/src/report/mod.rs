pub mod json;
pub mod text;
pub mod uncertainty;

pub use json::format_json_report;
pub use text::{TextReportOptions, format_text_report};
pub use uncertainty::{
    UncertaintySummary, collect_uncertainty, format_uncertainty_report,
};
