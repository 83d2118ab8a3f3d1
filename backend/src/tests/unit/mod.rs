pub mod analytics;
pub mod case_report;
