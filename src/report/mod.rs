//! Report module - summary tables and file export

mod export;
mod summary;

pub use export::{ExportError, ReportExporter};
pub use summary::{format_money, FailureRow, ForecastRow, ModelRow, ReportSummary, SkillRow};
