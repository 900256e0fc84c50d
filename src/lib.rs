//! Salary Forecast - per-role salary trends and top-skill rankings
//!
//! Loads a salary dataset and a skill-usage survey, fits an independent
//! linear trend per data role, projects future years with intervals, and
//! ranks the most used skills per role.

pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use config::ReportConfig;
pub use pipeline::{Report, ReportInputs, ReportPipeline};
