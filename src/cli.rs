//! CLI argument parsing for the salary forecast report

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the report printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text tables (default)
    Text,
    /// Full report as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "salary_forecast")]
#[command(version)]
#[command(about = "Forecast salaries per data role and rank their top skills", long_about = None)]
pub struct Cli {
    /// Salary CSV (work_year, job_title, salary_in_usd)
    #[arg(value_name = "SALARY_CSV")]
    pub salary: PathBuf,

    /// Survey CSV (current_role plus one boolean column per skill)
    #[arg(value_name = "SURVEY_CSV")]
    pub survey: PathBuf,

    /// Report configuration (TOML). Defaults to the built-in role mapping and skills
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for report.json and CSV tables
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also render PNG charts into the output directory (requires --output-dir)
    #[arg(long, requires = "output_dir")]
    pub charts: bool,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Exit with an error if any role could not be forecast
    #[arg(long)]
    pub strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
