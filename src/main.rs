//! Salary Forecast - command-line report runner

use anyhow::{bail, Context, Result};
use clap::Parser;
use salary_forecast::charts::StaticChartRenderer;
use salary_forecast::cli::{Cli, OutputFormat};
use salary_forecast::data::DataSource;
use salary_forecast::report::{ReportExporter, ReportSummary};
use salary_forecast::{ReportConfig, ReportInputs, ReportPipeline};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; RUST_LOG overrides the verbosity flag
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReportConfig::builtin().context("loading built-in config")?,
    };

    let inputs = ReportInputs {
        salary: DataSource::path(&args.salary),
        survey: DataSource::path(&args.survey),
    };
    let report = ReportPipeline::new(config).run(&inputs)?;
    let summary = ReportSummary::from_report(&report);

    match args.format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(dir) = &args.output_dir {
        let written = ReportExporter::new(dir)
            .write_all(&report, &summary)
            .with_context(|| format!("exporting report to {}", dir.display()))?;
        tracing::info!(files = written.len(), "report files written");

        if args.charts {
            StaticChartRenderer::render_all(&report, dir)
                .with_context(|| format!("rendering charts into {}", dir.display()))?;
        }
    }

    if args.strict && report.has_failures() {
        let roles: Vec<String> = report
            .failed_roles()
            .iter()
            .map(ToString::to_string)
            .collect();
        bail!("no forecast for: {}", roles.join(", "));
    }

    Ok(())
}
