//! Report Export Module
//! Writes the report as JSON and its tables as CSV files.

use crate::data::{DataProcessor, ProcessorError};
use crate::pipeline::Report;
use crate::report::ReportSummary;
use crate::stats::skill_counts_frame;
use polars::prelude::*;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write table: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Writes report artifacts into one output directory.
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `report.json` and the CSV tables. Returns the written paths.
    pub fn write_all(
        &self,
        report: &Report,
        summary: &ReportSummary,
    ) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ExportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let mut written = Vec::new();

        let json_path = self.output_dir.join("report.json");
        let file = self.create(&json_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), report)?;
        written.push(json_path);

        let mut tables = [
            ("forecasts.csv", summary.forecasts_frame()?),
            ("model_fit.csv", summary.models_frame()?),
            ("top_skills.csv", skill_counts_frame(&report.top_skills)?),
            (
                "salary_by_year.csv",
                DataProcessor::salary_series_frame(&report.salary_series)?,
            ),
        ];

        for (name, df) in tables.iter_mut() {
            let path = self.output_dir.join(*name);
            let mut file = self.create(&path)?;
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
            written.push(path);
        }

        info!(dir = %self.output_dir.display(), files = written.len(), "report exported");
        Ok(written)
    }

    fn create(&self, path: &Path) -> Result<File, ExportError> {
        File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::pipeline::{ReportInputs, ReportPipeline};

    #[test]
    fn test_write_all_creates_files() {
        let report = ReportPipeline::new(ReportConfig::builtin().unwrap())
            .run(&ReportInputs {
                salary: "work_year,job_title,salary_in_usd\n\
                         2022,Data Scientist,100000\n\
                         2023,Data Scientist,105000\n\
                         2024,Data Scientist,111000\n"
                    .into(),
                survey: "current_role,python\nData Scientist,true\n".into(),
            })
            .unwrap();
        let summary = ReportSummary::from_report(&report);

        let dir = tempfile::tempdir().unwrap();
        let written = ReportExporter::new(dir.path().join("out"))
            .write_all(&report, &summary)
            .unwrap();

        assert_eq!(written.len(), 5);
        for path in &written {
            assert!(path.is_file(), "missing {}", path.display());
        }

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(json["forecasts"].as_array().unwrap().len(), 3);
        assert_eq!(json["forecasts"][0]["status"], "fitted");

        let forecasts = fs::read_to_string(dir.path().join("out/forecasts.csv")).unwrap();
        assert!(forecasts.starts_with("role,year,estimate,lower,upper,confidence"));
        assert_eq!(forecasts.lines().count(), 3);
    }
}
