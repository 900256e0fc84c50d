//! Data Processor Module
//! Reshapes survey skill flags to long format and aggregates salaries by year and role.

use crate::data::loader::SalaryRecord;
use crate::data::roles::MappedSurveyRecord;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Mean salary for one observed (year, job title) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryYearRole {
    pub work_year: i64,
    pub job_title: String,
    pub avg_salary: f64,
    /// Records contributing to the mean.
    pub count: usize,
}

/// Handles reshaping and grouping of loaded records.
pub struct DataProcessor;

impl DataProcessor {
    /// Transform per-skill flag columns to long format (stack operation).
    ///
    /// One row per (record, skill) pair. Output columns: ["role", "skill", "used"]
    pub fn stack_skills_to_long(
        records: &[MappedSurveyRecord],
        skills: &[String],
    ) -> Result<DataFrame, ProcessorError> {
        let capacity = records.len() * skills.len();
        let mut roles: Vec<&str> = Vec::with_capacity(capacity);
        let mut skill_names: Vec<&str> = Vec::with_capacity(capacity);
        let mut used: Vec<bool> = Vec::with_capacity(capacity);

        for skill in skills {
            for mapped in records {
                roles.push(mapped.mapped_role.as_str());
                skill_names.push(skill);
                used.push(
                    mapped
                        .record
                        .skill_flags
                        .get(skill)
                        .copied()
                        .unwrap_or(false),
                );
            }
        }

        let df = DataFrame::new(vec![
            Column::new("role".into(), roles),
            Column::new("skill".into(), skill_names),
            Column::new("used".into(), used),
        ])?;

        Ok(df)
    }

    /// Count "used" observations per (role, skill).
    ///
    /// Output columns: ["role", "skill", "count"], only pairs with count >= 1.
    pub fn count_skill_usage(long_df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let counts = long_df
            .clone()
            .lazy()
            .filter(col("used"))
            .group_by([col("role"), col("skill")])
            .agg([len().cast(DataType::Int64).alias("count")])
            .collect()?;
        Ok(counts)
    }

    /// Mean salary per observed (work_year, job_title), sorted by year then title.
    ///
    /// Groups only exist for combinations present in the input; missing years
    /// are not filled in.
    pub fn average_salary_by_year_role(records: &[SalaryRecord]) -> Vec<SalaryYearRole> {
        let mut groups: BTreeMap<(i64, &str), (f64, usize)> = BTreeMap::new();

        for record in records {
            if !record.salary_in_usd.is_finite() {
                continue;
            }
            let entry = groups
                .entry((record.work_year, record.job_title.as_str()))
                .or_insert((0.0, 0));
            entry.0 += record.salary_in_usd;
            entry.1 += 1;
        }

        groups
            .into_iter()
            .map(|((work_year, job_title), (sum, count))| SalaryYearRole {
                work_year,
                job_title: job_title.to_string(),
                avg_salary: sum / count as f64,
                count,
            })
            .collect()
    }

    /// Rows of the aggregated series belonging to one job title, in year order.
    pub fn series_for_title<'a>(
        series: &'a [SalaryYearRole],
        job_title: &str,
    ) -> Vec<&'a SalaryYearRole> {
        series
            .iter()
            .filter(|row| row.job_title == job_title)
            .collect()
    }

    /// Convert aggregated salary rows to a DataFrame for export.
    ///
    /// Output columns: ["work_year", "job_title", "avg_salary", "count"]
    pub fn salary_series_frame(series: &[SalaryYearRole]) -> Result<DataFrame, ProcessorError> {
        let df = DataFrame::new(vec![
            Column::new(
                "work_year".into(),
                series.iter().map(|r| r.work_year).collect::<Vec<i64>>(),
            ),
            Column::new(
                "job_title".into(),
                series
                    .iter()
                    .map(|r| r.job_title.as_str())
                    .collect::<Vec<&str>>(),
            ),
            Column::new(
                "avg_salary".into(),
                series.iter().map(|r| r.avg_salary).collect::<Vec<f64>>(),
            ),
            Column::new(
                "count".into(),
                series.iter().map(|r| r.count as u64).collect::<Vec<u64>>(),
            ),
        ])?;
        Ok(df)
    }
}
