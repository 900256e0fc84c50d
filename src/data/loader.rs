//! CSV Record Loader Module
//! Loads the salary and survey datasets with Polars and converts them to typed rows.

use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const WORK_YEAR: &str = "work_year";
pub const JOB_TITLE: &str = "job_title";
pub const SALARY_IN_USD: &str = "salary_in_usd";
pub const CURRENT_ROLE: &str = "current_role";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("{dataset} data is missing required column `{column}`")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },
}

/// Where a dataset is read from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl DataSource {
    pub fn path(path: impl AsRef<Path>) -> Self {
        DataSource::Path(path.as_ref().to_path_buf())
    }
}

impl From<&str> for DataSource {
    /// Treats the string as CSV text, not a path.
    fn from(text: &str) -> Self {
        DataSource::Bytes(text.as_bytes().to_vec())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(path) => write!(f, "{}", path.display()),
            DataSource::Bytes(bytes) => write!(f, "<in-memory, {} bytes>", bytes.len()),
        }
    }
}

/// One compensation record. Rows missing any of the three fields never become records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryRecord {
    pub work_year: i64,
    pub job_title: String,
    pub salary_in_usd: f64,
}

/// One survey respondent.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    pub current_role: String,
    /// Flags for the candidate skills present in the file only.
    pub skill_flags: BTreeMap<String, bool>,
}

/// Row counts observed while loading a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadAudit {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

impl LoadAudit {
    fn new(rows_read: usize, rows_kept: usize) -> Self {
        Self {
            rows_read,
            rows_kept,
            rows_dropped: rows_read - rows_kept,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SalaryTable {
    pub records: Vec<SalaryRecord>,
    pub audit: LoadAudit,
}

#[derive(Debug, Clone)]
pub struct SurveyTable {
    pub records: Vec<SurveyRecord>,
    /// Candidate skills found as columns, in candidate order.
    pub skill_columns: Vec<String>,
    /// Candidate skills absent from the header.
    pub missing_skills: Vec<String>,
    /// Rows without a `current_role` count as dropped.
    pub audit: LoadAudit,
}

/// Handles CSV loading with Polars.
///
/// Fields that fail to parse are coerced to null. Rows with too few fields
/// read the missing trailing fields as null; fields past the header width
/// are discarded. Salary rows with a null `work_year`, `job_title` or
/// `salary_in_usd` are then filtered out, as are fractional years; other
/// columns are left as they are.
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: 10000,
        }
    }

    /// Read a CSV source into a DataFrame.
    pub fn read_frame(&self, source: &DataSource) -> Result<DataFrame, LoaderError> {
        let df = match source {
            DataSource::Path(path) => {
                if !path.is_file() {
                    return Err(LoaderError::NotFound(path.clone()));
                }
                LazyCsvReader::new(path)
                    .with_infer_schema_length(Some(self.infer_schema_length))
                    .with_ignore_errors(true)
                    .with_truncate_ragged_lines(true)
                    .finish()?
                    .collect()?
            }
            DataSource::Bytes(bytes) => CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(Some(self.infer_schema_length))
                .with_ignore_errors(true)
                .map_parse_options(|opts| opts.with_truncate_ragged_lines(true))
                .into_reader_with_file_handle(Cursor::new(bytes.clone()))
                .finish()?,
        };

        debug!(source = %source, rows = df.height(), columns = df.width(), "csv loaded");
        Ok(df)
    }

    /// Load salary records, dropping rows with null required fields.
    pub fn load_salaries(&self, source: &DataSource) -> Result<SalaryTable, LoaderError> {
        let df = self.read_frame(source)?;
        require_columns(&df, "salary", &[WORK_YEAR, JOB_TITLE, SALARY_IN_USD])?;

        // Read as float; fractional years are filtered below.
        let year_col = df.column(WORK_YEAR)?.cast(&DataType::Float64)?;
        let title_col = df.column(JOB_TITLE)?.cast(&DataType::String)?;
        let salary_col = df.column(SALARY_IN_USD)?.cast(&DataType::Float64)?;

        let records: Vec<SalaryRecord> = year_col
            .f64()?
            .into_iter()
            .zip(title_col.str()?.into_iter())
            .zip(salary_col.f64()?.into_iter())
            .filter_map(|((year, title), salary)| {
                let job_title = title.map(str::trim).filter(|t| !t.is_empty())?;
                let salary_in_usd = salary.filter(|s| s.is_finite())?;
                let work_year = year.filter(|y| y.is_finite() && y.fract() == 0.0)?;
                Some(SalaryRecord {
                    work_year: work_year as i64,
                    job_title: job_title.to_string(),
                    salary_in_usd,
                })
            })
            .collect();

        let audit = LoadAudit::new(df.height(), records.len());
        if audit.rows_dropped > 0 {
            warn!(
                dropped = audit.rows_dropped,
                "salary rows with null required fields dropped"
            );
        }
        info!(rows = audit.rows_kept, "salary records loaded");

        Ok(SalaryTable { records, audit })
    }

    /// Load survey records, keeping only candidate skills present as columns.
    pub fn load_survey(
        &self,
        source: &DataSource,
        candidate_skills: &[String],
    ) -> Result<SurveyTable, LoaderError> {
        let df = self.read_frame(source)?;
        require_columns(&df, "survey", &[CURRENT_ROLE])?;

        let available: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (skill_columns, missing_skills): (Vec<String>, Vec<String>) = candidate_skills
            .iter()
            .cloned()
            .partition(|skill| available.contains(skill));

        for skill in &missing_skills {
            debug!(skill = %skill, "candidate skill column not in survey, skipped");
        }
        if !missing_skills.is_empty() {
            warn!(
                missing = missing_skills.len(),
                "candidate skills absent from survey columns"
            );
        }

        let mut flags_by_skill: Vec<(&str, Vec<bool>)> = Vec::with_capacity(skill_columns.len());
        for skill in &skill_columns {
            flags_by_skill.push((skill.as_str(), column_flags(df.column(skill)?)?));
        }

        let role_col = df.column(CURRENT_ROLE)?.cast(&DataType::String)?;
        let roles = role_col.str()?;

        let mut records = Vec::with_capacity(df.height());
        for (i, role) in roles.into_iter().enumerate() {
            let Some(role) = role.filter(|r| !r.trim().is_empty()) else {
                continue;
            };
            let skill_flags = flags_by_skill
                .iter()
                .map(|(skill, flags)| (skill.to_string(), flags[i]))
                .collect();
            records.push(SurveyRecord {
                current_role: role.to_string(),
                skill_flags,
            });
        }

        let audit = LoadAudit::new(df.height(), records.len());
        if audit.rows_dropped > 0 {
            warn!(dropped = audit.rows_dropped, "survey rows without a role dropped");
        }
        info!(
            rows = audit.rows_kept,
            skills = skill_columns.len(),
            "survey records loaded"
        );

        Ok(SurveyTable {
            records,
            skill_columns,
            missing_skills,
            audit,
        })
    }
}

fn require_columns(
    df: &DataFrame,
    dataset: &'static str,
    columns: &[&'static str],
) -> Result<(), LoaderError> {
    let names = df.get_column_names();
    for &column in columns {
        if !names.iter().any(|name| name.as_str() == column) {
            return Err(LoaderError::MissingColumn { dataset, column });
        }
    }
    Ok(())
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "1"
    )
}

/// Interpret a boolean-like column. Nulls and unrecognised values read as `false`.
fn column_flags(column: &Column) -> PolarsResult<Vec<bool>> {
    let dtype = column.dtype();
    let flags = if *dtype == DataType::Boolean {
        column
            .bool()?
            .into_iter()
            .map(|v| v.unwrap_or(false))
            .collect()
    } else if is_numeric(dtype) {
        let as_f64 = column.cast(&DataType::Float64)?;
        as_f64
            .f64()?
            .into_iter()
            .map(|v| matches!(v, Some(x) if x != 0.0 && !x.is_nan()))
            .collect()
    } else {
        let as_str = column.cast(&DataType::String)?;
        as_str
            .str()?
            .into_iter()
            .map(|v| v.map(parse_flag).unwrap_or(false))
            .collect()
    };
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_salaries_filters_null_fields() {
        let csv = "work_year,experience_level,job_title,salary_in_usd\n\
                   2023,SE,Data Analyst,90000\n\
                   ,SE,Data Analyst,91000\n\
                   2024,MI,,95000\n\
                   2024,MI,Data Analyst,\n\
                   2024,EN,Data Scientist,not-a-number\n\
                   2024,EN,Data Scientist,120000\n";
        let table = DataLoader::new().load_salaries(&csv.into()).unwrap();

        assert_eq!(table.records.len(), 2);
        assert_eq!(
            table.records[0],
            SalaryRecord {
                work_year: 2023,
                job_title: "Data Analyst".into(),
                salary_in_usd: 90000.0,
            }
        );
        assert_eq!(table.records[1].job_title, "Data Scientist");
        assert_eq!(table.audit.rows_read, 6);
        assert_eq!(table.audit.rows_dropped, 4);
    }

    #[test]
    fn test_load_salaries_rejects_fractional_years() {
        let csv = "work_year,job_title,salary_in_usd\n\
                   2023.9,Data Analyst,90000\n\
                   2024,Data Analyst,95000\n";
        let table = DataLoader::new().load_salaries(&csv.into()).unwrap();

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].work_year, 2024);
        assert_eq!(table.audit.rows_dropped, 1);
    }

    #[test]
    fn test_load_salaries_tolerates_ragged_rows() {
        let csv = "work_year,job_title,salary_in_usd\n\
                   2023,Data Analyst,90000\n\
                   2024,Data Analyst,95000,EXTRA\n\
                   2024,Data Analyst\n";
        let table = DataLoader::new().load_salaries(&csv.into()).unwrap();

        assert_eq!(table.audit.rows_read, 3);
        assert_eq!(table.audit.rows_dropped, 1);
        assert_eq!(
            table.records[1],
            SalaryRecord {
                work_year: 2024,
                job_title: "Data Analyst".into(),
                salary_in_usd: 95000.0,
            }
        );
    }

    #[test]
    fn test_load_salaries_missing_column_fails() {
        let csv = "work_year,job_title\n2023,Data Analyst\n";
        let err = DataLoader::new().load_salaries(&csv.into()).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MissingColumn {
                column: SALARY_IN_USD,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let source = DataSource::path("/definitely/not/here/salaries.csv");
        let err = DataLoader::new().load_salaries(&source).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn test_load_survey_intersects_candidate_skills() {
        let csv = "current_role,python,sql,Tableau\n\
                   Data Scientist,true,false,true\n\
                   Data Analyst,false,true,false\n";
        let table = DataLoader::new()
            .load_survey(&csv.into(), &skills(&["python", "sql", "tableau", "spark"]))
            .unwrap();

        assert_eq!(table.skill_columns, skills(&["python", "sql"]));
        assert_eq!(table.missing_skills, skills(&["tableau", "spark"]));
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].skill_flags.get("python"), Some(&true));
        assert_eq!(table.records[0].skill_flags.get("sql"), Some(&false));
        assert!(!table.records[0].skill_flags.contains_key("Tableau"));
    }

    #[test]
    fn test_load_survey_reads_numeric_and_text_flags() {
        let csv = "current_role,python,sql\n\
                   Data Scientist,1,Yes\n\
                   Data Scientist,0,no\n\
                   ,1,yes\n\
                   Data Analyst,,\n";
        let table = DataLoader::new()
            .load_survey(&csv.into(), &skills(&["python", "sql"]))
            .unwrap();

        assert_eq!(table.records.len(), 3);
        assert_eq!(table.audit.rows_dropped, 1);
        assert_eq!(table.records[0].skill_flags["python"], true);
        assert_eq!(table.records[0].skill_flags["sql"], true);
        assert_eq!(table.records[1].skill_flags["python"], false);
        assert_eq!(table.records[1].skill_flags["sql"], false);
        assert_eq!(table.records[2].skill_flags["python"], false);
    }

    #[test]
    fn test_load_survey_tolerates_ragged_rows() {
        let csv = "current_role,python,sql\n\
                   Data Scientist,true,true,junk\n\
                   Data Analyst,true\n";
        let table = DataLoader::new()
            .load_survey(&csv.into(), &skills(&["python", "sql"]))
            .unwrap();

        assert_eq!(table.records.len(), 2);
        assert_eq!(table.audit.rows_dropped, 0);
        assert_eq!(table.records[0].skill_flags["sql"], true);
        assert_eq!(table.records[1].skill_flags["python"], true);
        assert_eq!(table.records[1].skill_flags["sql"], false);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("y"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("maybe"));
    }
}
