//! Report Pipeline
//! Runs the skill and salary pipelines independently and merges their outputs.

use crate::config::ReportConfig;
use crate::data::{
    DataLoader, DataProcessor, DataSource, LoadAudit, MappingAudit, Role, SalaryYearRole,
};
use crate::stats::{ForecastOutcome, SkillCount, SkillRanker, TrendForecaster};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// The two datasets of one report run.
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub salary: DataSource,
    pub survey: DataSource,
}

/// Everything the summarizer and chart renderer consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub salary_audit: LoadAudit,
    pub survey_audit: LoadAudit,
    pub mapping_audit: MappingAudit,
    /// Candidate skills found in the survey header.
    pub skill_columns: Vec<String>,
    /// Candidate skills absent from the survey header.
    pub missing_skills: Vec<String>,
    pub top_skills: Vec<SkillCount>,
    pub salary_series: Vec<SalaryYearRole>,
    pub forecasts: Vec<ForecastOutcome>,
}

impl Report {
    pub fn failed_roles(&self) -> Vec<Role> {
        self.forecasts
            .iter()
            .filter(|outcome| outcome.fitted().is_none())
            .map(ForecastOutcome::role)
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_roles().is_empty()
    }
}

struct SkillOutput {
    survey_audit: LoadAudit,
    mapping_audit: MappingAudit,
    skill_columns: Vec<String>,
    missing_skills: Vec<String>,
    top_skills: Vec<SkillCount>,
}

struct SalaryOutput {
    salary_audit: LoadAudit,
    salary_series: Vec<SalaryYearRole>,
    forecasts: Vec<ForecastOutcome>,
}

pub struct ReportPipeline {
    config: ReportConfig,
    loader: DataLoader,
}

impl ReportPipeline {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            loader: DataLoader::new(),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Load both datasets and build the report.
    ///
    /// Load failures abort the run. A role without enough salary history is
    /// reported as a failed forecast while the other roles proceed.
    pub fn run(&self, inputs: &ReportInputs) -> Result<Report> {
        let (skills, salary) = rayon::join(
            || self.run_skills(&inputs.survey),
            || self.run_salary(&inputs.salary),
        );
        let skills = skills?;
        let salary = salary?;

        info!(
            skills = skills.top_skills.len(),
            series = salary.salary_series.len(),
            "report assembled"
        );

        Ok(Report {
            salary_audit: salary.salary_audit,
            survey_audit: skills.survey_audit,
            mapping_audit: skills.mapping_audit,
            skill_columns: skills.skill_columns,
            missing_skills: skills.missing_skills,
            top_skills: skills.top_skills,
            salary_series: salary.salary_series,
            forecasts: salary.forecasts,
        })
    }

    fn run_skills(&self, source: &DataSource) -> Result<SkillOutput> {
        let survey = self
            .loader
            .load_survey(source, &self.config.skills)
            .with_context(|| format!("loading survey data from {source}"))?;

        let (mapped, mapping_audit) = self.config.roles.map_records(&survey.records);

        let top_skills = SkillRanker::new(self.config.top_n)
            .rank(&mapped, &survey.skill_columns)
            .context("ranking skills per role")?;

        Ok(SkillOutput {
            survey_audit: survey.audit,
            mapping_audit,
            skill_columns: survey.skill_columns,
            missing_skills: survey.missing_skills,
            top_skills,
        })
    }

    fn run_salary(&self, source: &DataSource) -> Result<SalaryOutput> {
        let salaries = self
            .loader
            .load_salaries(source)
            .with_context(|| format!("loading salary data from {source}"))?;

        let salary_series = DataProcessor::average_salary_by_year_role(&salaries.records);
        let forecasts = TrendForecaster::new(self.config.forecast.clone())
            .forecast_all(&Role::ALL, &salary_series);

        Ok(SalaryOutput {
            salary_audit: salaries.audit,
            salary_series,
            forecasts,
        })
    }
}
