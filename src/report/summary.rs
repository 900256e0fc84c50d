//! Report Summary Module
//! Flattens a report into forecast, model-fit and skill tables.

use crate::pipeline::Report;
use crate::stats::{skills_by_role, Confidence, ForecastOutcome};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub role: String,
    pub year: i64,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRow {
    pub role: String,
    pub n: usize,
    pub intercept: f64,
    pub slope: f64,
    pub slope_std_error: Option<f64>,
    pub r_squared: f64,
    pub adj_r_squared: Option<f64>,
    pub residual_std_error: Option<f64>,
    pub f_statistic: Option<f64>,
    pub f_p_value: Option<f64>,
    pub aic: f64,
    pub bic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRow {
    pub role: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillRow {
    pub role: String,
    pub rank: usize,
    pub skill: String,
    pub count: u64,
}

/// Presentation tables derived read-only from a [`Report`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub forecasts: Vec<ForecastRow>,
    pub models: Vec<ModelRow>,
    pub failures: Vec<FailureRow>,
    pub skills: Vec<SkillRow>,
    /// Audit lines about dropped rows and skipped skills.
    pub notes: Vec<String>,
}

fn confidence_label(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::Standard => "standard",
        Confidence::Minimal => "minimal data",
    }
}

impl ReportSummary {
    pub fn from_report(report: &Report) -> Self {
        let mut forecasts = Vec::new();
        let mut models = Vec::new();
        let mut failures = Vec::new();

        for outcome in &report.forecasts {
            match outcome {
                ForecastOutcome::Fitted(result) => {
                    let role = result.role.to_string();
                    for point in &result.forecasts {
                        forecasts.push(ForecastRow {
                            role: role.clone(),
                            year: point.year,
                            estimate: point.estimate,
                            lower: point.lower,
                            upper: point.upper,
                            confidence: confidence_label(result.confidence).to_string(),
                        });
                    }
                    let stats = &result.model.statistics;
                    models.push(ModelRow {
                        role,
                        n: stats.n,
                        intercept: result.model.intercept.estimate,
                        slope: result.model.slope.estimate,
                        slope_std_error: result.model.slope.std_error,
                        r_squared: stats.r_squared,
                        adj_r_squared: stats.adj_r_squared,
                        residual_std_error: stats.residual_std_error,
                        f_statistic: stats.f_statistic,
                        f_p_value: stats.f_p_value,
                        aic: stats.aic,
                        bic: stats.bic,
                    });
                }
                ForecastOutcome::Failed { role, reason } => failures.push(FailureRow {
                    role: role.to_string(),
                    reason: reason.clone(),
                }),
            }
        }

        let skills = skills_by_role(&report.top_skills)
            .into_iter()
            .flat_map(|(role, entries)| {
                entries.into_iter().enumerate().map(move |(i, entry)| SkillRow {
                    role: role.to_string(),
                    rank: i + 1,
                    skill: entry.skill.clone(),
                    count: entry.count,
                })
            })
            .collect();

        let mut notes = Vec::new();
        if report.salary_audit.rows_dropped > 0 {
            notes.push(format!(
                "{} of {} salary rows dropped for missing year, title or salary",
                report.salary_audit.rows_dropped, report.salary_audit.rows_read
            ));
        }
        if report.survey_audit.rows_dropped > 0 {
            notes.push(format!(
                "{} survey rows dropped for missing role",
                report.survey_audit.rows_dropped
            ));
        }
        if report.mapping_audit.unmapped > 0 {
            notes.push(format!(
                "{} survey rows dropped with unmapped roles ({} distinct labels)",
                report.mapping_audit.unmapped,
                report.mapping_audit.unmapped_labels.len()
            ));
        }
        if !report.missing_skills.is_empty() {
            notes.push(format!(
                "skills not present in survey: {}",
                report.missing_skills.join(", ")
            ));
        }

        Self {
            forecasts,
            models,
            failures,
            skills,
            notes,
        }
    }

    /// Render all tables as plain text.
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// Output columns: ["role", "year", "estimate", "lower", "upper", "confidence"]
    pub fn forecasts_frame(&self) -> PolarsResult<DataFrame> {
        let rows = &self.forecasts;
        DataFrame::new(vec![
            Column::new("role".into(), rows.iter().map(|r| r.role.as_str()).collect::<Vec<_>>()),
            Column::new("year".into(), rows.iter().map(|r| r.year).collect::<Vec<_>>()),
            Column::new("estimate".into(), rows.iter().map(|r| r.estimate).collect::<Vec<_>>()),
            Column::new("lower".into(), rows.iter().map(|r| r.lower).collect::<Vec<_>>()),
            Column::new("upper".into(), rows.iter().map(|r| r.upper).collect::<Vec<_>>()),
            Column::new(
                "confidence".into(),
                rows.iter().map(|r| r.confidence.as_str()).collect::<Vec<_>>(),
            ),
        ])
    }

    pub fn models_frame(&self) -> PolarsResult<DataFrame> {
        let rows = &self.models;
        DataFrame::new(vec![
            Column::new("role".into(), rows.iter().map(|r| r.role.as_str()).collect::<Vec<_>>()),
            Column::new("n".into(), rows.iter().map(|r| r.n as u64).collect::<Vec<_>>()),
            Column::new("intercept".into(), rows.iter().map(|r| r.intercept).collect::<Vec<_>>()),
            Column::new("slope".into(), rows.iter().map(|r| r.slope).collect::<Vec<_>>()),
            Column::new(
                "slope_std_error".into(),
                rows.iter().map(|r| r.slope_std_error).collect::<Vec<_>>(),
            ),
            Column::new("r_squared".into(), rows.iter().map(|r| r.r_squared).collect::<Vec<_>>()),
            Column::new(
                "adj_r_squared".into(),
                rows.iter().map(|r| r.adj_r_squared).collect::<Vec<_>>(),
            ),
            Column::new(
                "residual_std_error".into(),
                rows.iter().map(|r| r.residual_std_error).collect::<Vec<_>>(),
            ),
            Column::new(
                "f_statistic".into(),
                rows.iter().map(|r| r.f_statistic).collect::<Vec<_>>(),
            ),
            Column::new("f_p_value".into(), rows.iter().map(|r| r.f_p_value).collect::<Vec<_>>()),
            Column::new("aic".into(), rows.iter().map(|r| r.aic).collect::<Vec<_>>()),
            Column::new("bic".into(), rows.iter().map(|r| r.bic).collect::<Vec<_>>()),
        ])
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Salary forecasts")?;
        writeln!(
            f,
            "{:<28} {:>6} {:>12} {:>12} {:>12}  {}",
            "Role", "Year", "Estimate", "Lower", "Upper", "Confidence"
        )?;
        for row in &self.forecasts {
            writeln!(
                f,
                "{:<28} {:>6} {:>12} {:>12} {:>12}  {}",
                row.role,
                row.year,
                format_money(row.estimate),
                format_money(row.lower),
                format_money(row.upper),
                row.confidence
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Model fit")?;
        writeln!(
            f,
            "{:<28} {:>3} {:>12} {:>10} {:>8} {:>8} {:>10} {:>10} {:>10}",
            "Role", "n", "Slope/yr", "Slope SE", "R2", "Adj R2", "RSE", "F p-value", "AIC"
        )?;
        for row in &self.models {
            writeln!(
                f,
                "{:<28} {:>3} {:>12} {:>10} {:>8.4} {:>8} {:>10} {:>10} {:>10}",
                row.role,
                row.n,
                format_money(row.slope),
                format_optional(row.slope_std_error, 0),
                row.r_squared,
                format_optional(row.adj_r_squared, 4),
                format_optional(row.residual_std_error, 0),
                format_optional(row.f_p_value, 4),
                format!("{:.2}", row.aic)
            )?;
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Roles without a forecast")?;
            for row in &self.failures {
                writeln!(f, "  {}: {}", row.role, row.reason)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Top skills")?;
        let mut current_role: Option<&str> = None;
        for row in &self.skills {
            if current_role != Some(row.role.as_str()) {
                writeln!(f, "  {}", row.role)?;
                current_role = Some(row.role.as_str());
            }
            writeln!(f, "    {}. {} ({})", row.rank, row.skill, row.count)?;
        }

        if !self.notes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Notes")?;
            for note in &self.notes {
                writeln!(f, "  - {}", note)?;
            }
        }

        Ok(())
    }
}

/// Whole-dollar amount with thousands separators.
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if decimals == 0 => format_money(v),
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}
