//! Trend Forecaster Module
//! Fits an independent salary-vs-year line per role and projects future years.

use crate::config::{ForecastConfig, IntervalKind};
use crate::data::{DataProcessor, Role, SalaryYearRole};
use crate::stats::regression::LinearFit;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("{role}: {points} distinct year(s) of salary data, at least {required} required for a trend")]
    InsufficientData {
        role: Role,
        points: usize,
        required: usize,
    },
    /// The confidence level is outside (0, 1). Config validation rejects such
    /// levels, so this only arises for a `ForecastConfig` built in code.
    #[error("{role}: could not compute a {level} interval for {year}")]
    Interval { role: Role, year: i64, level: f64 },
}

/// How much the intervals of a fitted role can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Residual degrees of freedom available; intervals are meaningful.
    Standard,
    /// Line passes through exactly two points; intervals collapse to the estimate.
    Minimal,
}

/// Projected salary for one future year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub year: i64,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Fitted model and projections for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub role: Role,
    pub model: LinearFit,
    /// (year, mean salary) points the model was fitted on.
    pub observed: Vec<(i64, f64)>,
    pub forecasts: Vec<ForecastPoint>,
    pub confidence: Confidence,
    pub confidence_level: f64,
    pub interval: IntervalKind,
}

/// Per-role outcome; a failed role does not stop the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Fitted(ForecastResult),
    Failed { role: Role, reason: String },
}

impl ForecastOutcome {
    pub fn role(&self) -> Role {
        match self {
            ForecastOutcome::Fitted(result) => result.role,
            ForecastOutcome::Failed { role, .. } => *role,
        }
    }

    pub fn fitted(&self) -> Option<&ForecastResult> {
        match self {
            ForecastOutcome::Fitted(result) => Some(result),
            ForecastOutcome::Failed { .. } => None,
        }
    }
}

impl From<Result<ForecastResult, ForecastError>> for ForecastOutcome {
    fn from(result: Result<ForecastResult, ForecastError>) -> Self {
        match result {
            Ok(forecast) => ForecastOutcome::Fitted(forecast),
            Err(err) => {
                let role = match &err {
                    ForecastError::InsufficientData { role, .. } => *role,
                    ForecastError::Interval { role, .. } => *role,
                };
                ForecastOutcome::Failed {
                    role,
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// Fits one least-squares line per role.
pub struct TrendForecaster {
    config: ForecastConfig,
}

impl TrendForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Fit and project a single role from the aggregated salary series.
    pub fn forecast_role(
        &self,
        role: Role,
        series: &[SalaryYearRole],
    ) -> Result<ForecastResult, ForecastError> {
        let mut observed: Vec<(i64, f64)> = DataProcessor::series_for_title(series, role.as_str())
            .into_iter()
            .map(|row| (row.work_year, row.avg_salary))
            .collect();
        observed.sort_by_key(|(year, _)| *year);
        observed.dedup_by_key(|(year, _)| *year);

        let required = self.config.min_points.max(2);
        let insufficient = || ForecastError::InsufficientData {
            role,
            points: observed.len(),
            required,
        };
        if observed.len() < required {
            return Err(insufficient());
        }

        let points: Vec<(f64, f64)> = observed
            .iter()
            .map(|(year, salary)| (*year as f64, *salary))
            .collect();
        let model = LinearFit::fit(&points).ok_or_else(insufficient)?;

        let latest_year = observed.last().map(|(year, _)| *year).unwrap_or_default();
        let level = self.config.confidence_level;
        let forecasts = self
            .config
            .target_years(latest_year)
            .into_iter()
            .map(|year| {
                model
                    .interval(year as f64, level, self.config.interval)
                    .map(|interval| ForecastPoint {
                        year,
                        estimate: interval.estimate,
                        lower: interval.lower,
                        upper: interval.upper,
                    })
                    .ok_or(ForecastError::Interval { role, year, level })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let confidence = if model.statistics.df_residual == 0 {
            warn!(role = %role, "two data points only, intervals are degenerate");
            Confidence::Minimal
        } else {
            Confidence::Standard
        };

        debug!(
            role = %role,
            slope = model.slope.estimate,
            r_squared = model.statistics.r_squared,
            "trend fitted"
        );

        Ok(ForecastResult {
            role,
            model,
            observed,
            forecasts,
            confidence,
            confidence_level: level,
            interval: self.config.interval,
        })
    }

    /// Forecast every role in parallel. Results keep the order of `roles`.
    pub fn forecast_all(&self, roles: &[Role], series: &[SalaryYearRole]) -> Vec<ForecastOutcome> {
        let outcomes: Vec<ForecastOutcome> = roles
            .par_iter()
            .map(|role| ForecastOutcome::from(self.forecast_role(*role, series)))
            .collect();

        for outcome in &outcomes {
            if let ForecastOutcome::Failed { role, reason } = outcome {
                warn!(role = %role, "forecast skipped: {}", reason);
            }
        }
        info!(
            fitted = outcomes.iter().filter(|o| o.fitted().is_some()).count(),
            roles = roles.len(),
            "forecasts computed"
        );

        outcomes
    }
}
