//! Stats module - skill ranking and trend forecasting

mod forecast;
mod regression;
mod skills;

pub use forecast::{
    Confidence, ForecastError, ForecastOutcome, ForecastPoint, ForecastResult, TrendForecaster,
};
pub use regression::{Coefficient, FitStatistics, Interval, LinearFit};
pub use skills::{skill_counts_frame, skills_by_role, SkillCount, SkillRanker, NO_SKILLS_PLACEHOLDER};
