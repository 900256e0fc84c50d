//! Ordinary least squares with a single predictor.
//!
//! Fit statistics follow the conventions of R's `lm` summary: residual
//! standard error on n - 2 degrees of freedom, F test on (1, n - 2), and
//! AIC/BIC counting three parameters (intercept, slope, residual variance).

use crate::config::IntervalKind;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};
use std::f64::consts::PI;

/// Estimated coefficient with its standard error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coefficient {
    pub estimate: f64,
    /// `None` when residual degrees of freedom are zero.
    pub std_error: Option<f64>,
    pub t_value: Option<f64>,
}

/// Goodness-of-fit summary for one fitted line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitStatistics {
    pub n: usize,
    pub df_residual: usize,
    pub r_squared: f64,
    pub adj_r_squared: Option<f64>,
    pub residual_std_error: Option<f64>,
    pub f_statistic: Option<f64>,
    pub f_p_value: Option<f64>,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
}

/// `y = intercept + slope * x` fitted by least squares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearFit {
    pub intercept: Coefficient,
    pub slope: Coefficient,
    pub statistics: FitStatistics,
    #[serde(skip)]
    mean_x: f64,
    #[serde(skip)]
    sxx: f64,
    #[serde(skip)]
    sigma: Option<f64>,
}

/// Interval bounds around a predicted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

impl LinearFit {
    /// Fit a line through `points`. Returns `None` when the x values do not
    /// vary (fewer than two distinct x), since the slope is then undefined.
    pub fn fit(points: &[(f64, f64)]) -> Option<LinearFit> {
        let n = points.len();
        if n < 2 {
            return None;
        }
        let nf = n as f64;

        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / nf;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / nf;

        let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        if sxx <= 0.0 || !sxx.is_finite() {
            return None;
        }
        let sxy: f64 = points
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum();

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let sse: f64 = points
            .iter()
            .map(|p| (p.1 - (intercept + slope * p.0)).powi(2))
            .sum();
        let sst: f64 = points.iter().map(|p| (p.1 - mean_y).powi(2)).sum();

        let r_squared = if sst > 0.0 {
            (1.0 - sse / sst).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let df_residual = n - 2;
        let dfr = df_residual as f64;
        let sigma = (df_residual > 0).then(|| (sse / dfr).sqrt());

        let adj_r_squared =
            (df_residual > 0).then(|| 1.0 - (1.0 - r_squared) * (nf - 1.0) / dfr);

        let (f_statistic, f_p_value) = match df_residual {
            0 => (None, None),
            _ if sse == 0.0 => (Some(f64::INFINITY), Some(0.0)),
            _ => {
                let f = (sst - sse) / (sse / dfr);
                let p = FisherSnedecor::new(1.0, dfr)
                    .ok()
                    .map(|dist| 1.0 - dist.cdf(f));
                (Some(f), p)
            }
        };

        // Infinite when the line passes exactly through every point.
        let log_likelihood = -0.5 * nf * ((2.0 * PI).ln() + (sse / nf).ln() + 1.0);
        let params = 3.0;
        let aic = -2.0 * log_likelihood + 2.0 * params;
        let bic = -2.0 * log_likelihood + nf.ln() * params;

        let slope_se = sigma.map(|s| s / sxx.sqrt());
        let intercept_se = sigma.map(|s| s * (1.0 / nf + mean_x.powi(2) / sxx).sqrt());

        Some(LinearFit {
            intercept: Coefficient::new(intercept, intercept_se),
            slope: Coefficient::new(slope, slope_se),
            statistics: FitStatistics {
                n,
                df_residual,
                r_squared,
                adj_r_squared,
                residual_std_error: sigma,
                f_statistic,
                f_p_value,
                log_likelihood,
                aic,
                bic,
            },
            mean_x,
            sxx,
            sigma,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept.estimate + self.slope.estimate * x
    }

    /// Interval around the prediction at `x` for the given confidence level.
    ///
    /// Width grows with the distance of `x` from the mean of the fitted x
    /// values. With zero residual degrees of freedom the interval collapses
    /// to the point estimate. Returns `None` when `confidence_level` is not
    /// strictly between 0 and 1, or if the t distribution cannot be
    /// constructed.
    pub fn interval(&self, x: f64, confidence_level: f64, kind: IntervalKind) -> Option<Interval> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return None;
        }
        let estimate = self.predict(x);
        let Some(sigma) = self.sigma else {
            return Some(Interval {
                estimate,
                lower: estimate,
                upper: estimate,
            });
        };

        let n = self.statistics.n as f64;
        let leverage = 1.0 / n + (x - self.mean_x).powi(2) / self.sxx;
        let se = match kind {
            IntervalKind::Confidence => sigma * leverage.sqrt(),
            IntervalKind::Prediction => sigma * (1.0 + leverage).sqrt(),
        };

        let dist = StudentsT::new(0.0, 1.0, self.statistics.df_residual as f64).ok()?;
        let t_crit = dist.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0);
        let half_width = (t_crit * se).abs();

        Some(Interval {
            estimate,
            lower: estimate - half_width,
            upper: estimate + half_width,
        })
    }
}

impl Coefficient {
    fn new(estimate: f64, std_error: Option<f64>) -> Self {
        let t_value = std_error.filter(|se| *se > 0.0).map(|se| estimate / se);
        Self {
            estimate,
            std_error,
            t_value,
        }
    }
}
