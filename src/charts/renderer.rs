//! Static Chart Renderer
//! Draws PNG charts from report data with plotters.
//!
//! Charts:
//! 1. One salary trend chart per fitted role: observed yearly means, the
//!    fitted line, and forecast points with their interval bars
//! 2. One faceted bar chart of the top skills, one panel per role

use crate::data::Role;
use crate::pipeline::Report;
use crate::report::format_money;
use crate::stats::{skills_by_role, ForecastResult, SkillCount};
use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const TREND_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue
const FORECAST_COLOR: RGBColor = RGBColor(231, 76, 60); // Red

const PANEL_COLORS: [RGBColor; 3] = [
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
];

const TREND_SIZE: (u32, u32) = (1000, 600);
const SKILL_SIZE: (u32, u32) = (1500, 500);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

fn draw_err<E: Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// Axis bounds of a trend chart: (x range, y range).
pub type Bounds = ((f64, f64), (f64, f64));

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart for a report into `dir`. Returns the written paths.
    pub fn render_all(report: &Report, dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        for result in report.forecasts.iter().filter_map(|o| o.fitted()) {
            let path = dir.join(format!("trend_{}.png", result.role.slug()));
            Self::render_trend_chart(result, &path)?;
            written.push(path);
        }

        if !report.top_skills.is_empty() {
            let path = dir.join("top_skills.png");
            Self::render_skill_chart(&report.top_skills, &path)?;
            written.push(path);
        }

        info!(charts = written.len(), dir = %dir.display(), "charts rendered");
        Ok(written)
    }

    /// Axis ranges covering observed points, forecasts and interval bounds.
    pub fn trend_bounds(result: &ForecastResult) -> Bounds {
        let years = result
            .observed
            .iter()
            .map(|(year, _)| *year)
            .chain(result.forecasts.iter().map(|p| p.year));
        let values = result
            .observed
            .iter()
            .map(|(_, salary)| *salary)
            .chain(result.forecasts.iter().flat_map(|p| [p.lower, p.upper]));

        let (mut x_min, mut x_max) = (i64::MAX, i64::MIN);
        for year in years {
            x_min = x_min.min(year);
            x_max = x_max.max(year);
        }
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for value in values.filter(|v| v.is_finite()) {
            y_min = y_min.min(value);
            y_max = y_max.max(value);
        }

        if x_min > x_max {
            return ((0.0, 1.0), (0.0, 1.0));
        }
        if y_min > y_max {
            (y_min, y_max) = (0.0, 1.0);
        }

        let pad = ((y_max - y_min) * 0.1).max(y_max.abs() * 0.02).max(1.0);
        (
            (x_min as f64 - 0.5, x_max as f64 + 0.5),
            (y_min - pad, y_max + pad),
        )
    }

    pub fn render_trend_chart(result: &ForecastResult, path: &Path) -> Result<(), ChartError> {
        let ((x_min, x_max), (y_min, y_max)) = Self::trend_bounds(result);

        let root = BitMapBackend::new(path, TREND_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{}: salary trend and forecast", result.role),
                ("sans-serif", 24),
            )
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Work year")
            .y_desc("Average salary (USD)")
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .y_label_formatter(&|y: &f64| format_money(*y))
            .draw()
            .map_err(draw_err)?;

        let model = &result.model;
        chart
            .draw_series(LineSeries::new(
                [x_min, x_max].map(|x| (x, model.predict(x))),
                TREND_COLOR.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label("Linear trend")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TREND_COLOR.stroke_width(2)));

        chart
            .draw_series(
                result
                    .observed
                    .iter()
                    .map(|(year, salary)| Circle::new((*year as f64, *salary), 5, TREND_COLOR.filled())),
            )
            .map_err(draw_err)?
            .label("Observed mean")
            .legend(|(x, y)| Circle::new((x + 10, y), 5, TREND_COLOR.filled()));

        chart
            .draw_series(result.forecasts.iter().map(|p| {
                PathElement::new(
                    vec![(p.year as f64, p.lower), (p.year as f64, p.upper)],
                    FORECAST_COLOR.stroke_width(2),
                )
            }))
            .map_err(draw_err)?;

        chart
            .draw_series(
                result
                    .forecasts
                    .iter()
                    .map(|p| Circle::new((p.year as f64, p.estimate), 6, FORECAST_COLOR.filled())),
            )
            .map_err(draw_err)?
            .label(format!(
                "Forecast ({:.0}% {:?} interval)",
                result.confidence_level * 100.0,
                result.interval
            ))
            .legend(|(x, y)| Circle::new((x + 10, y), 6, FORECAST_COLOR.filled()));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        debug!(role = %result.role, path = %path.display(), "trend chart written");
        Ok(())
    }

    /// One horizontal bar panel per role, top-ranked skill at the top.
    pub fn render_skill_chart(skills: &[SkillCount], path: &Path) -> Result<(), ChartError> {
        let grouped = skills_by_role(skills);

        let root = BitMapBackend::new(path, SKILL_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let root = root
            .titled("Top skills by role", ("sans-serif", 26))
            .map_err(draw_err)?;

        let panels = root.split_evenly((1, grouped.len().max(1)));
        for (i, ((role, entries), panel)) in grouped.iter().zip(panels.iter()).enumerate() {
            Self::draw_skill_panel(panel, *role, entries, PANEL_COLORS[i % PANEL_COLORS.len()])?;
        }

        root.present().map_err(draw_err)?;
        debug!(path = %path.display(), "skill chart written");
        Ok(())
    }

    fn draw_skill_panel<DB: DrawingBackend>(
        panel: &DrawingArea<DB, plotters::coord::Shift>,
        role: Role,
        entries: &[&SkillCount],
        color: RGBColor,
    ) -> Result<(), ChartError> {
        let max_count = entries.iter().map(|e| e.count).max().unwrap_or(0).max(1) as f64;
        let rows = entries.len().max(1) as f64;

        let mut chart = ChartBuilder::on(panel)
            .caption(role.as_str(), ("sans-serif", 18))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(10)
            .build_cartesian_2d(0f64..max_count * 1.15, 0f64..rows)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(0)
            .x_desc("Respondents")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(entries.iter().enumerate().map(|(i, entry)| {
                let top = rows - i as f64;
                Rectangle::new(
                    [(0.0, top - 0.85), (entry.count as f64, top - 0.15)],
                    color.filled(),
                )
            }))
            .map_err(draw_err)?;

        chart
            .draw_series(entries.iter().enumerate().map(|(i, entry)| {
                let top = rows - i as f64;
                Text::new(
                    format!("{} ({})", entry.skill, entry.count),
                    (max_count * 0.02, top - 0.35),
                    ("sans-serif", 14).into_font(),
                )
            }))
            .map_err(draw_err)?;

        Ok(())
    }
}
